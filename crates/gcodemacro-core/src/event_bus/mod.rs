//! # Event Bus Module
//!
//! Application-wide publish/subscribe for decoupled components.
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter by category and receive events synchronously
//! - Async consumers can poll a broadcast receiver instead
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gcodemacro_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, MacroEvent};
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(EventFilter::Categories(vec![EventCategory::Macro]), |event| {
//!     tracing::info!("{}", event.description());
//! });
//! bus.publish(AppEvent::Macro(MacroEvent::Cleared)).ok();
//! bus.unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
