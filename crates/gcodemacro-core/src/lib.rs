//! # GCodeMacro Core
//!
//! Core types and services behind the macro panel:
//! data models, the application store, the macro fetch service,
//! the modal facility and the application event bus.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod fetch;
pub mod modal;
pub mod store;

pub use data::{ConnectionState, MachineState, Macro, MacroId, MacroRecords, WorkflowState};

pub use error::{Error, FetchError, Result, SourceError};

pub use event_bus::{
    AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, SubscriptionId,
};

pub use fetch::{
    FetchContext, FetchEvent, FetchService, FetchState, FetchStatus, InMemoryMacroSource,
    JsonFileMacroSource, MacroSource,
};

pub use modal::{ModalKind, ModalManager, ModalOpener, ModalProps, OpenModal};

pub use store::{AppStore, StoreAction, StoreState};
