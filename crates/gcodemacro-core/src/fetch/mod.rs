//! Macro list fetching
//!
//! A small request state machine (`machine`), the sources it can read from
//! (`source`), and the service that drives requests on tokio tasks and
//! notifies subscribers of every transition (`service`).

mod machine;
mod service;
mod source;

pub use machine::{FetchContext, FetchEvent, FetchState, FetchStatus};
pub use service::FetchService;
pub use source::{InMemoryMacroSource, JsonFileMacroSource, MacroSource};
