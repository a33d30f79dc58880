//! # GCodeMacro
//!
//! Macro panel for CNC machine-control applications.
//!
//! ## Architecture
//!
//! 1. **gcodemacro-core** - Macro model, application store, fetch service, modals, events
//! 2. **gcodemacro-settings** - Configuration file handling
//! 3. **gcodemacro-ui** - Macro panel view model and text renderer
//! 4. **gcodemacro** - Binary that wires the crates together

use std::sync::Arc;

pub use gcodemacro_core::{
    AppEvent, AppStore, ConnectionState, EventBus, EventBusConfig, EventCategory, EventFilter,
    FetchEvent, FetchService, FetchState, JsonFileMacroSource, MachineState, Macro, MacroId,
    MacroRecords, MacroSource, ModalKind, ModalManager, ModalOpener, ModalProps, StoreAction,
    StoreState, WorkflowState,
};
pub use gcodemacro_settings::{Config, LoggingSettings, MacroSettings, UiSettings};
pub use gcodemacro_ui::{
    init_translations, render_text, tr, MacroFlags, MacroPanel, MacroPanelView, PanelAction,
    PanelError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, falling back to the configured level
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level.to_ascii_lowercase()))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Collaborators the macro panel runs against
pub struct App {
    pub bus: Arc<EventBus>,
    pub store: Arc<AppStore>,
    pub fetch: FetchService,
    pub modals: Arc<ModalManager>,
}

impl App {
    /// Wire the store, fetch service and modal manager onto one event bus
    pub fn new(source: Arc<dyn MacroSource>) -> Self {
        let bus = Arc::new(EventBus::new());
        let store = Arc::new(AppStore::new().with_event_bus(bus.clone()));
        let fetch = FetchService::with_event_bus(source, bus.clone());
        let modals = Arc::new(ModalManager::new().with_event_bus(bus.clone()));

        bus.subscribe(EventFilter::All, |event| {
            tracing::debug!(category = %event.category(), "{}", event.description());
        });

        Self {
            bus,
            store,
            fetch,
            modals,
        }
    }

    /// App reading macros from the file named in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(JsonFileMacroSource::new(config.macros.file.clone())))
    }

    /// Create a macro panel bound to this app
    pub fn macro_panel(&self, settings: &UiSettings) -> MacroPanel {
        MacroPanel::new(self.fetch.clone(), self.store.clone(), self.modals.clone())
            .with_settings(settings)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("bus", &self.bus)
            .field("store", &self.store)
            .field("fetch", &self.fetch)
            .finish()
    }
}
