//! Macro panel
//!
//! Lists stored macros and lets the user create, load, run, edit and
//! refresh them. The macro list comes from a `FetchService` subscription;
//! Run and Load are gated by flags selected from the `AppStore`; actions
//! open dialogs through a `ModalOpener`.

mod render;
mod selectors;
mod view;

pub use render::render_text;
pub use selectors::{can_load_macro, can_run_macro, is_actionable, select_macro_flags, MacroFlags};
pub use view::{
    BodyView, ButtonView, HeaderView, Icon, MacroPanelView, MacroRowView, PanelAction,
    EMPTY_MESSAGE, ERROR_MESSAGE, LOADING_MESSAGE,
};

use gcodemacro_core::{
    AppStore, FetchError, FetchEvent, FetchService, FetchState, FetchStatus, Macro, MacroId,
    ModalKind, ModalOpener, ModalProps, SubscriptionId,
};
use gcodemacro_settings::UiSettings;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Errors from panel actions
#[derive(Error, Debug)]
pub enum PanelError {
    /// The action's button is disabled in the current state
    #[error("{action} is not available in the current machine state")]
    ActionDisabled {
        /// Button title
        action: &'static str,
    },

    /// No macro with this id in the loaded list
    #[error("Unknown macro: {0}")]
    UnknownMacro(MacroId),

    /// The fetch service refused the request
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

type UpdateCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct PanelState {
    fetch: Option<FetchState>,
    flags: MacroFlags,
}

impl PanelState {
    /// Cache `fetch` unless it is older than the cached snapshot
    ///
    /// Snapshots can reach listeners out of order when transitions race on
    /// different threads. Generations order `Fetch`/`Clear`; within one
    /// generation the response comes after the in-flight state.
    fn apply_fetch(&mut self, fetch: &FetchState) -> bool {
        if let Some(cached) = &self.fetch {
            let older = fetch.generation < cached.generation
                || (fetch.generation == cached.generation
                    && fetch.status == FetchStatus::Fetching
                    && cached.status != FetchStatus::Fetching);
            if older {
                tracing::debug!(
                    "Ignoring out-of-order fetch snapshot (request {})",
                    fetch.generation
                );
                return false;
            }
        }
        self.fetch = Some(fetch.clone());
        true
    }

    /// Recompute flags from the store's current state
    fn sync_flags(&mut self, store: &AppStore) -> bool {
        let flags = select_macro_flags(&store.state());
        let changed = self.flags != flags;
        self.flags = flags;
        changed
    }
}

/// The macro panel
pub struct MacroPanel {
    fetch: FetchService,
    store: Arc<AppStore>,
    modals: Arc<dyn ModalOpener>,
    state: Arc<RwLock<PanelState>>,
    on_update: Option<UpdateCallback>,
    subscriptions: Option<(SubscriptionId, SubscriptionId)>,
    show_export: bool,
}

impl MacroPanel {
    /// Create an unmounted panel
    pub fn new(fetch: FetchService, store: Arc<AppStore>, modals: Arc<dyn ModalOpener>) -> Self {
        let flags = select_macro_flags(&store.state());
        Self {
            fetch,
            store,
            modals,
            state: Arc::new(RwLock::new(PanelState { fetch: None, flags })),
            on_update: None,
            subscriptions: None,
            show_export: true,
        }
    }

    /// Apply UI preferences
    pub fn with_settings(mut self, settings: &UiSettings) -> Self {
        self.show_export = settings.show_export;
        self
    }

    /// Call `callback` whenever the panel needs redrawing
    ///
    /// Takes effect on the next `mount`.
    pub fn on_update<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(callback));
    }

    /// Whether the panel is subscribed
    pub fn is_mounted(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Subscribe to the fetch service and the store, then request the list
    ///
    /// If the request cannot be sent the panel is left unmounted.
    pub fn mount(&mut self) -> Result<(), PanelError> {
        if self.is_mounted() {
            tracing::debug!("Macro panel already mounted");
            return Ok(());
        }

        let state = self.state.clone();
        let on_update = self.on_update.clone();
        let fetch_sub = self.fetch.subscribe(move |fetch| {
            if !state.write().apply_fetch(fetch) {
                return;
            }
            if let Some(callback) = &on_update {
                callback();
            }
        });

        // The delivered snapshot may already be stale; read the store instead
        let state = self.state.clone();
        let on_update = self.on_update.clone();
        let store = Arc::downgrade(&self.store);
        let store_sub = self.store.subscribe(move |_| {
            let Some(store) = store.upgrade() else {
                return;
            };
            let changed = state.write().sync_flags(&store);
            if changed {
                let flags = state.read().flags;
                tracing::debug!(
                    "Macro flags: load={} run={}",
                    flags.can_load_macro,
                    flags.can_run_macro
                );
                if let Some(callback) = &on_update {
                    callback();
                }
            }
        });

        {
            let mut state = self.state.write();
            state.apply_fetch(&self.fetch.state());
            state.sync_flags(&self.store);
        }
        self.subscriptions = Some((fetch_sub, store_sub));

        if let Err(err) = self.fetch.send(FetchEvent::Fetch) {
            tracing::warn!("Macro panel mount failed: {}", err);
            self.unmount();
            self.state.write().fetch = None;
            return Err(err.into());
        }
        tracing::info!("Macro panel mounted");
        Ok(())
    }

    /// Remove both subscriptions
    pub fn unmount(&mut self) {
        if let Some((fetch_sub, store_sub)) = self.subscriptions.take() {
            self.fetch.unsubscribe(fetch_sub);
            self.store.unsubscribe(store_sub);
            tracing::info!("Macro panel unmounted");
        }
    }

    /// Current Run/Load gating
    pub fn flags(&self) -> MacroFlags {
        self.state.read().flags
    }

    /// Build the view model
    pub fn view(&self) -> MacroPanelView {
        let state = self.state.read();
        MacroPanelView {
            header: HeaderView::build(self.show_export),
            body: BodyView::build(state.fetch.as_ref(), state.flags),
        }
    }

    /// Perform the action bound to a button
    pub fn dispatch(&self, action: &PanelAction) -> Result<(), PanelError> {
        match action {
            PanelAction::New => {
                self.new_macro();
                Ok(())
            }
            PanelAction::Export => {
                self.export_macros();
                Ok(())
            }
            PanelAction::Refresh => self.refresh_macros(),
            PanelAction::Run(id) => self.run_macro(id),
            PanelAction::Load(id) => self.load_macro(id),
            PanelAction::Edit(id) => self.edit_macro(id),
        }
    }

    /// Open the creation dialog
    pub fn new_macro(&self) {
        self.modals.open_modal(ModalKind::NewMacro, ModalProps::None);
    }

    /// Export has no behaviour yet
    pub fn export_macros(&self) {
        tracing::debug!("Export macros requested; not implemented");
    }

    /// Drop the cached list and request it again
    pub fn refresh_macros(&self) -> Result<(), PanelError> {
        tracing::info!("Refreshing macros");
        self.fetch.send(FetchEvent::Clear)?;
        self.fetch.send(FetchEvent::Fetch)?;
        Ok(())
    }

    /// Open the load dialog with `{id, name}`
    pub fn load_macro(&self, id: &MacroId) -> Result<(), PanelError> {
        if !self.flags().can_load_macro {
            return Err(PanelError::ActionDisabled {
                action: "Load Macro",
            });
        }
        let m = self.find(id)?;
        self.modals
            .open_modal(ModalKind::LoadMacro, ModalProps::summary(&m));
        Ok(())
    }

    /// Open the run dialog with `{id, name, content}`
    pub fn run_macro(&self, id: &MacroId) -> Result<(), PanelError> {
        if !self.flags().can_run_macro {
            return Err(PanelError::ActionDisabled { action: "Run Macro" });
        }
        let m = self.find(id)?;
        self.modals.open_modal(ModalKind::RunMacro, ModalProps::full(&m));
        Ok(())
    }

    /// Open the edit dialog with `{id, name, content}`; never gated
    pub fn edit_macro(&self, id: &MacroId) -> Result<(), PanelError> {
        let m = self.find(id)?;
        self.modals.open_modal(ModalKind::EditMacro, ModalProps::full(&m));
        Ok(())
    }

    fn find(&self, id: &MacroId) -> Result<Macro, PanelError> {
        self.state
            .read()
            .fetch
            .as_ref()
            .and_then(|fetch| fetch.context.data.as_ref())
            .and_then(|data| data.find(id))
            .cloned()
            .ok_or_else(|| PanelError::UnknownMacro(id.clone()))
    }
}

impl Drop for MacroPanel {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for MacroPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacroPanel")
            .field("mounted", &self.is_mounted())
            .field("flags", &self.flags())
            .field("show_export", &self.show_export)
            .finish()
    }
}
