//! Modal dialog facility
//!
//! The panel launches its dialogs through `ModalOpener`. `ModalManager` is a
//! minimal host-side implementation that tracks the open dialog and reports
//! open/close on the event bus. Only one dialog is open at a time.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{Macro, MacroId};
use crate::event_bus::{AppEvent, EventBus, UiEvent};

/// Dialogs the macro panel can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModalKind {
    /// Create a macro
    NewMacro,
    /// Load a macro into the G-code workspace
    LoadMacro,
    /// Run a macro on the controller
    RunMacro,
    /// Edit or delete a macro
    EditMacro,
}

impl std::fmt::Display for ModalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModalKind::NewMacro => write!(f, "New Macro"),
            ModalKind::LoadMacro => write!(f, "Load Macro"),
            ModalKind::RunMacro => write!(f, "Run Macro"),
            ModalKind::EditMacro => write!(f, "Edit Macro"),
        }
    }
}

/// Properties handed to a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalProps {
    /// No properties
    None,
    /// Macro identity and name
    Summary {
        /// Macro id
        id: MacroId,
        /// Macro name
        name: String,
    },
    /// Macro identity, name and body
    Full {
        /// Macro id
        id: MacroId,
        /// Macro name
        name: String,
        /// Macro body
        content: String,
    },
}

impl ModalProps {
    /// `{id, name}` of a macro
    pub fn summary(m: &Macro) -> Self {
        ModalProps::Summary {
            id: m.id.clone(),
            name: m.name.clone(),
        }
    }

    /// `{id, name, content}` of a macro
    pub fn full(m: &Macro) -> Self {
        ModalProps::Full {
            id: m.id.clone(),
            name: m.name.clone(),
            content: m.content.clone(),
        }
    }

    /// Macro id carried by these props, if any
    pub fn macro_id(&self) -> Option<&MacroId> {
        match self {
            ModalProps::None => None,
            ModalProps::Summary { id, .. } | ModalProps::Full { id, .. } => Some(id),
        }
    }
}

/// Something that can open modal dialogs
pub trait ModalOpener: Send + Sync {
    /// Open a dialog with the given properties
    fn open_modal(&self, kind: ModalKind, props: ModalProps);
}

/// A dialog currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenModal {
    /// Which dialog
    pub kind: ModalKind,
    /// Properties it was opened with
    pub props: ModalProps,
    /// When it was opened
    pub opened_at: DateTime<Utc>,
}

/// Tracks the single open dialog
#[derive(Debug, Default)]
pub struct ModalManager {
    current: RwLock<Option<OpenModal>>,
    bus: Option<Arc<EventBus>>,
}

impl ModalManager {
    /// Create a manager with no dialog open
    pub fn new() -> Self {
        Self::default()
    }

    /// Report open/close on an event bus
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// The dialog currently open, if any
    pub fn current(&self) -> Option<OpenModal> {
        self.current.read().clone()
    }

    /// Close the open dialog, returning it
    pub fn close_modal(&self) -> Option<OpenModal> {
        let closed = self.current.write().take();
        if let Some(modal) = &closed {
            tracing::debug!("Closing {}", modal.kind);
            self.publish(UiEvent::ModalClosed { kind: modal.kind });
        }
        closed
    }

    fn publish(&self, event: UiEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Ui(event));
        }
    }
}

impl ModalOpener for ModalManager {
    fn open_modal(&self, kind: ModalKind, props: ModalProps) {
        let macro_id = props.macro_id().cloned();
        let replaced = self.current.write().replace(OpenModal {
            kind,
            props,
            opened_at: Utc::now(),
        });
        if let Some(previous) = replaced {
            tracing::debug!("{} replaced by {}", previous.kind, kind);
            self.publish(UiEvent::ModalClosed {
                kind: previous.kind,
            });
        }
        tracing::info!("Opening {}", kind);
        self.publish(UiEvent::ModalOpened { kind, macro_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::{EventCategory, EventFilter};

    #[test]
    fn test_props_from_macro() {
        let m = Macro::new("7", "Park", "G53 G0 Z0");
        assert_eq!(
            ModalProps::summary(&m),
            ModalProps::Summary {
                id: MacroId::from("7"),
                name: "Park".to_string()
            }
        );
        assert_eq!(ModalProps::full(&m).macro_id(), Some(&MacroId::from("7")));
        assert_eq!(ModalProps::None.macro_id(), None);
    }

    #[test]
    fn test_open_and_close() {
        let manager = ModalManager::new();
        assert!(manager.current().is_none());

        manager.open_modal(ModalKind::NewMacro, ModalProps::None);
        assert_eq!(manager.current().map(|m| m.kind), Some(ModalKind::NewMacro));

        let closed = manager.close_modal().expect("a modal was open");
        assert_eq!(closed.kind, ModalKind::NewMacro);
        assert!(manager.close_modal().is_none());
    }

    #[test]
    fn test_events_published() {
        let bus = Arc::new(EventBus::with_config(crate::event_bus::EventBusConfig {
            enable_history: true,
            ..Default::default()
        }));
        bus.subscribe(EventFilter::Categories(vec![EventCategory::Ui]), |_| {});
        let manager = ModalManager::new().with_event_bus(bus.clone());

        let m = Macro::new("1", "M1", "G0");
        manager.open_modal(ModalKind::LoadMacro, ModalProps::summary(&m));
        manager.open_modal(ModalKind::EditMacro, ModalProps::full(&m));

        let history = bus.history(None);
        assert_eq!(
            history,
            vec![
                AppEvent::Ui(UiEvent::ModalOpened {
                    kind: ModalKind::LoadMacro,
                    macro_id: Some(MacroId::from("1")),
                }),
                AppEvent::Ui(UiEvent::ModalClosed {
                    kind: ModalKind::LoadMacro
                }),
                AppEvent::Ui(UiEvent::ModalOpened {
                    kind: ModalKind::EditMacro,
                    macro_id: Some(MacroId::from("1")),
                }),
            ]
        );
    }
}
