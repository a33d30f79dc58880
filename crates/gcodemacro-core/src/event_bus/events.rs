//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

use crate::data::{ConnectionState, MachineState, MacroId, WorkflowState};
use crate::modal::ModalKind;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Transport connection events
    Connection(ConnectionEvent),
    /// Controller workflow and machine state
    Controller(ControllerEvent),
    /// Macro list lifecycle
    Macro(MacroEvent),
    /// User interface events
    Ui(UiEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Connection(_) => EventCategory::Connection,
            AppEvent::Controller(_) => EventCategory::Controller,
            AppEvent::Macro(_) => EventCategory::Macro,
            AppEvent::Ui(_) => EventCategory::Ui,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Connection(e) => e.description(),
            AppEvent::Controller(e) => e.description(),
            AppEvent::Macro(e) => e.description(),
            AppEvent::Ui(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Transport connection events.
    Connection,
    /// Controller state events.
    Controller,
    /// Macro list events.
    Macro,
    /// User interface events.
    Ui,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Connection => write!(f, "Connection"),
            EventCategory::Controller => write!(f, "Controller"),
            EventCategory::Macro => write!(f, "Macro"),
            EventCategory::Ui => write!(f, "Ui"),
        }
    }
}

/// Connection-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConnectionEvent {
    /// Connection state changed.
    StateChanged {
        /// The new connection state.
        state: ConnectionState,
    },
}

impl ConnectionEvent {
    fn description(&self) -> String {
        match self {
            ConnectionEvent::StateChanged { state } => format!("Connection state: {}", state),
        }
    }
}

/// Controller-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// Workflow state changed.
    WorkflowChanged {
        /// The new workflow state.
        state: WorkflowState,
    },
    /// Reformed machine state changed.
    MachineStateChanged {
        /// The new machine state.
        state: MachineState,
    },
}

impl ControllerEvent {
    fn description(&self) -> String {
        match self {
            ControllerEvent::WorkflowChanged { state } => format!("Workflow state: {}", state),
            ControllerEvent::MachineStateChanged { state } => {
                let shown = if state.as_str().is_empty() {
                    "none"
                } else {
                    state.as_str()
                };
                format!("Machine state: {}", shown)
            }
        }
    }
}

/// Macro list lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MacroEvent {
    /// A list request was started.
    FetchStarted {
        /// Request generation.
        generation: u64,
    },
    /// A list request completed.
    FetchSucceeded {
        /// Request generation.
        generation: u64,
        /// Number of macros received.
        count: usize,
    },
    /// A list request failed.
    FetchFailed {
        /// Request generation.
        generation: u64,
        /// Error message.
        error: String,
    },
    /// The cached list was cleared.
    Cleared,
}

impl MacroEvent {
    fn description(&self) -> String {
        match self {
            MacroEvent::FetchStarted { generation } => {
                format!("Fetching macros (request {})", generation)
            }
            MacroEvent::FetchSucceeded { generation, count } => {
                format!("Fetched {} macros (request {})", count, generation)
            }
            MacroEvent::FetchFailed { generation, error } => {
                format!("Macro fetch failed (request {}): {}", generation, error)
            }
            MacroEvent::Cleared => "Macro list cleared".to_string(),
        }
    }
}

/// User interface events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UiEvent {
    /// A modal dialog was opened.
    ModalOpened {
        /// Which dialog.
        kind: ModalKind,
        /// Macro the dialog acts on, if any.
        macro_id: Option<MacroId>,
    },
    /// A modal dialog was closed.
    ModalClosed {
        /// Which dialog.
        kind: ModalKind,
    },
}

impl UiEvent {
    fn description(&self) -> String {
        match self {
            UiEvent::ModalOpened { kind, macro_id } => match macro_id {
                Some(id) => format!("Opened {} for macro {}", kind, id),
                None => format!("Opened {}", kind),
            },
            UiEvent::ModalClosed { kind } => format!("Closed {}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_categories() {
        let event = AppEvent::Macro(MacroEvent::Cleared);
        assert_eq!(event.category(), EventCategory::Macro);

        let event = AppEvent::Connection(ConnectionEvent::StateChanged {
            state: ConnectionState::Connected,
        });
        assert_eq!(event.category(), EventCategory::Connection);
    }

    #[test]
    fn test_event_descriptions() {
        let event = AppEvent::Controller(ControllerEvent::MachineStateChanged {
            state: MachineState::None,
        });
        assert_eq!(event.description(), "Machine state: none");

        let event = AppEvent::Ui(UiEvent::ModalOpened {
            kind: ModalKind::RunMacro,
            macro_id: Some(MacroId::from("m1")),
        });
        assert_eq!(event.description(), "Opened Run Macro for macro m1");

        let event = AppEvent::Macro(MacroEvent::FetchSucceeded {
            generation: 2,
            count: 3,
        });
        assert_eq!(event.description(), "Fetched 3 macros (request 2)");
    }
}
