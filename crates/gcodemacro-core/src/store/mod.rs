//! Application store
//!
//! Holds the slices of global state the macro panel reads: connection state,
//! controller workflow state and the reformed machine state. Changes are
//! made through `dispatch`, which notifies listeners with a snapshot and
//! mirrors the change onto the event bus when one is attached.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{ConnectionState, MachineState, WorkflowState};
use crate::event_bus::{AppEvent, ConnectionEvent, ControllerEvent, EventBus, SubscriptionId};

/// `connection` slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSlice {
    /// Transport state
    pub state: ConnectionState,
}

/// `controller.workflow` slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSlice {
    /// Run-mode
    pub state: WorkflowState,
}

/// `controller` slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSlice {
    /// Workflow sub-slice
    pub workflow: WorkflowSlice,
    /// Normalized machine status
    pub reformed_machine_state: MachineState,
}

/// Snapshot of the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Connection slice
    pub connection: ConnectionSlice,
    /// Controller slice
    pub controller: ControllerSlice,
}

impl StoreState {
    /// Build a snapshot from the three fields the panel reads
    pub fn new(connection: ConnectionState, workflow: WorkflowState, machine: MachineState) -> Self {
        Self {
            connection: ConnectionSlice { state: connection },
            controller: ControllerSlice {
                workflow: WorkflowSlice { state: workflow },
                reformed_machine_state: machine,
            },
        }
    }
}

/// Actions accepted by `AppStore::dispatch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Update `connection.state`
    SetConnectionState(ConnectionState),
    /// Update `controller.workflow.state`
    SetWorkflowState(WorkflowState),
    /// Update `controller.reformedMachineState`
    SetMachineState(MachineState),
    /// Restore defaults (disconnected, idle, no machine state)
    Reset,
}

/// Apply an action, returning the next state and the events it produced.
fn reduce(state: &StoreState, action: StoreAction) -> (StoreState, Vec<AppEvent>) {
    let mut next = state.clone();
    match action {
        StoreAction::SetConnectionState(value) => next.connection.state = value,
        StoreAction::SetWorkflowState(value) => next.controller.workflow.state = value,
        StoreAction::SetMachineState(value) => next.controller.reformed_machine_state = value,
        StoreAction::Reset => next = StoreState::default(),
    }

    let mut events = Vec::new();
    if next.connection != state.connection {
        events.push(AppEvent::Connection(ConnectionEvent::StateChanged {
            state: next.connection.state.clone(),
        }));
    }
    if next.controller.workflow != state.controller.workflow {
        events.push(AppEvent::Controller(ControllerEvent::WorkflowChanged {
            state: next.controller.workflow.state.clone(),
        }));
    }
    if next.controller.reformed_machine_state != state.controller.reformed_machine_state {
        events.push(AppEvent::Controller(ControllerEvent::MachineStateChanged {
            state: next.controller.reformed_machine_state.clone(),
        }));
    }
    (next, events)
}

type StoreListener = Arc<dyn Fn(&StoreState) + Send + Sync>;

/// Global application store
pub struct AppStore {
    state: RwLock<StoreState>,
    listeners: RwLock<HashMap<SubscriptionId, StoreListener>>,
    bus: Option<Arc<EventBus>>,
}

impl AppStore {
    /// Create a store with default state
    pub fn new() -> Self {
        Self::with_state(StoreState::default())
    }

    /// Create a store with an initial state
    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
            listeners: RwLock::new(HashMap::new()),
            bus: None,
        }
    }

    /// Mirror state changes onto an event bus
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Current snapshot
    pub fn state(&self) -> StoreState {
        self.state.read().clone()
    }

    /// Apply an action
    ///
    /// Listeners run only when the state actually changed. Returns whether it did.
    pub fn dispatch(&self, action: StoreAction) -> bool {
        let (snapshot, events) = {
            let mut state = self.state.write();
            let (next, events) = reduce(&state, action);
            if events.is_empty() {
                return false;
            }
            *state = next.clone();
            (next, events)
        };

        for event in &events {
            tracing::debug!("Store: {}", event.description());
        }

        let listeners: Vec<StoreListener> = self.listeners.read().values().cloned().collect();
        for listener in &listeners {
            listener(&snapshot);
        }

        if let Some(bus) = &self.bus {
            for event in events {
                // No subscribers on the bus is not an error for the store
                let _ = bus.publish(event);
            }
        }
        true
    }

    /// Register a listener called with each new snapshot
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreState) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.listeners.write().insert(id, Arc::new(listener));
        tracing::debug!("Store subscription {} added", id);
        id
    }

    /// Remove a listener; returns true if it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.listeners.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Store subscription {} removed", id);
        }
        removed
    }

    /// Number of registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &*self.state.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::{EventCategory, EventFilter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispatch_updates_state() {
        let store = AppStore::new();
        assert!(store.dispatch(StoreAction::SetConnectionState(ConnectionState::Connected)));
        assert!(store.dispatch(StoreAction::SetMachineState(MachineState::Idle)));

        let state = store.state();
        assert_eq!(state.connection.state, ConnectionState::Connected);
        assert_eq!(state.controller.reformed_machine_state, MachineState::Idle);
        assert_eq!(state.controller.workflow.state, WorkflowState::Idle);
    }

    #[test]
    fn test_listeners_only_see_changes() {
        let store = AppStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let id = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(StoreAction::SetWorkflowState(WorkflowState::Running));
        store.dispatch(StoreAction::SetWorkflowState(WorkflowState::Running));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(store.unsubscribe(id));
        store.dispatch(StoreAction::SetWorkflowState(WorkflowState::Paused));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_changes_are_published_on_bus() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Controller]),
            move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            },
        );

        let store = AppStore::new().with_event_bus(bus);
        store.dispatch(StoreAction::SetMachineState(MachineState::Run));
        store.dispatch(StoreAction::SetConnectionState(ConnectionState::Connected));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset() {
        let store = AppStore::with_state(StoreState::new(
            ConnectionState::Connected,
            WorkflowState::Paused,
            MachineState::Hold,
        ));
        assert!(store.dispatch(StoreAction::Reset));
        assert_eq!(store.state(), StoreState::default());
        assert!(!store.dispatch(StoreAction::Reset));
    }

    #[test]
    fn test_state_serializes_with_wire_names() {
        let state = StoreState::new(
            ConnectionState::Connected,
            WorkflowState::Idle,
            MachineState::None,
        );
        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["connection"]["state"], "connected");
        assert_eq!(json["controller"]["workflow"]["state"], "idle");
        assert_eq!(json["controller"]["reformedMachineState"], "");
    }
}
