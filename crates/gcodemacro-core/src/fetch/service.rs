//! Fetch service
//!
//! Owns the fetch state machine and runs each request on a tokio task.
//! Subscribers are called synchronously with a snapshot after every
//! transition, on whichever thread caused it.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::machine::{FetchEvent, FetchState};
use super::source::MacroSource;
use crate::data::MacroRecords;
use crate::error::FetchError;
use crate::event_bus::{AppEvent, EventBus, MacroEvent, SubscriptionId};

type FetchListener = Arc<dyn Fn(&FetchState) + Send + Sync>;

struct Inner {
    source: Arc<dyn MacroSource>,
    state: RwLock<FetchState>,
    listeners: RwLock<HashMap<SubscriptionId, FetchListener>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    bus: Option<Arc<EventBus>>,
}

impl Inner {
    fn notify(&self, state: &FetchState) {
        let listeners: Vec<FetchListener> = self.listeners.read().values().cloned().collect();
        for listener in &listeners {
            listener(state);
        }
    }

    fn publish(&self, event: MacroEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Macro(event));
        }
    }

    fn complete(&self, generation: u64, outcome: Result<MacroRecords, FetchError>) {
        let event = match &outcome {
            Ok(records) => MacroEvent::FetchSucceeded {
                generation,
                count: records.len(),
            },
            Err(err) => MacroEvent::FetchFailed {
                generation,
                error: err.to_string(),
            },
        };

        let next = {
            let mut state = self.state.write();
            match state.resolve(generation, outcome) {
                Some(next) => {
                    *state = next.clone();
                    next
                }
                None => {
                    tracing::debug!("Discarding stale macro response (request {})", generation);
                    return;
                }
            }
        };

        if let Some(error) = &next.context.error {
            tracing::warn!("Macro fetch failed: {}", error);
        } else {
            tracing::debug!(
                "Macro fetch complete: {} records",
                next.context.data.as_ref().map_or(0, MacroRecords::len)
            );
        }
        self.notify(&next);
        self.publish(event);
    }
}

/// Drives macro list requests and reports state to subscribers
#[derive(Clone)]
pub struct FetchService {
    inner: Arc<Inner>,
}

impl FetchService {
    /// Service reading from `source`
    pub fn new(source: Arc<dyn MacroSource>) -> Self {
        Self::build(source, None)
    }

    /// Service reading from `source` that also reports on `bus`
    pub fn with_event_bus(source: Arc<dyn MacroSource>, bus: Arc<EventBus>) -> Self {
        Self::build(source, Some(bus))
    }

    fn build(source: Arc<dyn MacroSource>, bus: Option<Arc<EventBus>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: RwLock::new(FetchState::default()),
                listeners: RwLock::new(HashMap::new()),
                pending: Mutex::new(None),
                bus,
            }),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> FetchState {
        self.inner.state.read().clone()
    }

    /// Send an event to the machine
    ///
    /// `Fetch` needs a tokio runtime to run the request on.
    pub fn send(&self, event: FetchEvent) -> Result<(), FetchError> {
        tracing::debug!("Fetch service received {}", event);
        match event {
            FetchEvent::Fetch => self.start_fetch(),
            FetchEvent::Clear => {
                self.clear();
                Ok(())
            }
        }
    }

    fn start_fetch(&self) -> Result<(), FetchError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| FetchError::NoRuntime)?;

        let next = {
            let mut state = self.inner.state.write();
            *state = state.transition(FetchEvent::Fetch);
            state.clone()
        };
        let generation = next.generation;
        self.inner.notify(&next);
        self.inner.publish(MacroEvent::FetchStarted { generation });

        let inner = self.inner.clone();
        let task = runtime.spawn(async move {
            let outcome = inner.source.list_macros().await.map_err(FetchError::from);
            inner.complete(generation, outcome);
        });

        if let Some(previous) = self.inner.pending.lock().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    fn clear(&self) {
        if let Some(task) = self.inner.pending.lock().take() {
            task.abort();
        }

        let next = {
            let mut state = self.inner.state.write();
            *state = state.transition(FetchEvent::Clear);
            state.clone()
        };
        self.inner.notify(&next);
        self.inner.publish(MacroEvent::Cleared);
    }

    /// Wait until no request is in flight
    pub async fn settled(&self) {
        loop {
            let task = self.inner.pending.lock().take();
            let Some(task) = task else {
                break;
            };
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    tracing::error!("Macro fetch task failed: {}", err);
                }
            }
        }
    }

    /// Register a listener called with each new snapshot
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FetchState) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.inner.listeners.write().insert(id, Arc::new(listener));
        tracing::debug!("Fetch subscription {} added", id);
        id
    }

    /// Remove a listener; returns true if it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.inner.listeners.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Fetch subscription {} removed", id);
        }
        removed
    }

    /// Number of registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.read().len()
    }
}

impl std::fmt::Debug for FetchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchService")
            .field("state", &*self.inner.state.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
