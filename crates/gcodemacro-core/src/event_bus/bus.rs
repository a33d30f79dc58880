//! Event Bus implementation.
//!
//! Synchronous handlers are invoked on the publishing thread. A broadcast
//! channel mirrors every event for async consumers.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of events to retain in history.
    pub max_history_size: usize,
    /// How long to retain events in history.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
struct TimestampedEvent {
    event: AppEvent,
    timestamp: Instant,
}

/// Error types for event bus operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Central event bus for application-wide event distribution
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    history: RwLock<VecDeque<TimestampedEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of handlers and async receivers reached, or
    /// `NoSubscribers` if nobody was listening.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Publishing {}", event.description());

        if self.config.enable_history {
            self.add_to_history(&event);
        }

        // Snapshot so handlers may subscribe or unsubscribe re-entrantly
        let matching: Vec<EventHandler> = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &matching {
            handler(&event);
        }

        let receivers = self.sender.send(event).unwrap_or(0);
        let reached = matching.len() + receivers;
        if reached == 0 {
            Err(EventBusError::NoSubscribers)
        } else {
            Ok(reached)
        }
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler runs on the publishing thread and should return quickly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for polling events from an async task
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get recent event history (if enabled)
    ///
    /// Returns events since the given instant, or all history if None.
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        if !self.config.enable_history {
            return Vec::new();
        }

        self.history
            .read()
            .iter()
            .filter(|e| since.map_or(true, |since| e.timestamp >= since))
            .map(|e| e.event.clone())
            .collect()
    }

    /// Clear event history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &AppEvent) {
        let mut history = self.history.write();
        let now = Instant::now();

        history.push_back(TimestampedEvent {
            event: event.clone(),
            timestamp: now,
        });

        let retention = self.config.history_retention;
        while history
            .front()
            .is_some_and(|e| now.duration_since(e.timestamp) > retention)
        {
            history.pop_front();
        }

        while history.len() > self.config.max_history_size {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WorkflowState;
    use crate::event_bus::events::{ControllerEvent, MacroEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn workflow(state: WorkflowState) -> AppEvent {
        AppEvent::Controller(ControllerEvent::WorkflowChanged { state })
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.publish(AppEvent::Macro(MacroEvent::Cleared)),
            Err(EventBusError::NoSubscribers)
        ));
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let macro_count = Arc::new(AtomicUsize::new(0));
        let controller_count = Arc::new(AtomicUsize::new(0));

        let mc = macro_count.clone();
        bus.subscribe(EventFilter::Categories(vec![EventCategory::Macro]), move |_| {
            mc.fetch_add(1, Ordering::SeqCst);
        });

        let cc = controller_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Controller]),
            move |_| {
                cc.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(AppEvent::Macro(MacroEvent::Cleared)).ok();
        bus.publish(workflow(WorkflowState::Running)).ok();
        bus.publish(workflow(WorkflowState::Idle)).ok();

        assert_eq!(macro_count.load(Ordering::SeqCst), 1);
        assert_eq!(controller_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<RwLock<Option<SubscriptionId>>> = Arc::new(RwLock::new(None));

        let bus_clone = bus.clone();
        let slot_clone = slot.clone();
        let id = bus.subscribe(EventFilter::All, move |_| {
            if let Some(id) = *slot_clone.read() {
                bus_clone.unsubscribe(id);
            }
        });
        *slot.write() = Some(id);

        bus.publish(AppEvent::Macro(MacroEvent::Cleared)).ok();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_history_max_size() {
        let bus = EventBus::with_config(EventBusConfig {
            enable_history: true,
            max_history_size: 3,
            ..Default::default()
        });

        for generation in 0..6 {
            bus.publish(AppEvent::Macro(MacroEvent::FetchStarted { generation }))
                .ok();
        }

        let history = bus.history(None);
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[0],
            AppEvent::Macro(MacroEvent::FetchStarted { generation: 3 })
        );

        bus.clear_history();
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(AppEvent::Macro(MacroEvent::Cleared)).ok();

        let received = receiver.recv().await.expect("event should arrive");
        assert_eq!(received, AppEvent::Macro(MacroEvent::Cleared));
    }
}
