//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{EventFilter, EventName, Measurements, Metadata, RawEvent};
use crate::subscriber::{
    remove_handler, AttachedHandler, EventHandler, EventStream, EventSubscriber, HandlerTable,
    Subscription, SubscriptionError,
};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
///
/// Publishing is synchronous: attached handlers have run by the time
/// `publish` returns.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of attached handlers that were invoked.
    fn publish(&self, event: RawEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;

    /// Publish an event from its parts.
    fn execute(&self, name: EventName, measurements: Measurements, metadata: Metadata) -> usize {
        self.publish(RawEvent {
            name,
            measurements,
            metadata,
        })
    }
}

/// In-memory implementation of the event bus.
///
/// Attached handlers run inline on the publishing thread. Stream
/// observers receive copies through `tokio::sync::broadcast`.
pub struct InMemoryEventBus {
    /// Broadcast sender for stream observers.
    sender: broadcast::Sender<RawEvent>,

    /// Attached handlers, in attach order.
    handlers: HandlerTable,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified stream capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            handlers: Arc::new(RwLock::new(Vec::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        debug!(names = ?filter.names, prefixes = ?filter.prefixes, "New event stream created");
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Get the number of attached handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get the number of active stream observers.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the stream channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handlers attached to `name`, in attach order.
    fn handlers_for(&self, name: &EventName) -> Vec<(String, Arc<dyn EventHandler>)> {
        self.handlers
            .read()
            .iter()
            .filter(|h| h.events.contains(name))
            .map(|h| (h.id.clone(), h.handler.clone()))
            .collect()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn attach(
        &self,
        handler_id: &str,
        events: Vec<EventName>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<Subscription, SubscriptionError> {
        if events.is_empty() {
            return Err(SubscriptionError::NoEvents(handler_id.to_string()));
        }

        {
            let mut handlers = self.handlers.write();
            if handlers.iter().any(|h| h.id == handler_id) {
                return Err(SubscriptionError::AlreadyAttached(handler_id.to_string()));
            }
            handlers.push(AttachedHandler {
                id: handler_id.to_string(),
                events: events.iter().cloned().collect(),
                handler,
            });
        }

        debug!(handler = handler_id, events = events.len(), "Handler attached");

        Ok(Subscription::new(
            handler_id.to_string(),
            events,
            self.handlers.clone(),
        ))
    }

    fn detach(&self, handler_id: &str) -> bool {
        let removed = remove_handler(&self.handlers, handler_id);
        if removed {
            debug!(handler = handler_id, "Handler detached");
        }
        removed
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: RawEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so handlers may attach/detach without deadlocking.
        let targets = self.handlers_for(&event.name);
        let mut invoked = 0;

        for (id, handler) in targets {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                handler.handle_event(&event.name, &event.measurements, &event.metadata)
            }));
            invoked += 1;

            if outcome.is_err() {
                warn!(
                    handler = %id,
                    event = %event.name,
                    "Handler panicked, detaching"
                );
                remove_handler(&self.handlers, &id);
            }
        }

        // No stream observers is the common case; the event is simply dropped.
        if self.sender.receiver_count() > 0 {
            let _ = self.sender.send(event);
        }

        invoked
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
