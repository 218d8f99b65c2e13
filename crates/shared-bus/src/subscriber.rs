//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.
//!
//! Two kinds of subscriber exist:
//!
//! - **Attached handlers** (`EventHandler`) run synchronously inside
//!   `publish`, on the emitting thread or task. Anything that depends on
//!   the emitter's execution context (open transactions, scoped toggles)
//!   must be an attached handler.
//! - **Streams** (`EventStream`) receive a copy of every event over a
//!   broadcast channel and are consumed asynchronously.

use crate::events::{EventFilter, EventName, Measurements, Metadata, RawEvent};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// A handler with the same id is already attached.
    #[error("Handler already attached: {0}")]
    AlreadyAttached(String),

    /// The handler declared no event names.
    #[error("Handler {0} declared no events")]
    NoEvents(String),
}

/// A synchronous event handler.
///
/// Invoked inline by the publisher; implementations must not block.
pub trait EventHandler: Send + Sync {
    /// Handle one event.
    fn handle_event(&self, name: &EventName, measurements: &Measurements, metadata: &Metadata);
}

impl<F> EventHandler for F
where
    F: Fn(&EventName, &Measurements, &Metadata) + Send + Sync,
{
    fn handle_event(&self, name: &EventName, measurements: &Measurements, metadata: &Metadata) {
        self(name, measurements, metadata)
    }
}

/// Trait for attaching synchronous handlers to the bus.
pub trait EventSubscriber: Send + Sync {
    /// Attach `handler` under `handler_id` for the given event names.
    fn attach(
        &self,
        handler_id: &str,
        events: Vec<EventName>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<Subscription, SubscriptionError>;

    /// Detach a handler by id. Returns false if it was not attached.
    fn detach(&self, handler_id: &str) -> bool;
}

/// One entry in the bus handler table.
pub(crate) struct AttachedHandler {
    pub(crate) id: String,
    pub(crate) events: BTreeSet<EventName>,
    pub(crate) handler: Arc<dyn EventHandler>,
}

/// Handler table shared between the bus and its subscription handles.
///
/// Kept in attach order; `publish` runs handlers in that order.
pub(crate) type HandlerTable = Arc<RwLock<Vec<AttachedHandler>>>;

pub(crate) fn remove_handler(table: &HandlerTable, handler_id: &str) -> bool {
    let mut handlers = table.write();
    let before = handlers.len();
    handlers.retain(|h| h.id != handler_id);
    handlers.len() != before
}

/// Handle for an attached handler.
///
/// When dropped, the handler is detached from the bus unless
/// [`Subscription::persist`] was called.
pub struct Subscription {
    /// Id the handler was attached under.
    handler_id: String,

    /// Names the handler receives.
    events: Vec<EventName>,

    /// Reference to the bus handler table (for cleanup).
    handlers: HandlerTable,

    /// Whether dropping this handle detaches the handler.
    detach_on_drop: bool,
}

impl Subscription {
    pub(crate) fn new(handler_id: String, events: Vec<EventName>, handlers: HandlerTable) -> Self {
        Self {
            handler_id,
            events,
            handlers,
            detach_on_drop: true,
        }
    }

    /// The handler id.
    #[must_use]
    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    /// The event names this handler is attached to.
    #[must_use]
    pub fn events(&self) -> &[EventName] {
        &self.events
    }

    /// Keep the handler attached for the lifetime of the bus.
    pub fn persist(mut self) {
        self.detach_on_drop = false;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detach_on_drop {
            return;
        }
        if remove_handler(&self.handlers, &self.handler_id) {
            debug!(handler = %self.handler_id, "Subscription dropped, handler detached");
        }
    }
}

/// An asynchronous stream of published events.
///
/// Lagging consumers skip the events they missed.
pub struct EventStream {
    inner: BroadcastStream<RawEvent>,
    filter: EventFilter,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<RawEvent>, filter: EventFilter) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = RawEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.filter.matches(&event.name) {
                        return Poll::Ready(Some(event));
                    }
                    // Event doesn't match filter, keep polling
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
