//! # Shared Bus - In-Process Telemetry Event Bus
//!
//! Instrumented libraries emit named events (`grpc.client.rpc.start`,
//! `http.client.request.start`, ...) and interested parties attach to them.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐   publish()    ┌──────────────┐  inline   ┌──────────────┐
//! │ Instrumented │ ─────────────→ │  Event Bus   │ ────────→ │   Attached   │
//! │   library    │                │              │           │   handlers   │
//! └──────────────┘                └──────────────┘           └──────────────┘
//!                                        │ broadcast
//!                                        ▼
//!                                 ┌──────────────┐
//!                                 │ EventStream  │
//!                                 └──────────────┘
//! ```
//!
//! - **Attached handlers** run synchronously on the emitter's thread, in
//!   attach order, so they observe the emitter's execution context.
//! - **Faulty handlers** that panic are detached; the emitter is unaffected.
//! - **Streams** are an asynchronous tap for observers that only need the data.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventName, EventNameError, Measurements, Metadata, RawEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventHandler, EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per stream observer before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
