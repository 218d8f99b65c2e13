//! # Txn-Guard Test Suite
//!
//! Unified test crate exercising the guard end to end: instrumented code
//! publishes on the bus, the dispatcher attached to it classifies, checks
//! transactions and reports.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── dispatch_benchmarks.rs   # Dispatch hot-path cost
//! └── src/
//!     └── integration/
//!         ├── fixtures.rs          # Harness, recording sink, event builders
//!         ├── guard_flows.rs       # Detection scenarios through the bus
//!         ├── bus_flows.rs         # Bus behaviour the guard relies on
//!         ├── concurrency.rs       # Many threads, one guard
//!         └── async_flows.rs       # Task-local suspension
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p txguard-tests
//!
//! # By category
//! cargo test -p txguard-tests integration::guard_flows::
//! cargo test -p txguard-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p txguard-tests
//! ```

#![allow(dead_code)]
