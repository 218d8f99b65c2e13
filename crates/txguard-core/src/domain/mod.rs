//! Domain Layer
//!
//! Pure types with no I/O: classified operations, transaction state,
//! violations and the scoped detection toggle.

pub mod operation;
pub mod toggle;
pub mod transaction;
pub mod violation;

pub use operation::{render_value, Classification, OperationKind, OperationMetadata, ABSENT};
pub use toggle::{is_suspended, run_disabled, run_disabled_async, DetectionSuspended};
pub use transaction::{ResourceManagerRef, TransactionState};
pub use violation::{ReportingMode, Severity, Violation};
