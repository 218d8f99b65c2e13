//! Service Layer
//!
//! - `oracle.rs`: asks the monitored resource managers about open transactions
//! - `reporter.rs`: turns detections into stored records or log lines
//! - `dispatcher.rs`: the event handler tying classification, oracle and
//!   reporter together

pub mod dispatcher;
pub mod oracle;
pub mod reporter;

pub use dispatcher::{classify, DispatchOutcome, Dispatcher, HANDLER_ID};
pub use oracle::TransactionOracle;
pub use reporter::{ViolationReporter, ViolationStore};
