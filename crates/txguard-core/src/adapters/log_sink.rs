//! `tracing`-backed log sink.

use crate::domain::{Severity, Violation};
use crate::ports::LogSink;

/// Emits violations as `tracing` events at the configured severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, severity: Severity, violation: &Violation) {
        let kind = violation.kind.as_str();
        let manager = violation.manager.as_str();
        let adapter = violation.adapter.as_str();
        let message = violation.message.as_str();

        match severity {
            Severity::Trace => tracing::trace!(kind, manager, adapter, "{message}"),
            Severity::Debug => tracing::debug!(kind, manager, adapter, "{message}"),
            Severity::Info => tracing::info!(kind, manager, adapter, "{message}"),
            Severity::Warn => tracing::warn!(kind, manager, adapter, "{message}"),
            Severity::Error => tracing::error!(kind, manager, adapter, "{message}"),
        }
    }
}
