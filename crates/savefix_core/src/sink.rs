//! Error sink for failures that must not escape a save action.

use std::error::Error;

use tracing::error;

/// Receives failures that are logged instead of propagated.
pub trait ErrorSink: Send + Sync {
    /// Records `message` with its `cause`. Must not fail.
    fn record(&self, message: &str, cause: &(dyn Error + 'static));
}

/// Default sink: emits an `error` level `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn record(&self, message: &str, cause: &(dyn Error + 'static)) {
        error!(cause = %cause, "{}", message);
    }
}
