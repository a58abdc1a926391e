//! Save action error types.

use std::any::Any;

use savefix_text::EditError;
use thiserror::Error;

/// Errors that can occur while setting up or scheduling save actions.
#[derive(Debug, Error)]
pub enum SaveActionError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document write was attempted off the privileged thread.
    #[error("Documents can only be modified on the privileged thread")]
    NotPrivileged,

    /// The privileged queue no longer accepts work.
    #[error("Privileged queue is closed")]
    QueueClosed,

    /// A queued job panicked before producing its result.
    #[error("Queued job did not complete")]
    Interrupted,

    /// Rule error.
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}

impl SaveActionError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Errors reported by a rule run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The project index is still being built.
    #[error("Project index is not ready")]
    NotReady,

    /// The rule failed for any other reason.
    #[error("Rule failed: {0}")]
    Failed(String),
}

impl RuleError {
    /// Creates a failure error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors raised while applying a single correction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectionError {
    /// The correction produced an invalid edit.
    #[error("Invalid edit: {0}")]
    Edit(#[from] EditError),

    /// The correction reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The correction panicked.
    #[error("Correction panicked: {0}")]
    Panicked(String),
}

impl CorrectionError {
    /// Creates a failure error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
