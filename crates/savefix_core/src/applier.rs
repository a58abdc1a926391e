//! Applies single corrections with failure isolation.

use std::panic::{self, AssertUnwindSafe};

use savefix_text::Transaction;
use tracing::debug;

use crate::error::panic_message;
use crate::sink::ErrorSink;
use crate::{Correction, CorrectionError, Problem};

/// Result of one correction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionOutcome {
    /// Rule that reported the problem.
    pub rule_id: String,
    /// Name of the correction.
    pub correction: String,
    /// Why the correction was skipped, if it was.
    pub error: Option<CorrectionError>,
}

impl CorrectionOutcome {
    /// Returns whether the correction was applied.
    pub fn is_applied(&self) -> bool {
        self.error.is_none()
    }
}

/// Applies corrections one at a time.
///
/// A failing or panicking correction has its own edits reverted and is
/// recorded through the error sink. The failure never reaches the caller.
pub struct CorrectionApplier<'s> {
    sink: &'s dyn ErrorSink,
}

impl<'s> CorrectionApplier<'s> {
    /// Creates an applier that records failures into `sink`.
    pub fn new(sink: &'s dyn ErrorSink) -> Self {
        Self { sink }
    }

    /// Applies `correction` inside `tx`.
    pub fn apply(
        &self,
        correction: Box<dyn Correction>,
        tx: &mut Transaction<'_>,
        problem: &Problem,
    ) -> CorrectionOutcome {
        let name = correction.name().to_string();
        let checkpoint = tx.checkpoint();

        let result = panic::catch_unwind(AssertUnwindSafe(|| correction.apply(tx, problem)))
            .unwrap_or_else(|payload| Err(CorrectionError::Panicked(panic_message(&*payload))));

        let error = match result {
            Ok(()) => {
                debug!("Applied '{}' for {}", name, problem.rule_id);
                None
            }
            Err(e) => {
                tx.rollback_to(checkpoint);
                self.sink.record(
                    &format!(
                        "Failed to apply '{}' for {}: {}",
                        name, problem.rule_id, e
                    ),
                    &e,
                );
                Some(e)
            }
        };

        CorrectionOutcome {
            rule_id: problem.rule_id.clone(),
            correction: name,
            error,
        }
    }
}
