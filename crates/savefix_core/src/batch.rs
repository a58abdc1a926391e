//! Runs one rule against one file and applies every offered correction.

use savefix_text::Document;
use tracing::info;

use crate::applier::{CorrectionApplier, CorrectionOutcome};
use crate::project::{FileSnapshot, Project, SourceFile};
use crate::rule::{AnalysisContext, RuleHandle};
use crate::sink::ErrorSink;
use crate::RuleError;

/// Why a batch applied nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The project index was still being built.
    NotReady,
    /// The rule itself failed.
    RuleFailed(String),
    /// The batch ran off the privileged thread.
    NotPrivileged,
}

/// Summary of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Problems the rule reported, fixable or not.
    pub problems_found: usize,
    /// One entry per attempted correction, in application order.
    pub outcomes: Vec<CorrectionOutcome>,
    /// Edits that landed in the document.
    pub edits: usize,
}

impl BatchReport {
    /// Returns the number of corrections applied.
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Returns the number of corrections skipped because they failed.
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.applied_count()
    }
}

/// Result of [`FixBatchRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed(BatchReport),
    Aborted(AbortReason),
}

impl BatchOutcome {
    /// Returns the report of a completed batch.
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Aborted(_) => None,
        }
    }
}

/// Applies the fixes of one rule to one file as a single undo step.
pub struct FixBatchRunner<'a> {
    project: &'a Project,
    file: &'a SourceFile,
    rule: &'a RuleHandle,
    sink: &'a dyn ErrorSink,
}

impl<'a> FixBatchRunner<'a> {
    /// Creates a runner.
    pub fn new(
        project: &'a Project,
        file: &'a SourceFile,
        rule: &'a RuleHandle,
        sink: &'a dyn ErrorSink,
    ) -> Self {
        Self {
            project,
            file,
            rule,
            sink,
        }
    }

    /// Runs the batch. Must be called on the privileged thread.
    ///
    /// The rule runs with the document locked, so it must work from the
    /// snapshot it is given rather than reading the document again.
    ///
    /// Nothing escapes: a not-ready index aborts silently, every other
    /// failure is recorded through the error sink.
    pub fn run(&self) -> BatchOutcome {
        match self.file.document().write(|doc| self.run_in(doc)) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.sink.record(
                    &format!(
                        "Cannot apply '{}' fixes to {}",
                        self.rule.short_name(),
                        self.file.path().display()
                    ),
                    &e,
                );
                BatchOutcome::Aborted(AbortReason::NotPrivileged)
            }
        }
    }

    fn run_in(&self, doc: &mut Document) -> BatchOutcome {
        let snapshot = FileSnapshot::capture(self.file.path(), doc);
        let mut ctx = AnalysisContext::new(self.project);

        let reports = match self.rule.run_against(&snapshot, &mut ctx) {
            Ok(reports) => reports,
            Err(RuleError::NotReady) => return BatchOutcome::Aborted(AbortReason::NotReady),
            Err(e) => {
                self.sink.record(
                    &format!(
                        "Rule '{}' failed on {}",
                        self.rule.short_name(),
                        snapshot.path.display()
                    ),
                    &e,
                );
                return BatchOutcome::Aborted(AbortReason::RuleFailed(e.to_string()));
            }
        };

        let applier = CorrectionApplier::new(self.sink);
        let mut report = BatchReport {
            problems_found: reports.len(),
            ..BatchReport::default()
        };

        let mut tx = doc.transaction(format!("Quick fixes: {}", self.rule.short_name()));
        for problem_report in reports {
            let (problem, corrections) = problem_report.into_parts();
            for correction in corrections {
                report
                    .outcomes
                    .push(applier.apply(correction, &mut tx, &problem));
            }
        }
        report.edits = tx.commit();

        if report.edits > 0 {
            info!(
                "Applied {} of {} corrections from '{}' to {}",
                report.applied_count(),
                report.outcomes.len(),
                self.rule.short_name(),
                snapshot.path.display()
            );
        }
        BatchOutcome::Completed(report)
    }
}
