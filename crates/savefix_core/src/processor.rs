//! Save action processors.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::batch::FixBatchRunner;
use crate::config::EnabledLookup;
use crate::project::{Project, SourceFile};
use crate::queue::QueueHandle;
use crate::rule::RuleHandle;
use crate::sink::{ErrorSink, TracingErrorSink};
use crate::Action;

/// One step of the save pipeline.
pub trait Processor: fmt::Display {
    /// Runs the step. Must not block on document work.
    fn run(&self);

    /// Position in the pipeline; lower runs first.
    fn order(&self) -> i32;
}

/// Applies the quick fixes of one inspection rule to one file on save.
///
/// `run` only checks whether the action is enabled and queues the work; the
/// document is modified later, on the privileged queue thread, as a single
/// undo step.
pub struct SaveActionProcessor {
    project: Arc<Project>,
    file: SourceFile,
    storage: Arc<dyn EnabledLookup>,
    action: Action,
    rule: RuleHandle,
    queue: QueueHandle,
    sink: Arc<dyn ErrorSink>,
}

impl SaveActionProcessor {
    /// Creates a processor for `rule` on `file`, gated by `action`.
    pub fn new(
        project: Arc<Project>,
        file: SourceFile,
        storage: Arc<dyn EnabledLookup>,
        action: Action,
        rule: impl Into<RuleHandle>,
        queue: QueueHandle,
    ) -> Self {
        Self {
            project,
            file,
            storage,
            action,
            rule: rule.into(),
            queue,
            sink: Arc::new(TracingErrorSink),
        }
    }

    /// Replaces the default `tracing` error sink.
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the rule.
    pub fn rule(&self) -> &RuleHandle {
        &self.rule
    }

    /// Returns the gating action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the target file.
    pub fn file(&self) -> &SourceFile {
        &self.file
    }
}

impl Processor for SaveActionProcessor {
    fn run(&self) {
        if !self.storage.is_enabled(self.action) {
            debug!(
                "Action '{}' disabled, skipping '{}'",
                self.action,
                self.rule.short_name()
            );
            return;
        }

        let project = Arc::clone(&self.project);
        let file = self.file.clone();
        let rule = self.rule.clone();
        let sink = Arc::clone(&self.sink);

        self.queue.invoke_later(move || {
            FixBatchRunner::new(&project, &file, &rule, sink.as_ref()).run();
        });
    }

    fn order(&self) -> i32 {
        0
    }
}

impl fmt::Display for SaveActionProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (enabled: {})",
            self.rule.short_name(),
            self.storage.is_enabled(self.action)
        )
    }
}

impl fmt::Debug for SaveActionProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveActionProcessor")
            .field("file", &self.file.path())
            .field("action", &self.action)
            .field("rule", &self.rule)
            .finish()
    }
}
