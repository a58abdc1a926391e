//! Shared fixtures for save action integration tests.

#![allow(dead_code)]

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use savefix_core::{
    Action, AnalysisContext, BatchOutcome, EnabledLookup, ErrorSink, FileSnapshot,
    FixBatchRunner, LocalRule, PrivilegedQueue, ProblemReport, Project, RuleError, RuleHandle,
    SaveActionProcessor, SaveActionsConfig, SharedDocument, SourceFile, Span, TextCorrection,
};

/// Error sink that keeps every recorded message.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

impl ErrorSink for RecordingSink {
    fn record(&self, message: &str, _cause: &(dyn Error + 'static)) {
        self.records.lock().push(message.to_string());
    }
}

/// Local rule backed by a closure that counts its invocations.
pub struct FnRule<F> {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    check: F,
}

impl<F> FnRule<F>
where
    F: Fn(&FileSnapshot) -> Result<Vec<ProblemReport>, RuleError> + Send + Sync,
{
    pub fn new(name: &'static str, check: F) -> Self {
        Self {
            name,
            calls: Arc::new(AtomicUsize::new(0)),
            check,
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<F> LocalRule for FnRule<F>
where
    F: Fn(&FileSnapshot) -> Result<Vec<ProblemReport>, RuleError> + Send + Sync,
{
    fn short_name(&self) -> &str {
        self.name
    }

    fn check_file(
        &self,
        file: &FileSnapshot,
        _ctx: &AnalysisContext<'_>,
    ) -> Result<Vec<ProblemReport>, RuleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.check)(file)
    }
}

/// Reports trailing spaces on every line, fixable by deletion.
pub struct TrailingWhitespace;

impl LocalRule for TrailingWhitespace {
    fn short_name(&self) -> &str {
        "trailing-whitespace"
    }

    fn check_file(
        &self,
        file: &FileSnapshot,
        _ctx: &AnalysisContext<'_>,
    ) -> Result<Vec<ProblemReport>, RuleError> {
        let mut reports = Vec::new();
        let mut offset = 0u32;
        for line in file.text.split_inclusive('\n') {
            let body = line.strip_suffix('\n').unwrap_or(line);
            let trimmed = body.trim_end_matches(' ');
            if trimmed.len() < body.len() {
                let span = Span::new(offset + trimmed.len() as u32, offset + body.len() as u32);
                reports.push(
                    ProblemReport::new(self.short_name(), "Trailing whitespace", span)
                        .with_correction(TextCorrection::delete(span).named("remove whitespace")),
                );
            }
            offset += line.len() as u32;
        }
        Ok(reports)
    }
}

/// Enabled lookup that counts how often it is asked.
pub struct CountingLookup {
    enabled: bool,
    queries: AtomicUsize,
}

impl CountingLookup {
    pub fn new(enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            enabled,
            queries: AtomicUsize::new(0),
        })
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl EnabledLookup for CountingLookup {
    fn is_enabled(&self, _action: Action) -> bool {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.enabled
    }
}

/// A project with one open file and a privileged queue.
pub struct Fixture {
    pub queue: PrivilegedQueue,
    pub project: Arc<Project>,
    pub file: SourceFile,
    pub sink: Arc<RecordingSink>,
}

impl Fixture {
    pub fn new(text: &str) -> Self {
        Self {
            queue: PrivilegedQueue::start("savefix-test").expect("Failed to start queue"),
            project: Arc::new(Project::new("demo")),
            file: SourceFile::new("src/Main.java", SharedDocument::new(text)),
            sink: Arc::new(RecordingSink::default()),
        }
    }

    pub fn enabled_config(action: Action) -> Arc<SaveActionsConfig> {
        Arc::new(
            SaveActionsConfig::new()
                .with_action(Action::Activate)
                .with_action(action),
        )
    }

    pub fn processor(
        &self,
        storage: Arc<dyn EnabledLookup>,
        action: Action,
        rule: RuleHandle,
    ) -> SaveActionProcessor {
        SaveActionProcessor::new(
            Arc::clone(&self.project),
            self.file.clone(),
            storage,
            action,
            rule,
            self.queue.handle(),
        )
        .with_error_sink(self.sink.clone())
    }

    /// Runs a batch on the privileged thread and returns its outcome.
    pub fn run_batch(&self, rule: RuleHandle) -> BatchOutcome {
        let project = Arc::clone(&self.project);
        let file = self.file.clone();
        let sink = Arc::clone(&self.sink);
        self.queue
            .handle()
            .invoke_and_wait(move || FixBatchRunner::new(&project, &file, &rule, sink.as_ref()).run())
            .expect("Batch did not run")
    }

    /// Waits for all queued work.
    pub fn flush(&self) {
        self.queue.handle().flush().expect("Failed to flush queue");
    }

    /// Undoes the last step on the privileged thread.
    pub fn undo(&self) -> Option<String> {
        let document = self.file.document().clone();
        self.queue
            .handle()
            .invoke_and_wait(move || document.write(|doc| doc.undo()))
            .expect("Undo did not run")
            .expect("Undo refused")
    }

    pub fn text(&self) -> String {
        self.file.document().text()
    }
}
