//! Integration tests for applying inspection fixes on save.
//!
//! These tests drive processors and batches through a real privileged queue
//! and check the resulting documents and undo history.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{CountingLookup, FnRule, Fixture, TrailingWhitespace};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use savefix_core::{
    AbortReason, Action, AnalysisContext, BatchOutcome, CorrectionError, FileSnapshot,
    FnCorrection, GlobalRule, Problem, ProblemReport, Processor, RuleError, RuleHandle,
    SaveActionPipeline, SaveActionsConfig, Span, TextCorrection, Transaction,
};

#[test]
fn test_disabled_action_schedules_nothing() {
    let fixture = Fixture::new("int x = 1;  ");
    let rule = FnRule::new("trailing", |_| {
        Ok(vec![
            ProblemReport::new("trailing", "Trailing", Span::new(10, 12))
                .with_correction(TextCorrection::delete(Span::new(10, 12))),
        ])
    });
    let calls = rule.calls();
    let lookup = CountingLookup::new(false);

    let processor = fixture.processor(lookup.clone(), Action::FieldCanBeFinal, RuleHandle::local(rule));
    processor.run();
    assert_eq!(fixture.queue.handle().pending(), 0);
    fixture.flush();

    assert_eq!(lookup.queries(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.text(), "int x = 1;  ");
    assert_eq!(fixture.file.document().version(), 0);
    assert_eq!(fixture.sink.len(), 0);
}

#[test]
fn test_enabled_action_applies_fixes_later_on_queue() {
    let fixture = Fixture::new("int x = 1;  \nint y = 2; \n");
    let processor = fixture.processor(
        Fixture::enabled_config(Action::UnnecessarySemicolon),
        Action::UnnecessarySemicolon,
        RuleHandle::local(TrailingWhitespace),
    );

    processor.run();
    fixture.flush();

    assert_eq!(fixture.text(), "int x = 1;\nint y = 2;\n");
    assert_eq!(fixture.file.document().undo_depth(), 1);
    assert_eq!(fixture.sink.len(), 0);
}

#[test]
fn test_not_ready_aborts_silently() {
    let fixture = Fixture::new("int x = 1;");
    let rule = FnRule::new("needs-index", |_| Err(RuleError::NotReady));
    let processor = fixture.processor(
        Fixture::enabled_config(Action::MethodMayBeStatic),
        Action::MethodMayBeStatic,
        RuleHandle::local(rule),
    );

    processor.run();
    fixture.flush();

    assert_eq!(fixture.text(), "int x = 1;");
    assert_eq!(fixture.file.document().version(), 0);
    assert_eq!(fixture.sink.len(), 0);
}

struct FieldCanBeFinal;

impl GlobalRule for FieldCanBeFinal {
    fn short_name(&self) -> &str {
        "field-can-be-final"
    }

    fn check(&self, file: &FileSnapshot, ctx: &mut AnalysisContext<'_>) -> Result<(), RuleError> {
        for (offset, _) in file.text.match_indices("private int") {
            let start = offset as u32 + "private ".len() as u32;
            ctx.report(
                ProblemReport::new(self.short_name(), "Field can be final", Span::new(start, start + 3))
                    .with_correction(TextCorrection::insert(start, "final ").named("add final")),
            );
        }
        Ok(())
    }
}

#[test]
fn test_global_rule_waits_for_index() {
    let fixture = Fixture::new("private int a;");
    fixture.project.set_index_ready(false);

    let outcome = fixture.run_batch(RuleHandle::global(FieldCanBeFinal));

    assert_eq!(outcome, BatchOutcome::Aborted(AbortReason::NotReady));
    assert_eq!(fixture.text(), "private int a;");
    assert_eq!(fixture.sink.len(), 0);

    fixture.project.set_index_ready(true);
    let outcome = fixture.run_batch(RuleHandle::global(FieldCanBeFinal));

    assert_eq!(outcome.report().map(|r| r.applied_count()), Some(1));
    assert_eq!(fixture.text(), "private final int a;");
}

#[test]
fn test_global_rule_through_processor() {
    let fixture = Fixture::new("private int a;\nprivate int b;\n");
    let processor = fixture.processor(
        Fixture::enabled_config(Action::FieldCanBeFinal),
        Action::FieldCanBeFinal,
        RuleHandle::global(FieldCanBeFinal),
    );

    processor.run();
    fixture.flush();

    assert_eq!(
        fixture.text(),
        "private final int a;\nprivate final int b;\n"
    );
    assert_eq!(fixture.file.document().undo_depth(), 1);
}

#[test]
fn test_report_without_corrections_is_not_applied() {
    let fixture = Fixture::new("int x = 1;");
    let rule = FnRule::new("detect-only", |_| {
        Ok(vec![ProblemReport::new(
            "detect-only",
            "Looks odd",
            Span::new(0, 3),
        )])
    });

    let outcome = fixture.run_batch(RuleHandle::local(rule));

    let report = outcome.report().expect("batch should complete");
    assert_eq!(report.problems_found, 1);
    assert!(report.outcomes.is_empty());
    assert_eq!(report.edits, 0);
    assert_eq!(fixture.file.document().undo_depth(), 0);
}

#[test]
fn test_failing_correction_is_skipped_and_rest_applied() {
    let fixture = Fixture::new("value");
    let rule = FnRule::new("wrap", |_| {
        Ok(vec![
            ProblemReport::new("wrap", "Wrap value", Span::new(0, 5))
                .with_correction(FnCorrection::new(
                    "broken",
                    |_: &mut Transaction<'_>, _: &Problem| {
                        Err(CorrectionError::failed("PSI element is invalid"))
                    },
                ))
                .with_correction(TextCorrection::insert(0, "(").named("open")),
        ])
    });

    let outcome = fixture.run_batch(RuleHandle::local(rule));

    let report = outcome.report().expect("batch should complete");
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.applied_count(), 1);
    assert_eq!(fixture.text(), "(value");
    assert_eq!(
        fixture.sink.messages(),
        vec!["Failed to apply 'broken' for wrap: PSI element is invalid".to_string()]
    );
    assert_eq!(fixture.file.document().undo_depth(), 1);

    fixture.undo();
    assert_eq!(fixture.text(), "value");
}

#[test]
fn test_failure_in_one_report_does_not_stop_later_reports() {
    let fixture = Fixture::new("a b c");
    let rule = FnRule::new("upper", |_| {
        Ok(vec![
            ProblemReport::new("upper", "Upper a", Span::new(0, 1))
                .with_correction(TextCorrection::replace(Span::new(0, 1), "A")),
            ProblemReport::new("upper", "Upper b", Span::new(2, 3)).with_correction(
                FnCorrection::new("panics", |_: &mut Transaction<'_>, _: &Problem| {
                    panic!("unexpected tree shape")
                }),
            ),
            ProblemReport::new("upper", "Upper c", Span::new(4, 5))
                .with_correction(TextCorrection::replace(Span::new(4, 5), "C")),
        ])
    });

    let outcome = fixture.run_batch(RuleHandle::local(rule));

    assert_eq!(outcome.report().map(|r| r.applied_count()), Some(2));
    assert_eq!(fixture.text(), "A b C");
    assert_eq!(fixture.sink.len(), 1);
}

#[test]
fn test_every_correction_of_a_report_is_applied_in_order() {
    let fixture = Fixture::new("x");
    let rule = FnRule::new("decorate", |_| {
        Ok(vec![
            ProblemReport::new("decorate", "Decorate", Span::new(0, 1))
                .with_correction(TextCorrection::insert(1, "1"))
                .with_correction(TextCorrection::insert(1, "2"))
                .with_correction(TextCorrection::insert(0, "<")),
        ])
    });

    fixture.run_batch(RuleHandle::local(rule));

    assert_eq!(fixture.text(), "<x12");
    assert_eq!(fixture.file.document().undo_depth(), 1);
}

#[test]
fn test_rule_failure_is_recorded_and_nothing_applied() {
    let fixture = Fixture::new("text");
    let rule = FnRule::new("crashes", |_| Err(RuleError::failed("visitor overflow")));

    let outcome = fixture.run_batch(RuleHandle::local(rule));

    assert_eq!(
        outcome,
        BatchOutcome::Aborted(AbortReason::RuleFailed(
            "Rule failed: visitor overflow".to_string()
        ))
    );
    assert_eq!(fixture.text(), "text");
    assert_eq!(fixture.sink.messages(), vec!["Rule 'crashes' failed on src/Main.java".to_string()]);
}

#[test]
fn test_second_run_is_idempotent() {
    let fixture = Fixture::new("a  \nb \nc\n");

    fixture.run_batch(RuleHandle::local(TrailingWhitespace));
    let version = fixture.file.document().version();
    assert_eq!(fixture.text(), "a\nb\nc\n");

    let outcome = fixture.run_batch(RuleHandle::local(TrailingWhitespace));

    let report = outcome.report().expect("batch should complete");
    assert_eq!(report.problems_found, 0);
    assert_eq!(report.edits, 0);
    assert_eq!(fixture.file.document().version(), version);
    assert_eq!(fixture.file.document().undo_depth(), 1);
}

#[test]
fn test_later_correction_observes_earlier_offset_shift() {
    let text = format!("{}foo{}", "a".repeat(50), "b".repeat(7));
    let fixture = Fixture::new(&text);
    let order = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&order);
    let rule = FnRule::new("ordered", move |_| {
        let first = Arc::clone(&log);
        let second = Arc::clone(&log);
        Ok(vec![
            ProblemReport::new("ordered", "R1", Span::new(10, 10)).with_correction(
                FnCorrection::new("r1", move |tx: &mut Transaction<'_>, problem: &Problem| {
                    first.lock().push(("r1", problem.span.start));
                    tx.replace_mapped(problem.span, "XXXX")?;
                    Ok(())
                }),
            ),
            ProblemReport::new("ordered", "R2", Span::new(50, 53)).with_correction(
                FnCorrection::new("r2", move |tx: &mut Transaction<'_>, problem: &Problem| {
                    let current = tx.map_span(problem.span)?;
                    second.lock().push(("r2", current.start));
                    tx.replace(current, "bar")?;
                    Ok(())
                }),
            ),
        ])
    });

    fixture.run_batch(RuleHandle::local(rule));

    assert_eq!(*order.lock(), vec![("r1", 10), ("r2", 54)]);
    let expected = format!("{}XXXX{}bar{}", "a".repeat(10), "a".repeat(40), "b".repeat(7));
    assert_eq!(fixture.text(), expected);
}

#[test]
fn test_stale_correction_is_skipped() {
    let fixture = Fixture::new("hello world");
    let rule = FnRule::new("overlap", |_| {
        Ok(vec![
            ProblemReport::new("overlap", "Greeting", Span::new(0, 5))
                .with_correction(TextCorrection::replace(Span::new(0, 5), "hi")),
            ProblemReport::new("overlap", "Same word", Span::new(3, 8))
                .with_correction(TextCorrection::replace(Span::new(3, 8), "???")),
        ])
    });

    let outcome = fixture.run_batch(RuleHandle::local(rule));

    assert_eq!(outcome.report().map(|r| r.failed_count()), Some(1));
    assert_eq!(fixture.text(), "hi world");
    assert_eq!(fixture.sink.len(), 1);
}

#[test]
fn test_insertion_end_to_end_is_one_undo_step() {
    let fixture = Fixture::new("class A {}\n");
    let rule = FnRule::new("missing-override", |file| {
        let offset = file.text.find('}').map(|i| i as u32).unwrap_or(0);
        Ok(vec![
            ProblemReport::new("missing-override", "Missing @Override", Span::empty(offset))
                .with_correction(TextCorrection::insert(offset, "@Override void run() {} ")),
        ])
    });
    let processor = fixture.processor(
        Fixture::enabled_config(Action::MissingOverrideAnnotation),
        Action::MissingOverrideAnnotation,
        RuleHandle::local(rule),
    );

    processor.run();
    fixture.flush();

    assert_eq!(fixture.text(), "class A {@Override void run() {} }\n");
    assert_eq!(fixture.file.document().undo_depth(), 1);

    assert_eq!(fixture.undo(), Some("Quick fixes: missing-override".to_string()));
    assert_eq!(fixture.text(), "class A {}\n");
    assert_eq!(fixture.file.document().undo_depth(), 0);
}

#[test]
fn test_processor_display_and_order() {
    let fixture = Fixture::new("");
    let config = Arc::new(SaveActionsConfig::new().with_action(Action::UseBlocks));

    let enabled = fixture.processor(config.clone(), Action::UseBlocks, RuleHandle::local(TrailingWhitespace));
    let disabled = fixture.processor(config, Action::UnnecessaryThis, RuleHandle::local(TrailingWhitespace));

    assert_eq!(enabled.to_string(), "trailing-whitespace (enabled: true)");
    assert_eq!(disabled.to_string(), "trailing-whitespace (enabled: false)");
    assert_eq!(enabled.order(), 0);
    assert_eq!(enabled.action(), Action::UseBlocks);
}

#[test]
fn test_pipeline_runs_processors_for_a_save() {
    let fixture = Fixture::new("private int a;  \n");
    let config = Arc::new(
        SaveActionsConfig::new()
            .with_action(Action::Activate)
            .with_action(Action::FieldCanBeFinal)
            .with_action(Action::UnnecessarySemicolon),
    );

    let mut pipeline = SaveActionPipeline::new(Arc::clone(&config));
    pipeline.push(fixture.processor(
        config.clone(),
        Action::FieldCanBeFinal,
        RuleHandle::global(FieldCanBeFinal),
    ));
    pipeline.push(fixture.processor(
        config.clone(),
        Action::UnnecessarySemicolon,
        RuleHandle::local(TrailingWhitespace),
    ));

    let ran = pipeline.run_for(Path::new("src/Main.java"));
    fixture.flush();

    assert_eq!(ran, 2);
    assert_eq!(fixture.text(), "private final int a;\n");
    assert_eq!(fixture.file.document().undo_depth(), 2);
}
