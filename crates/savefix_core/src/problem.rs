//! Problem reports and the corrections they carry.

use std::fmt;

use savefix_text::{Span, TextEdit, Transaction};

use crate::CorrectionError;

/// Where and what a rule found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// The rule that reported this problem.
    pub rule_id: String,
    /// Human-readable description.
    pub message: String,
    /// Byte span in the analysed snapshot.
    pub span: Span,
}

/// A single-shot fix for a [`Problem`].
///
/// `apply` consumes the correction, so it can never run twice. Spans handed
/// out by the rule refer to the analysed snapshot; use
/// [`Transaction::replace_mapped`] to follow edits made by earlier
/// corrections in the same batch.
///
/// Corrections run while the file's [`SharedDocument`](crate::SharedDocument)
/// is locked for writing; they must edit through `tx` and never lock that
/// document again.
pub trait Correction {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Applies the correction.
    fn apply(
        self: Box<Self>,
        tx: &mut Transaction<'_>,
        problem: &Problem,
    ) -> Result<(), CorrectionError>;
}

/// A problem found by a rule, with its candidate corrections in order.
pub struct ProblemReport {
    problem: Problem,
    corrections: Vec<Box<dyn Correction>>,
}

impl ProblemReport {
    /// Creates a report without corrections.
    pub fn new(rule_id: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self {
            problem: Problem {
                rule_id: rule_id.into(),
                message: message.into(),
                span,
            },
            corrections: Vec::new(),
        }
    }

    /// Appends a correction.
    pub fn with_correction(mut self, correction: impl Correction + 'static) -> Self {
        self.corrections.push(Box::new(correction));
        self
    }

    /// Appends an already boxed correction.
    pub fn with_boxed_correction(mut self, correction: Box<dyn Correction>) -> Self {
        self.corrections.push(correction);
        self
    }

    /// Returns the problem.
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Returns the correction names in application order.
    pub fn correction_names(&self) -> Vec<&str> {
        self.corrections.iter().map(|c| c.name()).collect()
    }

    /// Returns whether the problem can be fixed automatically.
    pub fn is_fixable(&self) -> bool {
        !self.corrections.is_empty()
    }

    /// Splits the report into its problem and corrections.
    pub fn into_parts(self) -> (Problem, Vec<Box<dyn Correction>>) {
        (self.problem, self.corrections)
    }
}

impl fmt::Debug for ProblemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemReport")
            .field("problem", &self.problem)
            .field("corrections", &self.correction_names())
            .finish()
    }
}

/// Replaces a snapshot span with new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCorrection {
    name: String,
    edit: TextEdit,
}

impl TextCorrection {
    /// Replaces `span` with `text`.
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self::from_edit(TextEdit::new(span, text))
    }

    /// Inserts `text` at `offset`.
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::from_edit(TextEdit::insert(offset, text))
    }

    /// Deletes `span`.
    pub fn delete(span: Span) -> Self {
        Self::from_edit(TextEdit::delete(span))
    }

    fn from_edit(edit: TextEdit) -> Self {
        Self {
            name: "text edit".to_string(),
            edit,
        }
    }

    /// Sets the name used in logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the edit, in snapshot coordinates.
    pub fn edit(&self) -> &TextEdit {
        &self.edit
    }
}

impl Correction for TextCorrection {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        self: Box<Self>,
        tx: &mut Transaction<'_>,
        _problem: &Problem,
    ) -> Result<(), CorrectionError> {
        let TextCorrection { edit, .. } = *self;
        tx.replace_mapped(edit.span, edit.text)?;
        Ok(())
    }
}

/// A correction backed by a closure.
pub struct FnCorrection<F> {
    name: String,
    apply: F,
}

impl<F> FnCorrection<F>
where
    F: FnOnce(&mut Transaction<'_>, &Problem) -> Result<(), CorrectionError>,
{
    /// Creates a correction that runs `apply`.
    pub fn new(name: impl Into<String>, apply: F) -> Self {
        Self {
            name: name.into(),
            apply,
        }
    }
}

impl<F> Correction for FnCorrection<F>
where
    F: FnOnce(&mut Transaction<'_>, &Problem) -> Result<(), CorrectionError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        self: Box<Self>,
        tx: &mut Transaction<'_>,
        problem: &Problem,
    ) -> Result<(), CorrectionError> {
        (self.apply)(tx, problem)
    }
}
