//! Mutable documents with grouped undo history.
//!
//! Every mutation goes through a [`Transaction`]. All edits made inside one
//! transaction become a single undo step, so a batch of fixes can be undone
//! by the user in one go.

use tracing::{debug, error};

use crate::{EditError, Span, TextEdit};

/// One undo step: the inverse edits of a committed transaction.
#[derive(Debug)]
struct UndoGroup {
    label: String,
    /// Inverse edits in application order. Undo replays them in reverse.
    inverse: Vec<TextEdit>,
}

/// A text document with an undo history.
#[derive(Debug, Default)]
pub struct Document {
    text: String,
    version: u64,
    undo: Vec<UndoGroup>,
}

impl Document {
    /// Creates a document holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: 0,
            undo: Vec::new(),
        }
    }

    /// Returns the current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the modification counter. Bumped by every applied edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the number of undo steps available.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Returns the label of the most recent undo step.
    pub fn last_undo_label(&self) -> Option<&str> {
        self.undo.last().map(|group| group.label.as_str())
    }

    /// Opens a write transaction.
    ///
    /// The transaction commits when it goes out of scope, unless the thread
    /// is unwinding from a panic, in which case every edit is reverted.
    pub fn transaction(&mut self, label: impl Into<String>) -> Transaction<'_> {
        Transaction {
            doc: self,
            label: label.into(),
            applied: Vec::new(),
            finished: false,
        }
    }

    /// Reverts the most recent undo step and returns its label.
    pub fn undo(&mut self) -> Option<String> {
        let group = self.undo.pop()?;
        for edit in group.inverse.iter().rev() {
            if let Err(e) = self.apply_raw(edit) {
                error!("Failed to undo '{}': {}", group.label, e);
            }
        }
        debug!("Undid '{}'", group.label);
        Some(group.label)
    }

    /// Applies an edit and returns its inverse.
    fn apply_raw(&mut self, edit: &TextEdit) -> Result<TextEdit, EditError> {
        self.check_span(edit.span)?;

        let removed = self.text[edit.span.range()].to_string();
        self.text.replace_range(edit.span.range(), &edit.text);
        self.version += 1;

        let start = edit.span.start;
        Ok(TextEdit::new(
            Span::new(start, start + edit.text.len() as u32),
            removed,
        ))
    }

    fn check_span(&self, span: Span) -> Result<(), EditError> {
        let len = self.text.len();
        if span.start > span.end || span.end as usize > len {
            return Err(EditError::OutOfBounds {
                start: span.start,
                end: span.end,
                len,
            });
        }
        for offset in [span.start, span.end] {
            if !self.text.is_char_boundary(offset as usize) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }
}

/// Position inside a transaction that it can roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug)]
struct AppliedEdit {
    /// The edit in the coordinates of the text it was applied to.
    edit: TextEdit,
    inverse: TextEdit,
}

/// A write transaction over a [`Document`].
///
/// Edits are applied immediately and recorded so the whole transaction
/// forms one undo step on commit.
#[derive(Debug)]
pub struct Transaction<'a> {
    doc: &'a mut Document,
    label: String,
    applied: Vec<AppliedEdit>,
    finished: bool,
}

impl Transaction<'_> {
    /// Returns the current text, including edits made in this transaction.
    pub fn text(&self) -> &str {
        self.doc.text()
    }

    /// Returns the number of edits applied so far.
    pub fn edit_count(&self) -> usize {
        self.applied.len()
    }

    /// Replaces `span` (current coordinates) with `text`.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) -> Result<(), EditError> {
        let edit = TextEdit::new(span, text);
        let inverse = self.doc.apply_raw(&edit)?;
        self.applied.push(AppliedEdit { edit, inverse });
        Ok(())
    }

    /// Inserts `text` at `offset` (current coordinates).
    pub fn insert(&mut self, offset: u32, text: impl Into<String>) -> Result<(), EditError> {
        self.replace(Span::empty(offset), text)
    }

    /// Deletes `span` (current coordinates).
    pub fn delete(&mut self, span: Span) -> Result<(), EditError> {
        self.replace(span, String::new())
    }

    /// Maps a span taken from the text as it was when the transaction opened
    /// to the current text.
    ///
    /// Fails with [`EditError::Stale`] when the span overlaps text that an
    /// earlier edit in this transaction already rewrote.
    pub fn map_span(&self, span: Span) -> Result<Span, EditError> {
        let mut mapped = span;
        for applied in &self.applied {
            let edited = applied.edit.span;
            if mapped.start >= edited.end {
                let shift = applied.edit.delta();
                mapped = Span::new(
                    (i64::from(mapped.start) + shift) as u32,
                    (i64::from(mapped.end) + shift) as u32,
                );
            } else if mapped.end > edited.start {
                return Err(EditError::Stale(span));
            }
        }
        Ok(mapped)
    }

    /// Replaces a span given in the coordinates of the text as it was when
    /// the transaction opened.
    pub fn replace_mapped(
        &mut self,
        span: Span,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        let mapped = self.map_span(span)?;
        self.replace(mapped, text)
    }

    /// Returns a checkpoint to roll back to.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.applied.len())
    }

    /// Reverts every edit made after `checkpoint`.
    pub fn rollback_to(&mut self, checkpoint: Checkpoint) {
        while self.applied.len() > checkpoint.0 {
            let Some(applied) = self.applied.pop() else {
                break;
            };
            if let Err(e) = self.doc.apply_raw(&applied.inverse) {
                error!("Failed to revert edit in '{}': {}", self.label, e);
            }
        }
    }

    /// Commits the transaction as one undo step. Returns the number of edits.
    ///
    /// A transaction without edits leaves the undo history untouched.
    pub fn commit(mut self) -> usize {
        self.finish()
    }

    /// Reverts every edit made in this transaction.
    pub fn rollback(mut self) {
        self.rollback_to(Checkpoint(0));
        self.finished = true;
    }

    fn finish(&mut self) -> usize {
        self.finished = true;
        let count = self.applied.len();
        if count == 0 {
            return 0;
        }

        let inverse = self.applied.drain(..).map(|a| a.inverse).collect();
        self.doc.undo.push(UndoGroup {
            label: std::mem::take(&mut self.label),
            inverse,
        });
        count
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if std::thread::panicking() {
            self.rollback_to(Checkpoint(0));
            self.finished = true;
        } else {
            self.finish();
        }
    }
}
