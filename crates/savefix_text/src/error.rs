//! Edit error types.

use thiserror::Error;

use crate::Span;

/// Errors that can occur when editing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The span does not fit inside the document.
    #[error("Span {start}..{end} is out of bounds for document of length {len}")]
    OutOfBounds { start: u32, end: u32, len: usize },

    /// The span splits a UTF-8 character.
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(u32),

    /// The span overlaps text already rewritten in the same transaction.
    #[error("Span {}..{} overlaps an earlier edit", .0.start, .0.end)]
    Stale(Span),
}
