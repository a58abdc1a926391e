//! # savefix_text
//!
//! Text model for savefix.
//!
//! This crate provides:
//! - Byte [`Span`]s and replacement [`TextEdit`]s
//! - A [`Document`] with a grouped undo history
//! - Write [`Transaction`]s that land as a single undo step
//!
//! ## Example
//!
//! ```rust
//! use savefix_text::{Document, Span};
//!
//! let mut doc = Document::new("Hello World");
//! {
//!     let mut tx = doc.transaction("fixes");
//!     tx.replace(Span::new(0, 5), "Hi").unwrap();
//! }
//! assert_eq!(doc.text(), "Hi World");
//!
//! doc.undo();
//! assert_eq!(doc.text(), "Hello World");
//! ```

mod document;
mod error;
mod span;

pub use document::{Checkpoint, Document, Transaction};
pub use error::EditError;
pub use span::{Span, TextEdit};
