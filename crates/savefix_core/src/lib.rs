//! # savefix_core
//!
//! Save-time inspection runner for savefix.
//!
//! This crate provides:
//! - [`RuleHandle`] over file-scoped and project-scoped rules
//! - The quick-fix engine ([`FixBatchRunner`], [`CorrectionApplier`])
//! - [`SaveActionProcessor`], which gates a rule on its [`Action`] and queues
//!   the fixes on the [`PrivilegedQueue`]
//! - [`SaveActionPipeline`] and [`SaveActionsConfig`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use savefix_core::*;
//!
//! let queue = PrivilegedQueue::start("savefix-writer")?;
//! let config = Arc::new(SaveActionsConfig::from_file("save-actions.json")?);
//! let file = SourceFile::new("src/Main.java", SharedDocument::new(source));
//!
//! let mut pipeline = SaveActionPipeline::new(Arc::clone(&config));
//! pipeline.push(SaveActionProcessor::new(
//!     Arc::new(Project::new("demo")),
//!     file.clone(),
//!     config,
//!     Action::FieldCanBeFinal,
//!     RuleHandle::local(FieldCanBeFinal),
//!     queue.handle(),
//! ));
//! pipeline.run_for(file.path());
//! ```

mod action;
mod applier;
mod batch;
mod config;
mod error;
mod pipeline;
mod problem;
mod processor;
mod project;
mod queue;
mod rule;
mod sink;

pub use action::Action;
pub use applier::{CorrectionApplier, CorrectionOutcome};
pub use batch::{AbortReason, BatchOutcome, BatchReport, FixBatchRunner};
pub use config::{EnabledLookup, SaveActionsConfig};
pub use error::{CorrectionError, RuleError, SaveActionError};
pub use pipeline::SaveActionPipeline;
pub use problem::{Correction, FnCorrection, Problem, ProblemReport, TextCorrection};
pub use processor::{Processor, SaveActionProcessor};
pub use project::{FileSnapshot, Project, SharedDocument, SourceFile};
pub use queue::{PrivilegedQueue, QueueHandle, is_privileged_thread};
pub use rule::{AnalysisContext, GlobalRule, LocalRule, RuleHandle, RuleScope};
pub use sink::{ErrorSink, TracingErrorSink};

pub use savefix_text::{Document, EditError, Span, TextEdit, Transaction};
