//! Inspection rules and the handle that runs them.
//!
//! Rules come in two scopes. A [`LocalRule`] looks at one file and returns
//! its problems directly. A [`GlobalRule`] runs inside a project-wide
//! [`AnalysisContext`] and reports into it. [`RuleHandle`] hides the
//! difference: both produce the same `Vec<ProblemReport>`.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::project::{FileSnapshot, Project};
use crate::{ProblemReport, RuleError};

/// A rule that inspects a single file.
pub trait LocalRule: Send + Sync {
    /// Stable short name used for display and logs.
    fn short_name(&self) -> &str;

    /// Inspects `file` and returns the problems found.
    fn check_file(
        &self,
        file: &FileSnapshot,
        ctx: &AnalysisContext<'_>,
    ) -> Result<Vec<ProblemReport>, RuleError>;
}

/// A rule that needs project-wide analysis, invoked per file.
pub trait GlobalRule: Send + Sync {
    /// Stable short name used for display and logs.
    fn short_name(&self) -> &str;

    /// Inspects `file`, reporting problems through `ctx`.
    fn check(&self, file: &FileSnapshot, ctx: &mut AnalysisContext<'_>) -> Result<(), RuleError>;
}

/// Per-run analysis state. A fresh context is created for every batch.
#[derive(Debug)]
pub struct AnalysisContext<'p> {
    project: &'p Project,
    reported: Vec<ProblemReport>,
}

impl<'p> AnalysisContext<'p> {
    /// Creates an empty context for `project`.
    pub fn new(project: &'p Project) -> Self {
        Self {
            project,
            reported: Vec::new(),
        }
    }

    /// Returns the project under analysis.
    pub fn project(&self) -> &'p Project {
        self.project
    }

    /// Fails with [`RuleError::NotReady`] while the project index is being built.
    pub fn require_index(&self) -> Result<(), RuleError> {
        if self.project.is_index_ready() {
            Ok(())
        } else {
            Err(RuleError::NotReady)
        }
    }

    /// Records a problem.
    pub fn report(&mut self, report: ProblemReport) {
        self.reported.push(report);
    }

    /// Returns the number of problems recorded so far.
    pub fn reported_count(&self) -> usize {
        self.reported.len()
    }

    fn take_reports(&mut self) -> Vec<ProblemReport> {
        std::mem::take(&mut self.reported)
    }
}

/// Scope of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleScope {
    Local,
    Global,
}

/// A rule of either scope.
#[derive(Clone)]
pub enum RuleHandle {
    Local(Arc<dyn LocalRule>),
    Global(Arc<dyn GlobalRule>),
}

impl RuleHandle {
    /// Wraps a file-scoped rule.
    pub fn local(rule: impl LocalRule + 'static) -> Self {
        Self::Local(Arc::new(rule))
    }

    /// Wraps a project-scoped rule.
    pub fn global(rule: impl GlobalRule + 'static) -> Self {
        Self::Global(Arc::new(rule))
    }

    /// Returns the rule's short name.
    pub fn short_name(&self) -> &str {
        match self {
            Self::Local(rule) => rule.short_name(),
            Self::Global(rule) => rule.short_name(),
        }
    }

    /// Returns the rule's scope.
    pub fn scope(&self) -> RuleScope {
        match self {
            Self::Local(_) => RuleScope::Local,
            Self::Global(_) => RuleScope::Global,
        }
    }

    /// Runs the rule against `file`.
    ///
    /// Global rules need the project index and fail with
    /// [`RuleError::NotReady`] before running while it is incomplete.
    pub fn run_against(
        &self,
        file: &FileSnapshot,
        ctx: &mut AnalysisContext<'_>,
    ) -> Result<Vec<ProblemReport>, RuleError> {
        let reports = match self {
            Self::Local(rule) => rule.check_file(file, ctx)?,
            Self::Global(rule) => {
                ctx.require_index()?;
                rule.check(file, ctx)?;
                ctx.take_reports()
            }
        };

        debug!(
            "Rule '{}' reported {} problems in {}",
            self.short_name(),
            reports.len(),
            file.path.display()
        );
        Ok(reports)
    }
}

impl From<Arc<dyn LocalRule>> for RuleHandle {
    fn from(rule: Arc<dyn LocalRule>) -> Self {
        Self::Local(rule)
    }
}

impl From<Arc<dyn GlobalRule>> for RuleHandle {
    fn from(rule: Arc<dyn GlobalRule>) -> Self {
        Self::Global(rule)
    }
}

impl fmt::Debug for RuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleHandle")
            .field("short_name", &self.short_name())
            .field("scope", &self.scope())
            .finish()
    }
}
