//! The save pipeline that drives processors for one save event.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::{EnabledLookup, SaveActionsConfig};
use crate::processor::Processor;
use crate::Action;

/// Runs the processors registered for a save event in `order()` order.
pub struct SaveActionPipeline {
    config: Arc<SaveActionsConfig>,
    processors: Vec<Box<dyn Processor>>,
}

impl SaveActionPipeline {
    /// Creates an empty pipeline.
    pub fn new(config: Arc<SaveActionsConfig>) -> Self {
        Self {
            config,
            processors: Vec::new(),
        }
    }

    /// Registers a processor.
    pub fn push(&mut self, processor: impl Processor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Returns the number of registered processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Returns true if no processor is registered.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Runs every processor for the file at `path` and returns how many ran.
    ///
    /// Nothing runs unless [`Action::Activate`] is enabled, or when `path`
    /// matches an exclusion glob. Processors with equal `order()` keep their
    /// registration order.
    pub fn run_for(&mut self, path: &Path) -> usize {
        if !self.config.is_enabled(Action::Activate) {
            debug!("Save actions are not activated");
            return 0;
        }
        if self.config.is_excluded(path) {
            debug!("{} is excluded from save actions", path.display());
            return 0;
        }

        self.processors.sort_by_key(|processor| processor.order());
        for processor in &self.processors {
            debug!("Running processor {}", processor);
            processor.run();
        }
        self.processors.len()
    }
}
