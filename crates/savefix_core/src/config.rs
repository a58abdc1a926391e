//! Save action settings.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::{Action, SaveActionError};

/// Answers whether a save action is switched on.
pub trait EnabledLookup: Send + Sync {
    /// Returns whether `action` is enabled.
    fn is_enabled(&self, action: Action) -> bool;
}

/// Persisted save action settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveActionsConfig {
    /// Actions that are switched on.
    #[serde(default)]
    pub actions: BTreeSet<Action>,

    /// Glob patterns of files that save actions never touch.
    #[serde(default)]
    exclude: Vec<String>,

    #[serde(skip)]
    exclude_globs: Option<GlobSet>,
}

impl SaveActionsConfig {
    /// Creates a configuration with every action switched off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SaveActionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SaveActionError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SaveActionError> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| SaveActionError::config(format!("Invalid config: {}", e)))?;
        config.exclude_globs = build_globset(&config.exclude)?;
        Ok(config)
    }

    /// Switches `action` on.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.insert(action);
        self
    }

    /// Switches `action` on.
    pub fn enable(&mut self, action: Action) {
        self.actions.insert(action);
    }

    /// Switches `action` off.
    pub fn disable(&mut self, action: Action) {
        self.actions.remove(&action);
    }

    /// Adds an exclusion glob.
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Result<Self, SaveActionError> {
        self.exclude.push(pattern.into());
        self.exclude_globs = build_globset(&self.exclude)?;
        Ok(self)
    }

    /// Returns the exclusion globs.
    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude
    }

    /// Returns whether `path` matches an exclusion glob.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_globs
            .as_ref()
            .is_some_and(|globs| globs.is_match(path))
    }
}

impl EnabledLookup for SaveActionsConfig {
    fn is_enabled(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, SaveActionError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| SaveActionError::config(format!("Invalid glob pattern: {}", e)))?;
        builder.add(glob);
    }

    let globset = builder
        .build()
        .map_err(|e| SaveActionError::config(format!("Failed to build globset: {}", e)))?;

    Ok(Some(globset))
}
