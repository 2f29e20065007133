/*!
 * Store configuration.
 *
 * Behavior flags (debug statement tracing and insert-or-replace write
 * semantics) live on an explicit config struct handed to the store at open
 * time, so independent stores can run with independent settings.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behavior flags for a store
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Log every statement's text, parameters, and outcome at debug level
    #[serde(default)]
    pub debug: bool,

    /// Give INSERTs OR-REPLACE semantics and route updates through the
    /// create path (replace-on-missing instead of zero-rows failure)
    #[serde(default)]
    pub insert_or_replace: bool,
}

impl StoreConfig {
    /// Config with both flags off
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle statement tracing
    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Toggle insert-or-replace write semantics
    pub fn with_insert_or_replace(mut self, on: bool) -> Self {
        self.insert_or_replace = on;
        self
    }

    /// Load a config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
