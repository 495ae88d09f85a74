//! Front-end configuration.
//!
//! Everything has a default, so an empty document (or no document at all) yields
//! the stock behaviour. Configuration can be loaded from YAML or JSON:
//!
//! ```yaml
//! cache_threshold: 20000
//! max_rule_depth: 400
//! start_rule: program
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheGuard, DEFAULT_CACHE_THRESHOLD};
use crate::error::{ArboristError, Result};
use crate::runtime::DEFAULT_MAX_RULE_DEPTH;

/// Tunables for a [`Frontend`](crate::frontend::Frontend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
    /// Interned prediction contexts allowed before the shared cache is cleared.
    pub cache_threshold: usize,
    /// Rule invocations allowed to nest before the parser reports the input as
    /// too deep.
    pub max_rule_depth: usize,
    /// Entry point to invoke instead of the grammar's default start rule.
    pub start_rule: Option<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            cache_threshold: DEFAULT_CACHE_THRESHOLD,
            max_rule_depth: DEFAULT_MAX_RULE_DEPTH,
            start_rule: None,
        }
    }
}

impl FrontendConfig {
    pub fn with_cache_threshold(mut self, threshold: usize) -> Self {
        self.cache_threshold = threshold;
        self
    }

    pub fn with_max_rule_depth(mut self, depth: usize) -> Self {
        self.max_rule_depth = depth;
        self
    }

    pub fn with_start_rule(mut self, rule: impl Into<String>) -> Self {
        self.start_rule = Some(rule.into());
        self
    }

    pub fn cache_guard(&self) -> CacheGuard {
        CacheGuard::new(self.cache_threshold)
    }

    /// # Errors
    ///
    /// [`ArboristError::Config`] if the document is not valid YAML for this type.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ArboristError::config(e.to_string()))
    }

    /// # Errors
    ///
    /// [`ArboristError::Config`] if the document is not valid JSON for this type.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ArboristError::config(e.to_string()))
    }

    /// Loads a config file, choosing JSON for `.json` files and YAML otherwise.
    ///
    /// # Errors
    ///
    /// [`ArboristError::Io`] if the file cannot be read, [`ArboristError::Config`] if
    /// it cannot be decoded.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ArboristError::io(path, e))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }
}
