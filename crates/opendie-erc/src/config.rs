use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::severity::Severity;
use crate::violation::ViolationClass;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid rule-check configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rule-check settings, usually stored next to the project.
///
/// ```json
/// { "severities": { "net.uniform_port_direction": "error" }, "disabled": ["net"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErcConfig {
    /// Per-class overrides of the default severity table.
    #[serde(default)]
    pub severities: BTreeMap<ViolationClass, Severity>,
    /// Names of checks that are skipped.
    #[serde(default)]
    pub disabled: BTreeSet<String>,
}

impl ErcConfig {
    pub fn severity_for(&self, class: ViolationClass) -> Severity {
        self.severities
            .get(&class)
            .copied()
            .unwrap_or_else(|| Severity::default_for(class))
    }

    pub fn with_severity(mut self, class: ViolationClass, severity: Severity) -> Self {
        self.severities.insert(class, severity);
        self
    }

    pub fn with_disabled(mut self, check: &str) -> Self {
        self.disabled.insert(check.to_string());
        self
    }

    pub fn is_enabled(&self, check: &str) -> bool {
        !self.disabled.contains(check)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!(
            "Loaded rule-check config from {} ({} severity overrides)",
            path.display(),
            config.severities.len()
        );
        Ok(config)
    }
}
