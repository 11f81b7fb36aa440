//! # OpenDie ERC
//!
//! Electrical rule checks over a logic model. Each check reads the model
//! and returns violation records. The model is never modified. The
//! [`RuleChecker`] runs the enabled checks, applies the user's blacklist
//! and hands back a [`Report`].
//!
//! ```rust,ignore
//! use opendie_erc::RuleChecker;
//!
//! let report = RuleChecker::new().run(&model)?;
//! for v in report.violations() {
//!     println!("{}", v);
//! }
//! ```

pub mod blacklist;
pub mod config;
pub mod net;
pub mod severity;
pub mod violation;

use opendie_model::{LogicModel, ModelError};

pub use blacklist::{Blacklist, BlacklistEntry};
pub use config::{ConfigError, ErcConfig};
pub use net::NetCheck;
pub use severity::Severity;
pub use violation::{Violation, ViolationClass, ViolationKind};

/// A single rule check over the logic model.
pub trait RuleCheck: std::fmt::Debug + Send + Sync {
    /// Short name used to enable or disable the check.
    fn name(&self) -> &'static str;
    /// Human-readable description.
    fn description(&self) -> &'static str;
    /// Inspect the model. Model access errors abort the run.
    fn run(&self, model: &LogicModel, config: &ErcConfig) -> Result<Vec<Violation>, ModelError>;
}

/// Result of a rule-check run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    violations: Vec<Violation>,
    /// Violations dropped because they were blacklisted.
    pub suppressed: usize,
}

impl Report {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity() == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// Runs a set of rule checks.
#[derive(Debug)]
pub struct RuleChecker {
    checks: Vec<Box<dyn RuleCheck>>,
    config: ErcConfig,
    blacklist: Blacklist,
}

impl Default for RuleChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleChecker {
    /// Checker with the default set of checks.
    pub fn new() -> Self {
        Self::empty().with_check(Box::new(NetCheck::new()))
    }

    /// Checker without any checks.
    pub fn empty() -> Self {
        Self {
            checks: Vec::new(),
            config: ErcConfig::default(),
            blacklist: Blacklist::new(),
        }
    }

    pub fn with_check(mut self, check: Box<dyn RuleCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_config(mut self, config: ErcConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn blacklist_mut(&mut self) -> &mut Blacklist {
        &mut self.blacklist
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn run(&self, model: &LogicModel) -> Result<Report, ModelError> {
        let mut found = Vec::new();
        for check in &self.checks {
            if !self.config.is_enabled(check.name()) {
                log::info!("Skipping disabled check '{}'", check.name());
                continue;
            }
            let violations = check.run(model, &self.config)?;
            log::debug!(
                "Check '{}' found {} violations",
                check.name(),
                violations.len()
            );
            found.extend(violations);
        }

        let total = found.len();
        let violations = self.blacklist.filter(found);
        let report = Report {
            suppressed: total - violations.len(),
            violations,
        };
        if report.suppressed > 0 {
            log::warn!("{} blacklisted violations suppressed", report.suppressed);
        }
        log::info!(
            "Rule check of '{}': {} errors, {} warnings",
            model.name,
            report.count(Severity::Error),
            report.count(Severity::Warning)
        );
        Ok(report)
    }
}
