use opendie_model::ObjectId;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::severity::Severity;
use crate::violation::{Violation, ViolationClass};

/// A violation the user reviewed and chose to ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub object_id: ObjectId,
    pub class: ViolationClass,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
}

impl BlacklistEntry {
    fn matches(&self, violation: &Violation) -> bool {
        self.object_id == violation.object_id() && self.class == violation.class()
    }
}

impl From<&Violation> for BlacklistEntry {
    fn from(v: &Violation) -> Self {
        Self {
            object_id: v.object_id(),
            class: v.class(),
            severity: v.severity(),
            description: v.description().to_string(),
        }
    }
}

/// Suppression list for rule-check violations, matched on object and class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    entries: Vec<BlacklistEntry>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an equivalent entry was already present.
    pub fn add(&mut self, violation: &Violation) -> bool {
        if self.contains(violation) {
            return false;
        }
        self.entries.push(BlacklistEntry::from(violation));
        true
    }

    pub fn remove(&mut self, violation: &Violation) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(violation));
        self.entries.len() != before
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.entries.iter().any(|e| e.matches(violation))
    }

    pub fn entries(&self) -> &[BlacklistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop blacklisted violations, keeping the order of the rest.
    pub fn filter(&self, violations: Vec<Violation>) -> Vec<Violation> {
        if self.entries.is_empty() {
            return violations;
        }
        violations
            .into_iter()
            .filter(|v| {
                let listed = self.contains(v);
                if listed {
                    log::debug!("Suppressing blacklisted violation: {}", v);
                }
                !listed
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::ViolationKind;

    fn multiple_drivers(net: ObjectId) -> Violation {
        Violation::new(
            ViolationKind::MultipleDrivers {
                net,
                driver_count: 2,
            },
            Severity::Error,
            format!("net {}", net),
        )
    }

    fn uniform(net: ObjectId) -> Violation {
        Violation::new(
            ViolationKind::UniformDirection {
                net,
                direction: opendie_model::PortDirection::Out,
                port_count: 2,
            },
            Severity::Warning,
            format!("net {}", net),
        )
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut bl = Blacklist::new();
        assert!(bl.add(&multiple_drivers(1)));
        assert!(!bl.add(&multiple_drivers(1)));
        assert_eq!(bl.len(), 1);
    }

    #[test]
    fn test_filter_matches_object_and_class() {
        let mut bl = Blacklist::new();
        bl.add(&multiple_drivers(1));

        let kept = bl.filter(vec![uniform(1), multiple_drivers(1), multiple_drivers(2)]);
        assert_eq!(kept, vec![uniform(1), multiple_drivers(2)]);
    }

    #[test]
    fn test_remove() {
        let mut bl = Blacklist::new();
        bl.add(&uniform(3));
        assert!(bl.remove(&uniform(3)));
        assert!(bl.is_empty());
        assert!(!bl.remove(&uniform(3)));
    }

    #[test]
    fn test_json_uses_class_names() {
        let mut bl = Blacklist::new();
        bl.add(&uniform(5));
        let json = bl.to_json().unwrap();
        assert!(json.contains("net.uniform_port_direction"));
        assert_eq!(Blacklist::from_json(&json).unwrap(), bl);
    }
}
