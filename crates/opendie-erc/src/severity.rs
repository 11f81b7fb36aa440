use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::violation::ViolationClass;

/// Severity level of a rule-check violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown severity '{0}'")]
pub struct ParseSeverityError(pub String);

impl Severity {
    pub const ALL: [Severity; 2] = [Severity::Warning, Severity::Error];

    /// Display name. Also the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Severity assigned to each violation class unless configured otherwise.
    pub const fn default_for(class: ViolationClass) -> Severity {
        match class {
            ViolationClass::UniformDirection => Severity::Warning,
            ViolationClass::UndefinedDirection => Severity::Warning,
            ViolationClass::MultipleDrivers => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for sev in Severity::ALL {
            assert_eq!(sev.as_str().parse::<Severity>().unwrap(), sev);
            let json = serde_json::to_string(&sev).unwrap();
            assert_eq!(json, format!("\"{}\"", sev.as_str()));
            assert_eq!(serde_json::from_str::<Severity>(&json).unwrap(), sev);
        }
    }

    #[test]
    fn test_class_defaults() {
        assert_eq!(
            Severity::default_for(ViolationClass::MultipleDrivers),
            Severity::Error
        );
        assert_eq!(
            Severity::default_for(ViolationClass::UndefinedDirection),
            Severity::Warning
        );
        assert_eq!(
            Severity::default_for(ViolationClass::UniformDirection),
            Severity::Warning
        );
    }

    #[test]
    fn test_parse_unknown_severity() {
        assert_eq!(
            "fatal".parse::<Severity>(),
            Err(ParseSeverityError("fatal".into()))
        );
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warning));
        assert!(serde_json::from_str::<Severity>("\"fatal\"").is_err());
    }
}
