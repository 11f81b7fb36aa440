use std::fmt;
use std::str::FromStr;

use opendie_model::{ObjectId, PortDirection};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::severity::Severity;

/// Tag identifying the rule a violation breaks.
/// Serialized by its [`as_str`](ViolationClass::as_str) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationClass {
    /// Every gate port on the net has the same direction.
    UniformDirection,
    /// A gate port on the net has no direction in its template.
    UndefinedDirection,
    /// More than one output port drives the net.
    MultipleDrivers,
}

impl ViolationClass {
    pub const ALL: [ViolationClass; 3] = [
        ViolationClass::UniformDirection,
        ViolationClass::UndefinedDirection,
        ViolationClass::MultipleDrivers,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ViolationClass::UniformDirection => "net.uniform_port_direction",
            ViolationClass::UndefinedDirection => "net.undefined_port_direction",
            ViolationClass::MultipleDrivers => "net.multiple_outports",
        }
    }
}

impl fmt::Display for ViolationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown violation class '{0}'")]
pub struct ParseClassError(pub String);

impl FromStr for ViolationClass {
    type Err = ParseClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViolationClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseClassError(s.to_string()))
    }
}

impl Serialize for ViolationClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ViolationClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// What was found, with the objects involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    UniformDirection {
        net: ObjectId,
        direction: PortDirection,
        port_count: usize,
    },
    UndefinedDirection {
        net: ObjectId,
        /// First gate port found without a direction.
        port: ObjectId,
    },
    MultipleDrivers {
        net: ObjectId,
        driver_count: usize,
    },
}

impl ViolationKind {
    pub fn class(&self) -> ViolationClass {
        match self {
            ViolationKind::UniformDirection { .. } => ViolationClass::UniformDirection,
            ViolationKind::UndefinedDirection { .. } => ViolationClass::UndefinedDirection,
            ViolationKind::MultipleDrivers { .. } => ViolationClass::MultipleDrivers,
        }
    }

    /// The object the violation is reported on.
    pub fn object_id(&self) -> ObjectId {
        match *self {
            ViolationKind::UniformDirection { net, .. } => net,
            ViolationKind::UndefinedDirection { port, .. } => port,
            ViolationKind::MultipleDrivers { net, .. } => net,
        }
    }

    pub fn net(&self) -> ObjectId {
        match *self {
            ViolationKind::UniformDirection { net, .. }
            | ViolationKind::UndefinedDirection { net, .. }
            | ViolationKind::MultipleDrivers { net, .. } => net,
        }
    }
}

/// A single rule-check violation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    kind: ViolationKind,
    severity: Severity,
    description: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, severity: Severity, description: String) -> Self {
        Self {
            kind,
            severity,
            description,
        }
    }

    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    pub fn class(&self) -> ViolationClass {
        self.kind.class()
    }

    pub fn object_id(&self) -> ObjectId {
        self.kind.object_id()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn severity_as_str(&self) -> &'static str {
        self.severity.as_str()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] object {}: {}",
            self.severity,
            self.class(),
            self.object_id(),
            self.description
        )
    }
}
