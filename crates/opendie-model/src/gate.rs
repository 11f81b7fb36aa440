use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// Signal direction declared by a gate template for one of its ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    In,
    Out,
    /// Not yet defined by the user.
    #[default]
    Undefined,
}

impl PortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortDirection::In => "in",
            PortDirection::Out => "out",
            PortDirection::Undefined => "undefined",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port definition on a gate template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateTemplatePort {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub direction: PortDirection,
}

/// A gate type, e.g. `NAND2`, shared by every gate placed from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateTemplate {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ports: Vec<GateTemplatePort>,
}

impl GateTemplate {
    pub fn new(id: ObjectId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: String::new(),
            ports: Vec::new(),
        }
    }

    pub fn get_port(&self, id: ObjectId) -> Option<&GateTemplatePort> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn find_port_by_name(&self, name: &str) -> Option<&GateTemplatePort> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

/// A gate instance placed on the die.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: ObjectId,
    pub name: String,
    pub template_id: ObjectId,
    /// Ids of the gate ports created for this instance.
    #[serde(default)]
    pub ports: Vec<ObjectId>,
}

/// Connection point of a placed gate. Its direction comes from the
/// template port it was created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePort {
    pub id: ObjectId,
    pub gate_id: ObjectId,
    pub template_port_id: ObjectId,
    #[serde(default)]
    pub net: Option<ObjectId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_port_lookup() {
        let mut tmpl = GateTemplate::new(1, "INV");
        tmpl.ports.push(GateTemplatePort {
            id: 2,
            name: "A".into(),
            direction: PortDirection::In,
        });
        tmpl.ports.push(GateTemplatePort {
            id: 3,
            name: "Y".into(),
            direction: PortDirection::Out,
        });
        assert_eq!(tmpl.port_count(), 2);
        assert_eq!(tmpl.get_port(3).unwrap().name, "Y");
        assert_eq!(tmpl.find_port_by_name("A").unwrap().id, 2);
        assert!(tmpl.get_port(4).is_none());
    }

    #[test]
    fn test_direction_defaults_to_undefined() {
        let port: GateTemplatePort = serde_json::from_str(r#"{"id": 7, "name": "Q"}"#).unwrap();
        assert_eq!(port.direction, PortDirection::Undefined);
        assert_eq!(port.direction.to_string(), "undefined");
    }
}
