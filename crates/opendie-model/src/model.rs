use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::gate::{Gate, GatePort, GateTemplate, GateTemplatePort, PortDirection};
use crate::net::{Net, Via, Wire};
use crate::ObjectId;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Object {0} does not exist in the logic model")]
    UnknownObject(ObjectId),

    #[error("Net {0} does not exist")]
    UnknownNet(ObjectId),

    #[error("Gate {0} does not exist")]
    UnknownGate(ObjectId),

    #[error("Gate template {0} does not exist")]
    UnknownTemplate(ObjectId),

    #[error("Gate template {template} has no port {port}")]
    UnknownTemplatePort { template: ObjectId, port: ObjectId },

    #[error("Object {0} cannot be connected to a net")]
    NotConnectable(ObjectId),

    #[error("No object ids left to allocate")]
    IdSpaceExhausted,

    #[error("Object id {0} is used by more than one object")]
    DuplicateObjectId(ObjectId),

    #[error("Object stored under key {key} has id {id}")]
    MismatchedId { key: ObjectId, id: ObjectId },

    #[error("Net {net} lists object {object} more than once")]
    DuplicateConnection { net: ObjectId, object: ObjectId },

    #[error("Object {object} and net {net} disagree about their connection")]
    InconsistentConnection { net: ObjectId, object: ObjectId },

    #[error("Invalid logic model data: {0}")]
    Json(#[from] serde_json::Error),
}

/// What kind of object an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Template,
    TemplatePort,
    Gate,
    GatePort,
    Wire,
    Via,
    Net,
}

// ── Logic Model ───────────────────────────────────────────────────────

/// The logic model recovered from a die: gate library, placed objects and
/// the nets joining them.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogicModel {
    /// Model identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    #[serde(default)]
    templates: BTreeMap<ObjectId, GateTemplate>,
    #[serde(default)]
    gates: BTreeMap<ObjectId, Gate>,
    #[serde(default)]
    gate_ports: BTreeMap<ObjectId, GatePort>,
    #[serde(default)]
    wires: BTreeMap<ObjectId, Wire>,
    #[serde(default)]
    vias: BTreeMap<ObjectId, Via>,
    #[serde(default)]
    nets: BTreeMap<ObjectId, Net>,
    /// Next free object id. Recomputed after deserialization.
    #[serde(skip)]
    next_id: ObjectId,
}

impl LogicModel {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            templates: BTreeMap::new(),
            gates: BTreeMap::new(),
            gate_ports: BTreeMap::new(),
            wires: BTreeMap::new(),
            vias: BTreeMap::new(),
            nets: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> Result<ObjectId, ModelError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(ModelError::IdSpaceExhausted)?;
        Ok(id)
    }

    // ── Gate library ─────────────────────────────────────────────────

    pub fn add_template(&mut self, name: &str) -> Result<ObjectId, ModelError> {
        let id = self.allocate_id()?;
        self.templates.insert(id, GateTemplate::new(id, name));
        Ok(id)
    }

    /// Add a port to a template. Gates already placed from the template
    /// receive a matching gate port.
    pub fn add_template_port(
        &mut self,
        template: ObjectId,
        name: &str,
        direction: PortDirection,
    ) -> Result<ObjectId, ModelError> {
        if !self.templates.contains_key(&template) {
            return Err(ModelError::UnknownTemplate(template));
        }
        let port_id = self.allocate_id()?;
        if let Some(tmpl) = self.templates.get_mut(&template) {
            tmpl.ports.push(GateTemplatePort {
                id: port_id,
                name: name.to_string(),
                direction,
            });
        }

        let placed: Vec<ObjectId> = self
            .gates
            .values()
            .filter(|g| g.template_id == template)
            .map(|g| g.id)
            .collect();
        for gate_id in placed {
            self.create_gate_port(gate_id, port_id)?;
        }
        Ok(port_id)
    }

    pub fn set_port_direction(
        &mut self,
        template: ObjectId,
        port: ObjectId,
        direction: PortDirection,
    ) -> Result<(), ModelError> {
        let tmpl = self
            .templates
            .get_mut(&template)
            .ok_or(ModelError::UnknownTemplate(template))?;
        let tp = tmpl
            .ports
            .iter_mut()
            .find(|p| p.id == port)
            .ok_or(ModelError::UnknownTemplatePort { template, port })?;
        tp.direction = direction;
        Ok(())
    }

    pub fn get_template(&self, id: ObjectId) -> Option<&GateTemplate> {
        self.templates.get(&id)
    }

    pub fn find_template_by_name(&self, name: &str) -> Option<&GateTemplate> {
        self.templates.values().find(|t| t.name == name)
    }

    // ── Placed objects ───────────────────────────────────────────────

    /// Place a gate and create one gate port per template port.
    pub fn add_gate(&mut self, name: &str, template: ObjectId) -> Result<ObjectId, ModelError> {
        let template_ports: Vec<ObjectId> = self
            .templates
            .get(&template)
            .ok_or(ModelError::UnknownTemplate(template))?
            .ports
            .iter()
            .map(|p| p.id)
            .collect();

        let gate_id = self.allocate_id()?;
        self.gates.insert(
            gate_id,
            Gate {
                id: gate_id,
                name: name.to_string(),
                template_id: template,
                ports: Vec::new(),
            },
        );
        for tp in template_ports {
            self.create_gate_port(gate_id, tp)?;
        }
        Ok(gate_id)
    }

    fn create_gate_port(
        &mut self,
        gate_id: ObjectId,
        template_port_id: ObjectId,
    ) -> Result<ObjectId, ModelError> {
        let id = self.allocate_id()?;
        self.gate_ports.insert(
            id,
            GatePort {
                id,
                gate_id,
                template_port_id,
                net: None,
            },
        );
        if let Some(gate) = self.gates.get_mut(&gate_id) {
            gate.ports.push(id);
        }
        Ok(id)
    }

    pub fn get_gate(&self, id: ObjectId) -> Option<&Gate> {
        self.gates.get(&id)
    }

    pub fn get_gate_port(&self, id: ObjectId) -> Option<&GatePort> {
        self.gate_ports.get(&id)
    }

    /// Find the gate port of `gate` created from the template port `port_name`.
    pub fn gate_port(&self, gate: ObjectId, port_name: &str) -> Option<ObjectId> {
        let gate = self.gates.get(&gate)?;
        let tmpl = self.templates.get(&gate.template_id)?;
        let tp = tmpl.find_port_by_name(port_name)?;
        gate.ports
            .iter()
            .copied()
            .find(|id| matches!(self.gate_ports.get(id), Some(p) if p.template_port_id == tp.id))
    }

    pub fn add_wire(&mut self, name: &str) -> Result<ObjectId, ModelError> {
        let id = self.allocate_id()?;
        self.wires.insert(
            id,
            Wire {
                id,
                name: name.to_string(),
                net: None,
            },
        );
        Ok(id)
    }

    pub fn add_via(&mut self, name: &str) -> Result<ObjectId, ModelError> {
        let id = self.allocate_id()?;
        self.vias.insert(
            id,
            Via {
                id,
                name: name.to_string(),
                net: None,
            },
        );
        Ok(id)
    }

    // ── Nets ─────────────────────────────────────────────────────────

    pub fn add_net(&mut self) -> Result<ObjectId, ModelError> {
        let id = self.allocate_id()?;
        self.nets.insert(id, Net::new(id));
        Ok(id)
    }

    /// Attach a gate port, wire or via to a net. An object already on
    /// another net is moved.
    pub fn connect(&mut self, net: ObjectId, object: ObjectId) -> Result<(), ModelError> {
        if !self.nets.contains_key(&net) {
            return Err(ModelError::UnknownNet(net));
        }
        let slot = match self.object_kind(object) {
            Some(ObjectKind::GatePort) => self.gate_ports.get_mut(&object).map(|p| &mut p.net),
            Some(ObjectKind::Wire) => self.wires.get_mut(&object).map(|w| &mut w.net),
            Some(ObjectKind::Via) => self.vias.get_mut(&object).map(|v| &mut v.net),
            Some(_) => return Err(ModelError::NotConnectable(object)),
            None => return Err(ModelError::UnknownObject(object)),
        };
        let previous = slot.and_then(|s| s.replace(net));

        if let Some(old) = previous.filter(|&old| old != net) {
            if let Some(old_net) = self.nets.get_mut(&old) {
                old_net.remove_connection(object);
            }
            log::debug!("Moved object {} from net {} to net {}", object, old, net);
        }
        if let Some(n) = self.nets.get_mut(&net) {
            n.add_connection(object);
        }
        Ok(())
    }

    pub fn get_net(&self, id: ObjectId) -> Option<&Net> {
        self.nets.get(&id)
    }

    /// All nets in ascending id order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn object_kind(&self, id: ObjectId) -> Option<ObjectKind> {
        if self.gate_ports.contains_key(&id) {
            Some(ObjectKind::GatePort)
        } else if self.nets.contains_key(&id) {
            Some(ObjectKind::Net)
        } else if self.wires.contains_key(&id) {
            Some(ObjectKind::Wire)
        } else if self.vias.contains_key(&id) {
            Some(ObjectKind::Via)
        } else if self.gates.contains_key(&id) {
            Some(ObjectKind::Gate)
        } else if self.templates.contains_key(&id) {
            Some(ObjectKind::Template)
        } else if self.templates.values().any(|t| t.get_port(id).is_some()) {
            Some(ObjectKind::TemplatePort)
        } else {
            None
        }
    }

    pub fn object_exists(&self, id: ObjectId) -> bool {
        self.object_kind(id).is_some()
    }

    /// Number of placed objects and nets (templates not included).
    pub fn object_count(&self) -> usize {
        self.gates.len() + self.gate_ports.len() + self.wires.len() + self.vias.len() + self.nets.len()
    }

    /// Template port a gate port was created from.
    pub fn template_port_of(&self, port: &GatePort) -> Result<&GateTemplatePort, ModelError> {
        let gate = self
            .gates
            .get(&port.gate_id)
            .ok_or(ModelError::UnknownGate(port.gate_id))?;
        let tmpl = self
            .templates
            .get(&gate.template_id)
            .ok_or(ModelError::UnknownTemplate(gate.template_id))?;
        tmpl.get_port(port.template_port_id)
            .ok_or(ModelError::UnknownTemplatePort {
                template: tmpl.id,
                port: port.template_port_id,
            })
    }

    /// Direction of a connected object. Gate ports resolve through their
    /// gate's template; wires and vias have none.
    pub fn port_direction(&self, object: ObjectId) -> Result<Option<PortDirection>, ModelError> {
        match self.object_kind(object) {
            Some(ObjectKind::GatePort) => {
                let port = self
                    .gate_ports
                    .get(&object)
                    .ok_or(ModelError::UnknownObject(object))?;
                Ok(Some(self.template_port_of(port)?.direction))
            }
            Some(ObjectKind::Wire) | Some(ObjectKind::Via) => Ok(None),
            Some(_) => Err(ModelError::NotConnectable(object)),
            None => Err(ModelError::UnknownObject(object)),
        }
    }

    /// Human-readable name of an object, e.g. `U12.Y` for a gate port.
    pub fn descriptive_identifier(&self, id: ObjectId) -> Result<String, ModelError> {
        let kind = self.object_kind(id).ok_or(ModelError::UnknownObject(id))?;
        let name = match kind {
            ObjectKind::GatePort => {
                let port = self.gate_ports.get(&id).ok_or(ModelError::UnknownObject(id))?;
                let gate = self
                    .gates
                    .get(&port.gate_id)
                    .ok_or(ModelError::UnknownGate(port.gate_id))?;
                let tp = self.template_port_of(port)?;
                format!("{}.{}", display_name(&gate.name, "gate", gate.id), tp.name)
            }
            ObjectKind::Gate => self
                .gates
                .get(&id)
                .map(|g| display_name(&g.name, "gate", id))
                .unwrap_or_default(),
            ObjectKind::Wire => self
                .wires
                .get(&id)
                .map(|w| display_name(&w.name, "wire", id))
                .unwrap_or_default(),
            ObjectKind::Via => self
                .vias
                .get(&id)
                .map(|v| display_name(&v.name, "via", id))
                .unwrap_or_default(),
            ObjectKind::Net => format!("net #{}", id),
            ObjectKind::Template => self
                .templates
                .get(&id)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            ObjectKind::TemplatePort => self
                .templates
                .values()
                .find_map(|t| t.get_port(id).map(|p| format!("{}.{}", t.name, p.name)))
                .unwrap_or_default(),
        };
        Ok(name)
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let mut model: Self = serde_json::from_str(json)?;
        model.validate()?;
        model.next_id = model
            .max_id()
            .checked_add(1)
            .ok_or(ModelError::IdSpaceExhausted)?;
        log::info!(
            "Loaded logic model '{}': {} templates, {} gates, {} nets",
            model.name,
            model.templates.len(),
            model.gates.len(),
            model.nets.len()
        );
        Ok(model)
    }

    /// Check loaded data: map keys match ids, ids are unique across all
    /// objects, and nets and the objects they list agree on the connection.
    /// A connected object without a `net` entry is attached to the net
    /// listing it. Unknown connection ids are left for the checks to report.
    fn validate(&mut self) -> Result<(), ModelError> {
        fn keyed<'a, T: 'a>(
            map: &'a BTreeMap<ObjectId, T>,
            id: impl Fn(&T) -> ObjectId + 'a,
        ) -> impl Iterator<Item = (ObjectId, ObjectId)> + 'a {
            map.iter().map(move |(&key, v)| (key, id(v)))
        }

        let pairs = keyed(&self.templates, |t| t.id)
            .chain(keyed(&self.gates, |g| g.id))
            .chain(keyed(&self.gate_ports, |p| p.id))
            .chain(keyed(&self.wires, |w| w.id))
            .chain(keyed(&self.vias, |v| v.id))
            .chain(keyed(&self.nets, |n| n.id));
        let mut seen = BTreeSet::new();
        for (key, id) in pairs {
            if key != id {
                return Err(ModelError::MismatchedId { key, id });
            }
            if !seen.insert(id) {
                return Err(ModelError::DuplicateObjectId(id));
            }
        }
        for port in self.templates.values().flat_map(|t| &t.ports) {
            if !seen.insert(port.id) {
                return Err(ModelError::DuplicateObjectId(port.id));
            }
        }

        for net in self.nets.values() {
            let mut listed = BTreeSet::new();
            for &object in &net.connections {
                if !listed.insert(object) {
                    return Err(ModelError::DuplicateConnection {
                        net: net.id,
                        object,
                    });
                }
                let slot = if let Some(p) = self.gate_ports.get_mut(&object) {
                    &mut p.net
                } else if let Some(w) = self.wires.get_mut(&object) {
                    &mut w.net
                } else if let Some(v) = self.vias.get_mut(&object) {
                    &mut v.net
                } else {
                    continue;
                };
                let current = *slot;
                match current {
                    None => *slot = Some(net.id),
                    Some(n) if n == net.id => {}
                    Some(_) => {
                        return Err(ModelError::InconsistentConnection {
                            net: net.id,
                            object,
                        })
                    }
                }
            }
        }

        let back_refs = self
            .gate_ports
            .values()
            .map(|p| (p.id, p.net))
            .chain(self.wires.values().map(|w| (w.id, w.net)))
            .chain(self.vias.values().map(|v| (v.id, v.net)));
        for (object, net) in back_refs {
            if let Some(net) = net {
                let listed = self
                    .nets
                    .get(&net)
                    .is_some_and(|n| n.is_connected(object));
                if !listed {
                    return Err(ModelError::InconsistentConnection { net, object });
                }
            }
        }
        Ok(())
    }

    fn max_id(&self) -> ObjectId {
        let template_ports = self
            .templates
            .values()
            .flat_map(|t| t.ports.iter().map(|p| p.id));
        self.templates
            .keys()
            .chain(self.gates.keys())
            .chain(self.gate_ports.keys())
            .chain(self.wires.keys())
            .chain(self.vias.keys())
            .chain(self.nets.keys())
            .copied()
            .chain(template_ports)
            .max()
            .unwrap_or(0)
    }
}

fn display_name(name: &str, kind: &str, id: ObjectId) -> String {
    if name.is_empty() {
        format!("{} #{}", kind, id)
    } else {
        name.to_string()
    }
}
