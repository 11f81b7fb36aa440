//! Electrical rule check for unusual net configurations.
//!
//! For every net the directions of the connected gate ports are counted and
//! three independent conditions are reported:
//! - all ports share one direction (only inputs or only outputs),
//! - a port's template leaves the direction undefined,
//! - more than one output port drives the net.
//!
//! An undefined template port direction really belongs to the template. It is
//! reported here for every net that touches such a port, so the same template
//! port can show up several times.

use opendie_model::{LogicModel, ModelError, Net, ObjectId, PortDirection};

use crate::config::ErcConfig;
use crate::violation::{Violation, ViolationKind};
use crate::RuleCheck;

/// Per-net tally of gate port directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionCounts {
    pub inputs: usize,
    pub outputs: usize,
    pub undefined: usize,
    /// First gate port seen with an undefined direction.
    pub first_undefined: Option<ObjectId>,
}

impl DirectionCounts {
    /// Number of gate ports on the net. Wires and vias are not counted.
    pub fn ports(&self) -> usize {
        self.inputs + self.outputs + self.undefined
    }

    /// Direction shared by every port, if all ports resolved to the same one.
    pub fn uniform_direction(&self) -> Option<PortDirection> {
        if self.undefined > 0 || self.ports() == 0 {
            return None;
        }
        match (self.inputs, self.outputs) {
            (_, 0) => Some(PortDirection::In),
            (0, _) => Some(PortDirection::Out),
            _ => None,
        }
    }
}

/// Count the directions of the gate ports connected to `net`.
pub fn count_directions(model: &LogicModel, net: &Net) -> Result<DirectionCounts, ModelError> {
    let mut counts = DirectionCounts::default();
    for &object in &net.connections {
        match model.port_direction(object)? {
            Some(PortDirection::In) => counts.inputs += 1,
            Some(PortDirection::Out) => counts.outputs += 1,
            Some(PortDirection::Undefined) => {
                counts.undefined += 1;
                counts.first_undefined.get_or_insert(object);
            }
            None => {}
        }
    }
    Ok(counts)
}

/// The net ERC.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCheck;

impl NetCheck {
    pub const NAME: &'static str = "net";

    pub fn new() -> Self {
        Self
    }

    fn check_net(
        &self,
        model: &LogicModel,
        net: &Net,
        config: &ErcConfig,
        violations: &mut Vec<Violation>,
    ) -> Result<(), ModelError> {
        let counts = count_directions(model, net)?;
        log::debug!(
            "Net {}: {} in, {} out, {} undefined",
            net.id,
            counts.inputs,
            counts.outputs,
            counts.undefined
        );

        if let Some(port) = counts.first_undefined {
            let kind = ViolationKind::UndefinedDirection { net: net.id, port };
            let description = format!(
                "Net with gate port {} has an undefined port direction.",
                model.descriptive_identifier(port)?
            );
            violations.push(violation(kind, config, description));
        }

        if let Some(direction) = counts.uniform_direction() {
            let kind = ViolationKind::UniformDirection {
                net: net.id,
                direction,
                port_count: counts.ports(),
            };
            let only = match direction {
                PortDirection::Out => "output",
                _ => "input",
            };
            let description = format!(
                "Net {} connects only {} ports ({} in total).",
                net.id,
                only,
                counts.ports()
            );
            violations.push(violation(kind, config, description));
        }

        if counts.outputs > 1 {
            let kind = ViolationKind::MultipleDrivers {
                net: net.id,
                driver_count: counts.outputs,
            };
            let description = format!(
                "Net {} is driven by {} output ports.",
                net.id, counts.outputs
            );
            violations.push(violation(kind, config, description));
        }

        Ok(())
    }
}

fn violation(kind: ViolationKind, config: &ErcConfig, description: String) -> Violation {
    let severity = config.severity_for(kind.class());
    Violation::new(kind, severity, description)
}

impl RuleCheck for NetCheck {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Check nets for unusual port configurations."
    }

    fn run(&self, model: &LogicModel, config: &ErcConfig) -> Result<Vec<Violation>, ModelError> {
        let mut violations = Vec::new();
        for net in model.nets() {
            self.check_net(model, net, config, &mut violations)?;
        }
        Ok(violations)
    }
}
