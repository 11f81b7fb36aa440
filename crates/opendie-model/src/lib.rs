//! # OpenDie Model
//!
//! Logic model recovered from die images: the gate template library, placed
//! gates with their ports, wires, vias, and the nets joining them.
//!
//! Rule checks and exporters only read from this crate.

pub mod gate;
pub mod net;
pub mod model;

/// Identifier shared by every object in a logic model.
pub type ObjectId = u64;

pub use gate::{Gate, GatePort, GateTemplate, GateTemplatePort, PortDirection};
pub use model::{LogicModel, ModelError, ObjectKind};
pub use net::{Net, Via, Wire};
