use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// An electrical connection grouping placed objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Net {
    pub id: ObjectId,
    /// Connected objects in the order they were attached.
    #[serde(default)]
    pub connections: Vec<ObjectId>,
}

impl Net {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            connections: Vec::new(),
        }
    }

    /// Attach an object. Returns false if it was already connected.
    pub fn add_connection(&mut self, object: ObjectId) -> bool {
        if self.is_connected(object) {
            return false;
        }
        self.connections.push(object);
        true
    }

    pub fn remove_connection(&mut self, object: ObjectId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|&o| o != object);
        self.connections.len() != before
    }

    pub fn is_connected(&self, object: ObjectId) -> bool {
        self.connections.contains(&object)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// A traced metal wire segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub net: Option<ObjectId>,
}

/// A via joining two metal layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Via {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub net: Option<ObjectId>,
}
