// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// A named attachment point on a node.
///
/// Output ports are the choices a traversal can take; their `name` is the
/// field name a player's choice is matched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Field name, unique among the ports of the same direction on a node
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Whether several edges may attach to this port
    pub multi_connect: bool,
}

impl Port {
    /// Create a new input port
    ///
    /// Inputs accept any number of incoming edges so branches can converge.
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Input,
            multi_connect: true,
        }
    }

    /// Create a new output port
    ///
    /// Outputs lead to at most one other node.
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Output,
            multi_connect: false,
        }
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        self.direction == PortDirection::Output && other.direction == PortDirection::Input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_direction() {
        let exit = Port::output("exit");
        let entry = Port::input("entry");

        assert!(exit.can_connect(&entry));
        assert!(!entry.can_connect(&exit));
        assert!(!exit.can_connect(&Port::output("choiceA")));
    }

    #[test]
    fn test_multi_connect_defaults() {
        assert!(Port::input("entry").multi_connect);
        assert!(!Port::output("exit").multi_connect);
    }
}
