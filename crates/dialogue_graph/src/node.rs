// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the dialogue graph.

use crate::port::{Port, PortDirection, PortId};
use crate::record::{NodeRecord, DIALOGUE_TAG, START_TAG};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Output field name of the entry node
pub const EXIT_PORT: &str = "exit";

/// Input field name of a dialogue node
pub const ENTRY_PORT: &str = "entry";

/// Output field names of a dialogue node, in presentation order
pub const CHOICE_PORTS: [&str; 4] = ["choiceA", "choiceB", "choiceC", "choiceD"];

/// Localization keys of a dialogue node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueKeys {
    /// Key of the spoken line
    pub dialogue: String,
    /// Keys of the four choices, aligned with [`CHOICE_PORTS`]
    pub choices: [String; 4],
}

impl DialogueKeys {
    /// Create the key set of a dialogue node
    pub fn new(
        dialogue: impl Into<String>,
        choice_a: impl Into<String>,
        choice_b: impl Into<String>,
        choice_c: impl Into<String>,
        choice_d: impl Into<String>,
    ) -> Self {
        Self {
            dialogue: dialogue.into(),
            choices: [
                choice_a.into(),
                choice_b.into(),
                choice_c.into(),
                choice_d.into(),
            ],
        }
    }

    /// All five keys: the line first, then choices A to D
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.dialogue.as_str()).chain(self.choices.iter().map(String::as_str))
    }
}

/// What a node is, together with the data that kind carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Entry node: no content, a single `exit` output
    Start,
    /// A line of dialogue with four choices
    Dialogue(DialogueKeys),
    /// A kind the built-in traversal does not know how to run
    Custom {
        /// Kind tag written as the first record field
        tag: String,
        /// Remaining record fields
        fields: Vec<String>,
    },
}

impl NodeKind {
    /// Kind tag as it appears in the node record
    pub fn tag(&self) -> &str {
        match self {
            Self::Start => START_TAG,
            Self::Dialogue(_) => DIALOGUE_TAG,
            Self::Custom { tag, .. } => tag,
        }
    }

    /// Every record field after the tag
    pub fn record_fields(&self) -> Vec<String> {
        match self {
            Self::Start => Vec::new(),
            Self::Dialogue(keys) => keys.iter().map(str::to_string).collect(),
            Self::Custom { fields, .. } => fields.clone(),
        }
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Name, unique within a graph
    pub name: String,
    /// Kind and payload
    pub kind: NodeKind,
    /// Position for authoring tools
    #[serde(default)]
    pub position: [f32; 2],
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
}

impl Node {
    /// Create an entry node
    pub fn start(name: impl Into<String>) -> Self {
        Self::with_ports(name, NodeKind::Start, Vec::new(), vec![Port::output(EXIT_PORT)])
    }

    /// Create a dialogue node with one input and the four choice outputs
    pub fn dialogue(name: impl Into<String>, keys: DialogueKeys) -> Self {
        Self::with_ports(
            name,
            NodeKind::Dialogue(keys),
            vec![Port::input(ENTRY_PORT)],
            CHOICE_PORTS.iter().map(|field| Port::output(*field)).collect(),
        )
    }

    /// Create a node of a custom kind
    ///
    /// Custom nodes get an `entry` input and one output per name in `outputs`.
    pub fn custom<S: AsRef<str>>(
        name: impl Into<String>,
        tag: impl Into<String>,
        fields: Vec<String>,
        outputs: &[S],
    ) -> Self {
        Self::with_ports(
            name,
            NodeKind::Custom {
                tag: tag.into(),
                fields,
            },
            vec![Port::input(ENTRY_PORT)],
            outputs.iter().map(|field| Port::output(field.as_ref())).collect(),
        )
    }

    fn with_ports(
        name: impl Into<String>,
        kind: NodeKind,
        inputs: Vec<Port>,
        outputs: Vec<Port>,
    ) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            position: [0.0, 0.0],
            inputs,
            outputs,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Kind tag of this node
    pub fn tag(&self) -> &str {
        self.kind.tag()
    }

    /// Describe this node as a record
    pub fn record(&self) -> NodeRecord {
        NodeRecord::new(self.kind.tag(), self.kind.record_fields())
    }

    /// Serialize this node into its `/`-delimited record
    pub fn serialize(&self) -> String {
        self.record().to_string()
    }

    /// Ordered `(field name, port)` pairs of the outputs
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Port)> {
        self.outputs.iter().map(|port| (port.name.as_str(), port))
    }

    /// Output field names in declaration order
    pub fn output_names(&self) -> Vec<String> {
        self.outputs.iter().map(|port| port.name.clone()).collect()
    }

    /// Get an output port by field name
    pub fn output(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Get an input port by field name
    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Get a port by name and direction
    pub fn port_named(&self, name: &str, direction: PortDirection) -> Option<&Port> {
        match direction {
            PortDirection::Input => self.input(name),
            PortDirection::Output => self.output(name),
        }
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports().find(|p| p.id == *port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}
