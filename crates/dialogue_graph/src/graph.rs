// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes, connections and the traversal cursor.

use crate::connection::{Connection, ConnectionId, PortRef};
use crate::node::{Node, NodeId, NodeKind, ENTRY_PORT};
use crate::port::{PortDirection, PortId};
use crate::record::{DELIMITER, DIALOGUE_TAG, START_TAG};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A dialogue graph
///
/// Nodes live in an arena keyed by [`NodeId`]; iteration follows insertion
/// order. `current` is the traversal cursor and is always either `None` or
/// the id of a node in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueGraph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Node the traversal is currently on
    #[serde(skip)]
    current: Option<NodeId>,
}

impl DialogueGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            current: None,
        }
    }

    /// Add a node to the graph
    ///
    /// Fails if another node already uses the same name, or if its record
    /// would not parse back to the same kind and fields.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.node_by_name(&node.name).is_some() {
            return Err(GraphError::DuplicateNode(node.name));
        }
        match &node.kind {
            NodeKind::Start => {}
            NodeKind::Dialogue(keys) => {
                if let Some(key) = keys.iter().find(|k| k.is_empty() || k.contains(DELIMITER)) {
                    return Err(GraphError::InvalidKey {
                        node: node.name.clone(),
                        key: key.to_string(),
                    });
                }
            }
            NodeKind::Custom { tag, fields } => {
                // Built-in tags are reserved so a custom node never runs as one
                if tag.is_empty() || tag == START_TAG || tag == DIALOGUE_TAG || tag.contains(DELIMITER) {
                    return Err(GraphError::InvalidTag {
                        node: node.name.clone(),
                        tag: tag.clone(),
                    });
                }
                if let Some(field) = fields.iter().find(|f| f.contains(DELIMITER)) {
                    return Err(GraphError::InvalidKey {
                        node: node.name.clone(),
                        key: field.clone(),
                    });
                }
            }
        }

        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node and its connections
    ///
    /// Clears the cursor if it pointed at the removed node.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        if self.current == Some(node_id) {
            self.current = None;
        }
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a node by name
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name == name)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether a node belongs to this graph
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// First node, in insertion order, satisfying `predicate`
    pub fn find_by_predicate<P>(&self, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.nodes.values().find(|n| predicate(n)).map(|n| n.id)
    }

    /// Locate the entry node (the first node of kind `Start`)
    pub fn find_entry(&self) -> Result<NodeId, GraphError> {
        self.find_by_predicate(|n| matches!(n.kind, NodeKind::Start))
            .ok_or(GraphError::NoEntryNode)
    }

    /// Connect an output port to an input port, both by field name
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_field: &str,
        to_node: NodeId,
        to_field: &str,
    ) -> Result<ConnectionId, GraphError> {
        let source_node = self.nodes.get(&from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        let source_port = source_node.port_named(from_field, PortDirection::Output)
            .ok_or_else(|| GraphError::PortNotFound {
                node: source_node.name.clone(),
                field: from_field.to_string(),
            })?;
        let target_port = target_node.port_named(to_field, PortDirection::Input)
            .ok_or_else(|| GraphError::PortNotFound {
                node: target_node.name.clone(),
                field: to_field.to_string(),
            })?;

        if !source_port.can_connect(target_port) {
            return Err(GraphError::IncompatiblePorts);
        }

        for port in [source_port, target_port] {
            if !port.multi_connect && self.connections_on(port.id).next().is_some() {
                return Err(GraphError::PortAlreadyConnected(port.name.clone()));
            }
        }

        let connection = Connection::new(
            PortRef::new(from_node, source_port.id),
            PortRef::new(to_node, target_port.id),
        );
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Connect `from`'s output named `from_field` to the default entry input of `to`
    pub fn link(
        &mut self,
        from_node: NodeId,
        from_field: &str,
        to_node: NodeId,
    ) -> Result<ConnectionId, GraphError> {
        self.connect(from_node, from_field, to_node, ENTRY_PORT)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections from a specific port
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from.port == port_id)
    }

    /// Get connections to a specific port
    pub fn connections_to(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to.port == port_id)
    }

    fn connections_on(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_port(port_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Node reachable from `from_node`'s output port named `field`
    ///
    /// `None` when the node or port does not exist or the port is unconnected.
    pub fn resolve_edge(&self, from_node: NodeId, field: &str) -> Option<NodeId> {
        let port = self.nodes.get(&from_node)?.output(field)?;
        self.connections_from(port.id).next().map(|c| c.to.node)
    }

    /// Node the traversal is currently on
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Node the traversal is currently on, resolved
    pub fn current_node(&self) -> Option<&Node> {
        self.current.and_then(|id| self.nodes.get(&id))
    }

    /// Move the cursor; only members of the graph are accepted
    pub fn set_current(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        if !self.contains(node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        self.current = Some(node_id);
        Ok(())
    }

    /// Clear the cursor
    pub fn clear_current(&mut self) {
        self.current = None;
    }
}

impl Default for DialogueGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors raised while building or querying a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Node not found by name
    #[error("No node named '{0}'")]
    UnknownNodeName(String),

    /// Port not found
    #[error("Node '{node}' has no port '{field}'")]
    PortNotFound {
        /// Node name
        node: String,
        /// Requested field name
        field: String,
    },

    /// Ports cannot be joined in this direction
    #[error("Incompatible port directions")]
    IncompatiblePorts,

    /// Port is already connected
    #[error("Port already connected: {0}")]
    PortAlreadyConnected(String),

    /// Two nodes share a name
    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),

    /// A localization key or record field would break the record format
    #[error("Node '{node}' has invalid key '{key}'")]
    InvalidKey {
        /// Node name
        node: String,
        /// Offending key
        key: String,
    },

    /// A custom kind tag is empty, reserved or contains the record delimiter
    #[error("Node '{node}' has invalid kind tag '{tag}'")]
    InvalidTag {
        /// Node name
        node: String,
        /// Offending tag
        tag: String,
    },

    /// No node of kind `Start`
    #[error("No Start node found in the dialogue graph")]
    NoEntryNode,

    /// Graph document could not be parsed
    #[error("Failed to parse graph document: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Graph document could not be read
    #[error("Failed to read graph document: {0}")]
    Io(#[from] std::io::Error),
}
