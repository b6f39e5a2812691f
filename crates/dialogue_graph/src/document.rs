// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authoring document for dialogue graphs.
//!
//! A [`GraphDocument`] names nodes and edges by node name instead of by id,
//! which keeps hand-written RON files readable:
//!
//! ```ron
//! (
//!     name: "Tavern",
//!     nodes: [
//!         (name: "start", kind: Start),
//!         (name: "greet", kind: Dialogue(
//!             line: "tavern.greet",
//!             choices: ("tavern.ale", "tavern.room", "tavern.rumors", "tavern.leave"),
//!         )),
//!     ],
//!     edges: [
//!         (from: "start", port: "exit", to: "greet"),
//!     ],
//! )
//! ```

use crate::graph::{DialogueGraph, GraphError};
use crate::node::{DialogueKeys, Node, NodeId, ENTRY_PORT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A node as written in a graph document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique node name
    pub name: String,
    /// Kind and payload
    pub kind: NodeSpecKind,
    /// Position for authoring tools
    #[serde(default)]
    pub position: [f32; 2],
}

/// Node kinds accepted in a graph document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeSpecKind {
    /// Entry node
    Start,
    /// Dialogue line with four choices
    Dialogue {
        /// Key of the spoken line
        line: String,
        /// Keys of choices A to D
        choices: (String, String, String, String),
    },
    /// Any other kind
    Custom {
        /// Kind tag
        tag: String,
        /// Record fields after the tag
        #[serde(default)]
        fields: Vec<String>,
        /// Output field names
        #[serde(default)]
        outputs: Vec<String>,
    },
}

/// An edge from a named output port to another node's entry input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Source node name
    pub from: String,
    /// Output field name on the source node
    pub port: String,
    /// Target node name
    pub to: String,
}

/// A dialogue graph as authored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Graph name
    pub name: String,
    /// Nodes in authored order
    pub nodes: Vec<NodeSpec>,
    /// Edges
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

impl GraphDocument {
    /// Parse a document from RON text
    pub fn from_ron(text: &str) -> Result<Self, GraphError> {
        Ok(ron::from_str(text)?)
    }

    /// Read and parse a document from a RON file
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Build the graph, validating names, keys and edges
    pub fn build(&self) -> Result<DialogueGraph, GraphError> {
        let mut graph = DialogueGraph::new(self.name.clone());

        for spec in &self.nodes {
            let node = match &spec.kind {
                NodeSpecKind::Start => Node::start(spec.name.clone()),
                NodeSpecKind::Dialogue { line, choices } => Node::dialogue(
                    spec.name.clone(),
                    DialogueKeys::new(
                        line.clone(),
                        choices.0.clone(),
                        choices.1.clone(),
                        choices.2.clone(),
                        choices.3.clone(),
                    ),
                ),
                NodeSpecKind::Custom { tag, fields, outputs } => {
                    Node::custom(spec.name.clone(), tag.clone(), fields.clone(), outputs.as_slice())
                }
            };
            graph.add_node(node.with_position(spec.position[0], spec.position[1]))?;
        }

        for edge in &self.edges {
            let from = lookup(&graph, &edge.from)?;
            let to = lookup(&graph, &edge.to)?;
            graph.connect(from, &edge.port, to, ENTRY_PORT)?;
        }

        tracing::debug!(
            "Built graph '{}' with {} nodes and {} edges",
            graph.name,
            graph.node_count(),
            graph.connection_count()
        );
        Ok(graph)
    }
}

fn lookup(graph: &DialogueGraph, name: &str) -> Result<NodeId, GraphError> {
    graph
        .node_by_name(name)
        .map(|n| n.id)
        .ok_or_else(|| GraphError::UnknownNodeName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAVERN: &str = r#"(
        name: "Tavern",
        nodes: [
            (name: "start", kind: Start),
            (name: "greet", kind: Dialogue(
                line: "tavern.greet",
                choices: ("tavern.ale", "tavern.room", "tavern.rumors", "tavern.leave"),
            )),
            (name: "ale", kind: Dialogue(
                line: "tavern.ale.line",
                choices: ("tavern.ale.more", "tavern.ale.pay", "tavern.back", "tavern.leave"),
            ), position: (200.0, 40.0)),
            (name: "dice", kind: Custom(tag: "MiniGame", fields: ["dice"], outputs: ["win", "lose"])),
        ],
        edges: [
            (from: "start", port: "exit", to: "greet"),
            (from: "greet", port: "choiceA", to: "ale"),
            (from: "ale", port: "choiceC", to: "greet"),
            (from: "greet", port: "choiceC", to: "dice"),
        ],
    )"#;

    #[test]
    fn test_build_tavern() {
        let graph = GraphDocument::from_ron(TAVERN).unwrap().build().unwrap();
        assert_eq!(graph.name, "Tavern");
        assert_eq!(graph.node_count(), 4);

        let start = graph.find_entry().unwrap();
        let greet = graph.resolve_edge(start, "exit").unwrap();
        assert_eq!(graph.node(greet).unwrap().serialize(),
            "DialogueNode/tavern.greet/tavern.ale/tavern.room/tavern.rumors/tavern.leave");

        let ale = graph.resolve_edge(greet, "choiceA").unwrap();
        assert_eq!(graph.node(ale).unwrap().position, [200.0, 40.0]);
        assert_eq!(graph.resolve_edge(ale, "choiceC"), Some(greet));

        let dice = graph.resolve_edge(greet, "choiceC").unwrap();
        assert_eq!(graph.node(dice).unwrap().serialize(), "MiniGame/dice");
        assert_eq!(graph.node(dice).unwrap().output_names(), vec!["win", "lose"]);
    }

    #[test]
    fn test_unknown_edge_target() {
        let doc = GraphDocument {
            name: "broken".into(),
            nodes: vec![NodeSpec {
                name: "start".into(),
                kind: NodeSpecKind::Start,
                position: [0.0, 0.0],
            }],
            edges: vec![EdgeSpec {
                from: "start".into(),
                port: "exit".into(),
                to: "nowhere".into(),
            }],
        };
        assert!(matches!(doc.build(), Err(GraphError::UnknownNodeName(name)) if name == "nowhere"));
    }

    #[test]
    fn test_start_tagged_custom_node_rejected() {
        let doc = GraphDocument::from_ron(
            r#"(
                name: "loop",
                nodes: [
                    (name: "start", kind: Start),
                    (name: "fake", kind: Custom(tag: "Start", outputs: ["exit"])),
                ],
                edges: [
                    (from: "start", port: "exit", to: "fake"),
                    (from: "fake", port: "exit", to: "fake"),
                ],
            )"#,
        )
        .unwrap();
        assert!(matches!(doc.build(), Err(GraphError::InvalidTag { ref node, .. }) if node == "fake"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(GraphDocument::from_ron("(name: "), Err(GraphError::Parse(_))));
    }
}
