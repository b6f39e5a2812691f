// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dialogue graph model.
//!
//! A dialogue is a directed graph of typed nodes. Each node exposes named
//! output ports; an edge joins one output port to another node's input.
//! The graph also carries the traversal cursor (`current`), which the
//! runtime moves as the player makes choices.
//!
//! ## Architecture
//!
//! - Nodes live in an arena keyed by [`NodeId`]
//! - Edges refer to ports by id, so there are no back-references
//! - Nodes describe themselves to the runtime as a `/`-delimited
//!   [`NodeRecord`]
//! - [`GraphDocument`] is the hand-authored RON form of a graph

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod record;
pub mod document;

pub use node::{DialogueKeys, Node, NodeId, NodeKind, CHOICE_PORTS, ENTRY_PORT, EXIT_PORT};
pub use port::{Port, PortId, PortDirection};
pub use connection::{Connection, ConnectionId, PortRef};
pub use graph::{DialogueGraph, GraphError};
pub use record::{NodeRecord, DIALOGUE_TAG, START_TAG};
pub use document::{EdgeSpec, GraphDocument, NodeSpec, NodeSpecKind};
