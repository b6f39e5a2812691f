// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outbound events published by the traversal engine.

use dialogue_graph::NodeId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{mpsc, Arc};

/// Identifies one traversal step
///
/// Every presentation is published under the token of the step that produced
/// it. A choice made against an older token is stale and gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct StepToken(u64);

impl StepToken {
    /// The token following this one
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A choice offered to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Output field name to pass back to `choose`
    pub id: String,
    /// Localized choice text
    pub text: String,
}

/// The localized line and choices for the current dialogue node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Node being presented
    pub node: NodeId,
    /// Name of that node
    pub node_name: String,
    /// Step this presentation belongs to
    pub step: StepToken,
    /// Localized line
    pub line: String,
    /// Choices in port order
    pub choices: Vec<Choice>,
}

impl Presentation {
    /// Choice identifiers in order
    pub fn choice_ids(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.id.as_str()).collect()
    }
}

/// Why a traversal stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The graph has no `Start` node
    NoEntryNode,
    /// The engine reached a node kind it cannot run
    UnknownNodeKind,
    /// The chosen (or exit) port leads nowhere
    NoOutgoingEdge,
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueEvent {
    /// A new dialogue node was reached, or the language changed while
    /// waiting for a choice
    PresentationChanged(Presentation),
    /// The traversal stopped; no further presentations follow
    TraversalTerminated(TerminationReason),
}

/// Destination for [`DialogueEvent`]s
pub trait EventSink: Send {
    /// Deliver one event
    fn publish(&mut self, event: DialogueEvent);
}

impl EventSink for mpsc::Sender<DialogueEvent> {
    fn publish(&mut self, event: DialogueEvent) {
        if self.send(event).is_err() {
            tracing::debug!("Dialogue event receiver dropped");
        }
    }
}

/// Shared in-memory event recorder
///
/// Clones share the same log, so one clone can be handed to the engine while
/// another is kept for reading.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<DialogueEvent>>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<DialogueEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: DialogueEvent) {
        self.events.lock().push(event);
    }
}
