// SPDX-License-Identifier: MIT OR Apache-2.0
//! Traversal errors.

use crate::engine::TraversalState;
use crate::event::{StepToken, TerminationReason};
use dialogue_localization::LocalizationError;
use thiserror::Error;

/// Errors reported by the traversal engine
///
/// None of these are fatal to the process. The terminating kinds stop the
/// current traversal; the rest leave the engine as it was.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Language switch failed
    #[error(transparent)]
    Localization(#[from] LocalizationError),

    /// The graph has no `Start` node
    #[error("No Start node found in the dialogue graph")]
    NoEntryNode,

    /// A node record carries a kind tag the engine cannot run
    #[error("Unknown node type '{kind}' on node '{node}'")]
    UnknownNodeKind {
        /// Node name
        node: String,
        /// Kind tag found in the record
        kind: String,
    },

    /// A known kind tag with the wrong number of fields
    #[error("Malformed record '{record}' on node '{node}'")]
    MalformedRecord {
        /// Node name
        node: String,
        /// Raw record
        record: String,
    },

    /// No edge leaves the node through the requested port
    #[error("No valid connection found for field '{field}' on node '{node}'")]
    NoOutgoingEdge {
        /// Node name
        node: String,
        /// Requested field name
        field: String,
    },

    /// Pass-through nodes lead back to one already crossed in this step
    #[error("Pass-through loop on node '{node}'")]
    PassThroughCycle {
        /// First node reached twice
        node: String,
    },

    /// The operation is not valid in the engine's current state
    #[error("Cannot {operation} while {state:?}")]
    InvalidState {
        /// Rejected operation
        operation: &'static str,
        /// State at the time
        state: TraversalState,
    },

    /// A choice arrived for a step that has already been superseded
    #[error("Stale choice for step {received:?}, current step is {expected:?}")]
    StaleStep {
        /// Token of the pending step
        expected: StepToken,
        /// Token the choice was made against
        received: StepToken,
    },
}

impl DialogueError {
    /// Termination reason published for this error, if it ends the traversal
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self {
            Self::NoEntryNode => Some(TerminationReason::NoEntryNode),
            Self::UnknownNodeKind { .. } | Self::MalformedRecord { .. } => {
                Some(TerminationReason::UnknownNodeKind)
            }
            Self::NoOutgoingEdge { .. } | Self::PassThroughCycle { .. } => {
                Some(TerminationReason::NoOutgoingEdge)
            }
            Self::Localization(_) | Self::InvalidState { .. } | Self::StaleStep { .. } => None,
        }
    }
}

/// Result type for traversal operations
pub type Result<T> = std::result::Result<T, DialogueError>;
