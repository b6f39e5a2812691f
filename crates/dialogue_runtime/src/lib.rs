// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dialogue traversal runtime.
//!
//! Walks a [`DialogueGraph`](dialogue_graph::DialogueGraph) one node at a
//! time, resolving each dialogue node's keys through a
//! [`LocalizationCatalog`](dialogue_localization::LocalizationCatalog) and
//! publishing the result as a [`Presentation`]. The player's answer comes
//! back in through `choose`, which follows the matching output port.
//!
//! ## Architecture
//!
//! - [`TraversalEngine`] is the state machine; it owns the graph cursor
//! - Outbound events go to an [`EventSink`]
//! - Every presentation carries a [`StepToken`]; choices made against an
//!   older token are dropped
//! - [`DialogueSession`] keeps the engine subscribed to language changes
//!   for the session's lifetime

pub mod engine;
pub mod error;
pub mod event;
pub mod session;

pub use engine::{TraversalEngine, TraversalState};
pub use error::{DialogueError, Result};
pub use event::{Choice, DialogueEvent, EventLog, EventSink, Presentation, StepToken, TerminationReason};
pub use session::DialogueSession;
