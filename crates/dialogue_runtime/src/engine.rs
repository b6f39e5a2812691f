// SPDX-License-Identifier: MIT OR Apache-2.0
//! The traversal engine: a single-active-node state machine over a dialogue graph.
//!
//! ```text
//!   Idle ──start──▶ (process entry) ──▶ AwaitingChoice ──choose──▶ Advancing
//!                         │                   ▲                       │
//!                         ▼                   └──── (process next) ◀──┘
//!                     Terminated ◀─── no entry / unknown kind / no edge / cycle
//! ```
//!
//! `Start` nodes pass straight through to their `exit` target, so the first
//! externally visible state after `start` is either a presentation or a
//! termination. A pass-through chain that comes back to a node it already
//! crossed terminates instead of spinning. The only suspension point is
//! `AwaitingChoice`.

use crate::error::{DialogueError, Result};
use crate::event::{Choice, DialogueEvent, EventSink, Presentation, StepToken, TerminationReason};
use dialogue_graph::{DialogueGraph, Node, NodeId, NodeRecord, DIALOGUE_TAG, EXIT_PORT, START_TAG};
use dialogue_localization::{LanguageObserver, LocalizationCatalog};
use std::collections::HashSet;

/// Fields in a dialogue record: the line key plus four choice keys
const DIALOGUE_FIELDS: usize = 5;

/// Traversal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalState {
    /// Not started
    #[default]
    Idle,
    /// A presentation is out and the engine waits for `choose`
    AwaitingChoice,
    /// Resolving an edge and moving the cursor
    Advancing,
    /// Stopped; only `restart` leaves this state
    Terminated(TerminationReason),
}

impl TraversalState {
    /// Check if the engine waits for a choice
    pub fn is_awaiting(&self) -> bool {
        matches!(self, TraversalState::AwaitingChoice)
    }

    /// Check if the traversal has stopped
    pub fn is_terminated(&self) -> bool {
        matches!(self, TraversalState::Terminated(_))
    }
}

/// The dialogue beat currently on screen
#[derive(Debug, Clone)]
struct ActiveBeat {
    node: NodeId,
    node_name: String,
    line_key: String,
    /// `(choice id, localization key)` in port order
    choices: Vec<(String, String)>,
}

/// Walks a [`DialogueGraph`] one node at a time
///
/// The engine owns the graph and is the only writer of its cursor. The
/// catalog is passed in per call so language switches and lookups never
/// contend for the same lock.
pub struct TraversalEngine {
    graph: DialogueGraph,
    state: TraversalState,
    step: StepToken,
    beat: Option<ActiveBeat>,
    presentation: Option<Presentation>,
    sink: Box<dyn EventSink>,
}

impl TraversalEngine {
    /// Create an idle engine over `graph`, publishing to `sink`
    pub fn new(graph: DialogueGraph, sink: impl EventSink + 'static) -> Self {
        Self {
            graph,
            state: TraversalState::Idle,
            step: StepToken::default(),
            beat: None,
            presentation: None,
            sink: Box::new(sink),
        }
    }

    /// Current state
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// The graph being traversed
    pub fn graph(&self) -> &DialogueGraph {
        &self.graph
    }

    /// Node the traversal is on
    pub fn current(&self) -> Option<NodeId> {
        self.graph.current()
    }

    /// Token of the pending step
    pub fn step(&self) -> StepToken {
        self.step
    }

    /// Last published presentation, while awaiting a choice
    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    /// Locate the entry node and run until the first choice or termination
    pub fn start(&mut self, catalog: &LocalizationCatalog) -> Result<()> {
        if self.state != TraversalState::Idle {
            return Err(self.invalid_state("start"));
        }

        let entry = match self.graph.find_entry() {
            Ok(entry) => entry,
            Err(_) => return Err(self.terminate(DialogueError::NoEntryNode)),
        };

        tracing::info!("Starting dialogue '{}'", self.graph.name);
        self.move_to(entry);
        self.process(entry, catalog)
    }

    /// Follow the output port named `field` from the current node
    pub fn choose(&mut self, field: &str, catalog: &LocalizationCatalog) -> Result<()> {
        self.choose_at(self.step, field, catalog)
    }

    /// Follow `field`, provided `step` is still the pending step
    ///
    /// Presentation layers should pass the token of the presentation the
    /// player acted on, so a repeated click on an old choice is dropped.
    pub fn choose_at(
        &mut self,
        step: StepToken,
        field: &str,
        catalog: &LocalizationCatalog,
    ) -> Result<()> {
        if self.state != TraversalState::AwaitingChoice {
            return Err(self.invalid_state("choose"));
        }
        if step != self.step {
            tracing::debug!("Dropping stale choice '{field}' for step {step:?}");
            return Err(DialogueError::StaleStep {
                expected: self.step,
                received: step,
            });
        }

        let Some(from) = self.graph.current() else {
            return Err(self.invalid_state("choose"));
        };

        self.state = TraversalState::Advancing;
        self.beat = None;
        self.presentation = None;

        match self.graph.resolve_edge(from, field) {
            Some(next) => {
                self.move_to(next);
                self.process(next, catalog)
            }
            None => {
                let node = self.node_name(from);
                Err(self.terminate(DialogueError::NoOutgoingEdge {
                    node,
                    field: field.to_string(),
                }))
            }
        }
    }

    /// Return to `Idle` so the traversal can be started again
    pub fn restart(&mut self) {
        tracing::info!("Restarting dialogue '{}'", self.graph.name);
        self.graph.clear_current();
        self.state = TraversalState::Idle;
        self.step = self.step.next();
        self.beat = None;
        self.presentation = None;
    }

    /// Re-resolve the pending presentation against the active language
    ///
    /// Republishes under the same step token with the same choice ids; the
    /// cursor does not move. Does nothing unless awaiting a choice.
    pub fn refresh(&mut self, catalog: &LocalizationCatalog) {
        if !self.state.is_awaiting() {
            return;
        }
        let Some(beat) = &self.beat else {
            return;
        };

        tracing::debug!("Re-rendering '{}' for the new language", beat.node_name);
        let presentation = render(beat, self.step, catalog);
        self.publish_presentation(presentation);
    }

    /// Run nodes from `node` until one needs the player or the traversal ends
    fn process(&mut self, mut node: NodeId, catalog: &LocalizationCatalog) -> Result<()> {
        // Any choice made against an earlier step is now stale
        self.step = self.step.next();
        self.state = TraversalState::Advancing;
        let mut passed = HashSet::new();

        loop {
            let Some(current) = self.graph.node(node) else {
                let name = format!("{node:?}");
                return Err(self.terminate(DialogueError::NoOutgoingEdge {
                    node: name,
                    field: String::new(),
                }));
            };

            let data = current.serialize();
            tracing::debug!("Processing node: {}, Data: {data}", current.name);
            let record = NodeRecord::parse(&data);

            match record.kind() {
                START_TAG if !passed.insert(node) => {
                    let name = current.name.clone();
                    return Err(self.terminate(DialogueError::PassThroughCycle { node: name }));
                }
                START_TAG => match self.graph.resolve_edge(node, EXIT_PORT) {
                    Some(next) => {
                        tracing::debug!("Start node reached, moving on");
                        self.move_to(next);
                        node = next;
                    }
                    None => {
                        let name = current.name.clone();
                        return Err(self.terminate(DialogueError::NoOutgoingEdge {
                            node: name,
                            field: EXIT_PORT.to_string(),
                        }));
                    }
                },
                DIALOGUE_TAG => {
                    let Some(beat) = beat_for(current, &record) else {
                        let name = current.name.clone();
                        return Err(self.terminate(DialogueError::MalformedRecord {
                            node: name,
                            record: data,
                        }));
                    };

                    let presentation = render(&beat, self.step, catalog);
                    self.beat = Some(beat);
                    self.state = TraversalState::AwaitingChoice;
                    self.publish_presentation(presentation);
                    return Ok(());
                }
                kind => {
                    let error = DialogueError::UnknownNodeKind {
                        node: current.name.clone(),
                        kind: kind.to_string(),
                    };
                    return Err(self.terminate(error));
                }
            }
        }
    }

    fn move_to(&mut self, node: NodeId) {
        // Ids handed in here come from the graph itself
        if let Err(err) = self.graph.set_current(node) {
            tracing::error!("Cannot move to node: {err}");
            return;
        }
        tracing::debug!("Transitioned to node: {}", self.node_name(node));
    }

    fn publish_presentation(&mut self, presentation: Presentation) {
        self.presentation = Some(presentation.clone());
        self.sink.publish(DialogueEvent::PresentationChanged(presentation));
    }

    /// Enter `Terminated`, publish the reason and hand the error back
    fn terminate(&mut self, error: DialogueError) -> DialogueError {
        tracing::error!("{error}");
        if let Some(reason) = error.termination_reason() {
            self.state = TraversalState::Terminated(reason);
            self.step = self.step.next();
            self.beat = None;
            self.presentation = None;
            self.sink.publish(DialogueEvent::TraversalTerminated(reason));
        }
        error
    }

    fn invalid_state(&self, operation: &'static str) -> DialogueError {
        let error = DialogueError::InvalidState {
            operation,
            state: self.state,
        };
        tracing::warn!("{error}");
        error
    }

    fn node_name(&self, node: NodeId) -> String {
        self.graph
            .node(node)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| format!("{node:?}"))
    }
}

impl LanguageObserver for TraversalEngine {
    fn language_changed(&mut self, catalog: &LocalizationCatalog) {
        self.refresh(catalog);
    }
}

/// Pair a dialogue record's keys with the node's output ports
fn beat_for(node: &Node, record: &NodeRecord) -> Option<ActiveBeat> {
    let fields = record.fields();
    let outputs = node.output_names();
    if fields.len() != DIALOGUE_FIELDS || outputs.len() != DIALOGUE_FIELDS - 1 {
        return None;
    }

    Some(ActiveBeat {
        node: node.id,
        node_name: node.name.clone(),
        line_key: fields[0].clone(),
        choices: outputs.into_iter().zip(fields[1..].iter().cloned()).collect(),
    })
}

fn render(beat: &ActiveBeat, step: StepToken, catalog: &LocalizationCatalog) -> Presentation {
    Presentation {
        node: beat.node,
        node_name: beat.node_name.clone(),
        step,
        line: catalog.get_translation(&beat.line_key),
        choices: beat
            .choices
            .iter()
            .map(|(id, key)| Choice {
                id: id.clone(),
                text: catalog.get_translation(key),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_graph::{DialogueKeys, CHOICE_PORTS};
    use dialogue_localization::{Language, SharedObserver};
    use parking_lot::Mutex;
    use std::sync::{mpsc, Arc};

    fn english() -> Language {
        Language::from_pairs(
            "English",
            [
                ("greet", "Well met, traveller."),
                ("ale", "An ale, please."),
                ("room", "A room for the night."),
                ("rumors", "Heard any rumors?"),
                ("leave", "Goodbye."),
                ("ale.line", "Here you go."),
            ],
        )
    }

    fn french() -> Language {
        Language::from_pairs(
            "Français",
            [
                ("greet", "Bien le bonjour, voyageur."),
                ("ale", "Une bière, s'il vous plaît."),
                ("room", "Une chambre pour la nuit."),
                ("rumors", "Des rumeurs ?"),
                ("leave", "Au revoir."),
            ],
        )
    }

    fn greet_keys() -> DialogueKeys {
        DialogueKeys::new("greet", "ale", "room", "rumors", "leave")
    }

    /// start -> greet; greet.choiceA -> ale; choiceB left dangling
    fn tavern() -> (DialogueGraph, NodeId, NodeId) {
        let mut graph = DialogueGraph::new("tavern");
        let start = graph.add_node(Node::start("start")).unwrap();
        let greet = graph.add_node(Node::dialogue("greet", greet_keys())).unwrap();
        let ale = graph
            .add_node(Node::dialogue("ale", DialogueKeys::new("ale.line", "ale", "room", "rumors", "leave")))
            .unwrap();
        graph.link(start, "exit", greet).unwrap();
        graph.link(greet, "choiceA", ale).unwrap();
        graph.link(ale, "choiceD", greet).unwrap();
        (graph, greet, ale)
    }

    fn engine(graph: DialogueGraph) -> (TraversalEngine, mpsc::Receiver<DialogueEvent>) {
        let (tx, rx) = mpsc::channel();
        (TraversalEngine::new(graph, tx), rx)
    }

    fn presentations(rx: &mpsc::Receiver<DialogueEvent>) -> Vec<Presentation> {
        rx.try_iter()
            .filter_map(|e| match e {
                DialogueEvent::PresentationChanged(p) => Some(p),
                DialogueEvent::TraversalTerminated(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_start_passes_through_to_dialogue() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, greet, _) = tavern();
        let (mut engine, rx) = engine(graph);

        engine.start(&catalog).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        let DialogueEvent::PresentationChanged(presentation) = &events[0] else {
            panic!("expected a presentation, got {events:?}");
        };
        assert_eq!(presentation.node, greet);
        assert_eq!(engine.current(), Some(greet));
        assert_eq!(engine.state(), TraversalState::AwaitingChoice);
    }

    #[test]
    fn test_presentation_resolves_all_keys() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, _, _) = tavern();
        let (mut engine, rx) = engine(graph);
        engine.start(&catalog).unwrap();

        let presentation = presentations(&rx).remove(0);
        assert_eq!(presentation.line, "Well met, traveller.");
        assert_eq!(presentation.choice_ids(), CHOICE_PORTS.to_vec());
        let texts: Vec<_> = presentation.choices.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["An ale, please.", "A room for the night.", "Heard any rumors?", "Goodbye."]);
        assert_eq!(engine.presentation(), Some(&presentation));
    }

    #[test]
    fn test_missing_keys_use_sentinel() {
        let catalog = LocalizationCatalog::new(vec![french()]);
        let (graph, _, ale) = tavern();
        let (mut engine, rx) = engine(graph);
        engine.start(&catalog).unwrap();
        engine.choose("choiceA", &catalog).unwrap();

        assert_eq!(engine.current(), Some(ale));
        let presentation = presentations(&rx).pop().unwrap();
        assert_eq!(presentation.line, "Missing translation: ale.line");
        assert!(engine.state().is_awaiting());
    }

    #[test]
    fn test_choice_follows_named_port() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, greet, ale) = tavern();
        let (mut engine, rx) = engine(graph);
        engine.start(&catalog).unwrap();

        engine.choose("choiceA", &catalog).unwrap();
        assert_eq!(engine.current(), Some(ale));
        engine.choose("choiceD", &catalog).unwrap();
        assert_eq!(engine.current(), Some(greet));
        assert_eq!(presentations(&rx).len(), 3);
    }

    #[test]
    fn test_stale_choice_is_dropped() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, _, ale) = tavern();
        let (mut engine, _rx) = engine(graph);
        engine.start(&catalog).unwrap();
        let step = engine.presentation().unwrap().step;

        engine.choose_at(step, "choiceA", &catalog).unwrap();
        let second = engine.choose_at(step, "choiceD", &catalog);

        assert!(matches!(second, Err(DialogueError::StaleStep { received, .. }) if received == step));
        assert_eq!(engine.current(), Some(ale));
        assert!(engine.state().is_awaiting());
    }

    #[test]
    fn test_dangling_edge_terminates_in_place() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, greet, _) = tavern();
        let (mut engine, rx) = engine(graph);
        engine.start(&catalog).unwrap();
        let _ = rx.try_iter().count();

        let result = engine.choose("choiceB", &catalog);
        assert!(matches!(result, Err(DialogueError::NoOutgoingEdge { ref field, .. }) if field == "choiceB"));
        assert_eq!(engine.state(), TraversalState::Terminated(TerminationReason::NoOutgoingEdge));
        assert_eq!(engine.current(), Some(greet));
        assert!(engine.presentation().is_none());

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![DialogueEvent::TraversalTerminated(TerminationReason::NoOutgoingEdge)]);
    }

    #[test]
    fn test_unknown_field_terminates() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, greet, _) = tavern();
        let (mut engine, _rx) = engine(graph);
        engine.start(&catalog).unwrap();

        assert!(engine.choose("choiceZ", &catalog).is_err());
        assert_eq!(engine.state(), TraversalState::Terminated(TerminationReason::NoOutgoingEdge));
        assert_eq!(engine.current(), Some(greet));
    }

    #[test]
    fn test_missing_entry_node() {
        let catalog = LocalizationCatalog::new(vec![english()]);

        let (mut empty, rx) = engine(DialogueGraph::new("empty"));
        assert!(matches!(empty.start(&catalog), Err(DialogueError::NoEntryNode)));
        assert_eq!(empty.state(), TraversalState::Terminated(TerminationReason::NoEntryNode));
        assert!(presentations(&rx).is_empty());

        let mut graph = DialogueGraph::new("headless");
        graph.add_node(Node::dialogue("greet", greet_keys())).unwrap();
        let (mut headless, rx) = engine(graph);
        assert!(matches!(headless.start(&catalog), Err(DialogueError::NoEntryNode)));
        assert_eq!(headless.current(), None);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![DialogueEvent::TraversalTerminated(TerminationReason::NoEntryNode)]);
    }

    #[test]
    fn test_start_without_exit_edge() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let mut graph = DialogueGraph::new("lonely");
        let start = graph.add_node(Node::start("start")).unwrap();
        let (mut engine, _rx) = engine(graph);

        assert!(matches!(engine.start(&catalog), Err(DialogueError::NoOutgoingEdge { .. })));
        assert_eq!(engine.current(), Some(start));
        assert!(engine.state().is_terminated());
    }

    #[test]
    fn test_unknown_kind_terminates() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let mut graph = DialogueGraph::new("custom");
        let start = graph.add_node(Node::start("start")).unwrap();
        let dice = graph
            .add_node(Node::custom("dice", "MiniGame", vec!["dice".into()], &["win"]))
            .unwrap();
        graph.link(start, "exit", dice).unwrap();
        let (mut engine, rx) = engine(graph);

        let result = engine.start(&catalog);
        assert!(matches!(result, Err(DialogueError::UnknownNodeKind { ref kind, .. }) if kind == "MiniGame"));
        assert_eq!(engine.state(), TraversalState::Terminated(TerminationReason::UnknownNodeKind));
        assert!(presentations(&rx).is_empty());
    }

    /// Round-trip `graph` through RON with every `Placeholder` tag renamed,
    /// the way a hand-edited save file reaches the engine without `add_node`
    fn retag(graph: &DialogueGraph, tag: &str) -> DialogueGraph {
        let text = ron::to_string(graph).unwrap();
        ron::from_str(&text.replace("\"Placeholder\"", &format!("{tag:?}"))).unwrap()
    }

    #[test]
    fn test_custom_dialogue_tag_with_bad_arity() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let mut graph = DialogueGraph::new("forged");
        let start = graph.add_node(Node::start("start")).unwrap();
        let forged = graph
            .add_node(Node::custom("forged", "Placeholder", vec!["greet".into()], &["choiceA"]))
            .unwrap();
        graph.link(start, "exit", forged).unwrap();
        let (mut engine, _rx) = engine(retag(&graph, DIALOGUE_TAG));

        let result = engine.start(&catalog);
        assert!(matches!(result, Err(DialogueError::MalformedRecord { .. })));
        assert_eq!(engine.state(), TraversalState::Terminated(TerminationReason::UnknownNodeKind));
    }

    #[test]
    fn test_pass_through_cycle_terminates() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let mut graph = DialogueGraph::new("loop");
        let start = graph.add_node(Node::start("start")).unwrap();
        let spin = graph
            .add_node(Node::custom("spin", "Placeholder", Vec::new(), &[EXIT_PORT]))
            .unwrap();
        graph.link(start, EXIT_PORT, spin).unwrap();
        graph.link(spin, EXIT_PORT, spin).unwrap();
        let (mut engine, rx) = engine(retag(&graph, START_TAG));

        let result = engine.start(&catalog);
        assert!(matches!(result, Err(DialogueError::PassThroughCycle { ref node }) if node == "spin"));
        assert_eq!(engine.state(), TraversalState::Terminated(TerminationReason::NoOutgoingEdge));
        assert_eq!(engine.current(), Some(spin));
        assert!(presentations(&rx).is_empty());
    }

    #[test]
    fn test_invalid_state_is_a_no_op() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, greet, _) = tavern();
        let (mut engine, rx) = engine(graph);

        assert!(matches!(engine.choose("choiceA", &catalog), Err(DialogueError::InvalidState { .. })));
        assert_eq!(engine.state(), TraversalState::Idle);

        engine.start(&catalog).unwrap();
        assert!(matches!(engine.start(&catalog), Err(DialogueError::InvalidState { .. })));
        assert_eq!(engine.current(), Some(greet));

        let _ = engine.choose("choiceB", &catalog);
        assert!(matches!(engine.choose("choiceA", &catalog), Err(DialogueError::InvalidState { .. })));
        assert_eq!(engine.current(), Some(greet));
        assert_eq!(presentations(&rx).len(), 1);
    }

    #[test]
    fn test_language_change_rerenders_pending_presentation() {
        let mut catalog = LocalizationCatalog::new(vec![english(), french()]);
        let (graph, greet, _) = tavern();
        let (engine, rx) = engine(graph);
        let engine = Arc::new(Mutex::new(engine));
        let observer: SharedObserver = engine.clone();
        catalog.subscribe(&observer);

        engine.lock().start(&catalog).unwrap();
        catalog.set_language("Français").unwrap();

        let shown = presentations(&rx);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].line, "Bien le bonjour, voyageur.");
        assert_eq!(shown[1].choice_ids(), shown[0].choice_ids());
        assert_eq!(shown[1].step, shown[0].step);
        assert_eq!(engine.lock().current(), Some(greet));
    }

    #[test]
    fn test_refresh_outside_awaiting_is_silent() {
        let catalog = LocalizationCatalog::new(vec![english()]);
        let (graph, _, _) = tavern();
        let (mut engine, rx) = engine(graph);

        engine.refresh(&catalog);
        engine.start(&catalog).unwrap();
        let _ = engine.choose("choiceB", &catalog);
        engine.refresh(&catalog);

        assert_eq!(presentations(&rx).len(), 1);
    }
}
