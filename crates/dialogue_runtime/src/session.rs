// SPDX-License-Identifier: MIT OR Apache-2.0
//! A dialogue session: one catalog, one engine, and the subscription between them.

use crate::engine::{TraversalEngine, TraversalState};
use crate::error::Result;
use crate::event::{EventSink, Presentation, StepToken};
use dialogue_graph::{DialogueGraph, NodeId};
use dialogue_localization::{LocalizationCatalog, ObserverId, SharedObserver};
use parking_lot::Mutex;
use std::sync::Arc;

/// Owns the catalog and the engine and keeps the engine subscribed to
/// language changes for exactly as long as the session lives
pub struct DialogueSession {
    catalog: LocalizationCatalog,
    engine: Arc<Mutex<TraversalEngine>>,
    subscription: ObserverId,
}

impl DialogueSession {
    /// Wire `graph` and `catalog` together, publishing events to `sink`
    pub fn new(graph: DialogueGraph, mut catalog: LocalizationCatalog, sink: impl EventSink + 'static) -> Self {
        let engine = Arc::new(Mutex::new(TraversalEngine::new(graph, sink)));
        let observer: SharedObserver = engine.clone();
        let subscription = catalog.subscribe(&observer);
        Self {
            catalog,
            engine,
            subscription,
        }
    }

    /// Start the traversal
    pub fn start(&mut self) -> Result<()> {
        self.engine.lock().start(&self.catalog)
    }

    /// Follow the output named `field` from the current node
    pub fn choose(&mut self, field: &str) -> Result<()> {
        self.engine.lock().choose(field, &self.catalog)
    }

    /// Follow `field` if `step` is still pending
    pub fn choose_at(&mut self, step: StepToken, field: &str) -> Result<()> {
        self.engine.lock().choose_at(step, field, &self.catalog)
    }

    /// Switch language; a pending presentation is re-rendered
    pub fn set_language(&mut self, name: &str) -> Result<()> {
        Ok(self.catalog.set_language(name)?)
    }

    /// Return the engine to `Idle`
    pub fn restart(&mut self) {
        self.engine.lock().restart();
    }

    /// Current traversal state
    pub fn state(&self) -> TraversalState {
        self.engine.lock().state()
    }

    /// Node the traversal is on
    pub fn current(&self) -> Option<NodeId> {
        self.engine.lock().current()
    }

    /// Pending presentation, if awaiting a choice
    pub fn presentation(&self) -> Option<Presentation> {
        self.engine.lock().presentation().cloned()
    }

    /// The localization catalog
    pub fn catalog(&self) -> &LocalizationCatalog {
        &self.catalog
    }

    /// Shared handle to the engine
    pub fn engine(&self) -> &Arc<Mutex<TraversalEngine>> {
        &self.engine
    }
}

impl Drop for DialogueSession {
    fn drop(&mut self) {
        self.catalog.unsubscribe(self.subscription);
    }
}
