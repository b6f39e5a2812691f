// SPDX-License-Identifier: MIT OR Apache-2.0
//! Language-change observers.
//!
//! The catalog keeps weak handles only. An observer that is dropped without
//! unsubscribing is skipped and pruned on the next notification, so a stale
//! callback can never run.

use crate::catalog::LocalizationCatalog;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Receives a callback after the active language changed
pub trait LanguageObserver: Send {
    /// Called once the new language is active and fully indexed
    fn language_changed(&mut self, catalog: &LocalizationCatalog);
}

/// Shared handle to an observer, as held by its owner
pub type SharedObserver = Arc<Mutex<dyn LanguageObserver>>;

/// Registration handle returned by [`LocalizationCatalog::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observers in registration order
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(ObserverId, Weak<Mutex<dyn LanguageObserver>>)>,
}

impl ObserverList {
    pub(crate) fn add(&mut self, observer: &SharedObserver) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Arc::downgrade(observer)));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Upgrade every live observer, dropping the dead ones
    pub(crate) fn live(&mut self) -> Vec<(ObserverId, SharedObserver)> {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|(id, weak)| match weak.upgrade() {
            Some(observer) => {
                live.push((*id, observer));
                true
            }
            None => {
                tracing::debug!("Pruning dropped language observer {id:?}");
                false
            }
        });
        live
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
