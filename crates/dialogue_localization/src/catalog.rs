// SPDX-License-Identifier: MIT OR Apache-2.0
//! The localization catalog: available languages, the active one, and lookups.

use crate::language::Language;
use crate::observer::{ObserverId, ObserverList, SharedObserver};
use crate::LocalizationError;

/// Text returned for a key that cannot be resolved
pub fn missing_translation(key: &str) -> String {
    format!("Missing translation: {key}")
}

/// Holds every available language and resolves keys against the active one
///
/// Construct one per process at bootstrap and hand it by reference to
/// whatever needs lookups. Languages keep their authored order; the first is
/// the default.
#[derive(Default)]
pub struct LocalizationCatalog {
    languages: Vec<Language>,
    current: Option<usize>,
    observers: ObserverList,
}

impl LocalizationCatalog {
    /// Create a catalog and activate the first language
    ///
    /// An empty language list is a configuration error: it is reported and
    /// the catalog is left with no active language, so every lookup yields
    /// the missing-translation text.
    pub fn new(languages: Vec<Language>) -> Self {
        let mut catalog = Self {
            languages,
            current: None,
            observers: ObserverList::default(),
        };

        if catalog.languages.is_empty() {
            tracing::error!("No available languages assigned to the localization catalog");
        } else if let Err(err) = catalog.set_language_index(0) {
            tracing::error!("Failed to activate the default language: {err}");
        }

        catalog
    }

    /// Activate the language called `name`
    pub fn set_language(&mut self, name: &str) -> Result<(), LocalizationError> {
        let Some(index) = self.languages.iter().position(|l| l.name == name) else {
            tracing::error!("Attempted to set unregistered language '{name}'");
            return Err(LocalizationError::InvalidLanguage(name.to_string()));
        };
        self.set_language_index(index)
    }

    /// Activate the language at `index` in authored order
    ///
    /// The language is finalized before it becomes active, then observers are
    /// notified in registration order.
    pub fn set_language_index(&mut self, index: usize) -> Result<(), LocalizationError> {
        let Some(language) = self.languages.get_mut(index) else {
            tracing::error!("Attempted to set language #{index}, only {} registered", self.languages.len());
            return Err(LocalizationError::InvalidLanguage(format!("#{index}")));
        };

        language.finalize();
        self.current = Some(index);

        tracing::info!("Language set to: {}", language.name);
        for (key, value) in language.translations() {
            tracing::trace!("Key: {key}, Value: {value}");
        }

        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        for (id, observer) in self.observers.live() {
            // A locked observer is the caller itself re-entering; skip it
            // instead of deadlocking.
            match observer.try_lock() {
                Some(mut guard) => guard.language_changed(self),
                None => tracing::warn!("Language observer {id:?} is busy, notification skipped"),
            }
        }
    }

    /// Localized text for `key` in the active language
    ///
    /// Never fails: a missing language or key yields
    /// `"Missing translation: <key>"` and a logged diagnostic.
    pub fn get_translation(&self, key: &str) -> String {
        let Some(language) = self.current_language() else {
            tracing::error!("No language is currently set in the localization catalog");
            return missing_translation(key);
        };

        match language.get(key) {
            Some(text) => text.to_string(),
            None => {
                tracing::warn!(
                    "Translation for key '{key}' is missing in the current language '{}'",
                    language.name
                );
                missing_translation(key)
            }
        }
    }

    /// Localized text for `key`, or `fallback` when it cannot be resolved
    pub fn get_translation_or_default(&self, key: &str, fallback: &str) -> String {
        match self.current_language().and_then(|l| l.get(key)) {
            Some(text) => text.to_string(),
            None => {
                tracing::warn!("Key '{key}' not found. Using fallback: '{fallback}'");
                fallback.to_string()
            }
        }
    }

    /// Languages in authored order
    pub fn available_languages(&self) -> &[Language] {
        &self.languages
    }

    /// The active language, if any
    pub fn current_language(&self) -> Option<&Language> {
        self.current.and_then(|i| self.languages.get(i))
    }

    /// Register an observer for language changes
    ///
    /// Only a weak handle is kept; unsubscribe before dropping the observer
    /// to release the slot eagerly.
    pub fn subscribe(&mut self, observer: &SharedObserver) -> ObserverId {
        let id = self.observers.add(observer);
        tracing::debug!("Subscribed language observer {id:?}");
        id
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.remove(id);
        if removed {
            tracing::debug!("Unsubscribed language observer {id:?}");
        }
        removed
    }

    /// Number of registered observers, including ones not yet pruned
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
