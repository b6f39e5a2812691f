// SPDX-License-Identifier: MIT OR Apache-2.0
//! Languages and their translation tables.

use crate::LocalizationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single key/text pair as authored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Lookup key
    pub key: String,
    /// Localized text
    pub value: String,
}

/// A language: a name plus a key to text mapping
///
/// The authored entry list is what gets (de)serialized. Lookups go through an
/// index built by [`Language::finalize`]; the catalog finalizes a language
/// before activating it, so an active language never has unindexed entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    /// Language name, used as its identifier
    pub name: String,
    /// Entries in authored order
    #[serde(default)]
    entries: Vec<TranslationEntry>,
    #[serde(skip)]
    index: IndexMap<String, String>,
    #[serde(skip)]
    finalized: bool,
}

impl Language {
    /// Create an empty language
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            index: IndexMap::new(),
            finalized: false,
        }
    }

    /// Create a language from `(key, text)` pairs
    pub fn from_pairs<K, V>(name: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut language = Self::new(name);
        for (key, value) in pairs {
            language.insert(key, value);
        }
        language
    }

    /// Parse a language from RON text
    pub fn from_ron(text: &str) -> Result<Self, LocalizationError> {
        Ok(ron::from_str(text)?)
    }

    /// Parse a language from JSON text
    pub fn from_json(text: &str) -> Result<Self, LocalizationError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a language file, picking the format from the extension
    ///
    /// `.json` files are read as JSON, everything else as RON.
    pub fn load(path: &Path) -> Result<Self, LocalizationError> {
        let text = std::fs::read_to_string(path)?;
        let language = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&text)?,
            _ => Self::from_ron(&text)?,
        };
        tracing::debug!(
            "Loaded language '{}' ({} entries) from {}",
            language.name,
            language.entries.len(),
            path.display()
        );
        Ok(language)
    }

    /// Append an entry; the index is rebuilt on the next finalize
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(TranslationEntry {
            key: key.into(),
            value: value.into(),
        });
        self.finalized = false;
    }

    /// Build the lookup index from the authored entries
    ///
    /// Idempotent: a finalized language with no new entries is left as is.
    /// When a key is authored twice the first entry wins.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        self.index.clear();
        for entry in &self.entries {
            if self.index.contains_key(&entry.key) {
                tracing::warn!(
                    "Duplicate translation key '{}' in language '{}', keeping the first entry",
                    entry.key,
                    self.name
                );
                continue;
            }
            self.index.insert(entry.key.clone(), entry.value.clone());
        }
        self.finalized = true;
    }

    /// Whether the index reflects every authored entry
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Look up the text for `key`
    ///
    /// Only finalized entries are visible.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(String::as_str)
    }

    /// Check whether `key` is translated
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Finalized translations in authored order
    pub fn translations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.index.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Authored entries
    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    /// Number of distinct finalized keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no keys are finalized
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_builds_index() {
        let mut language = Language::from_pairs("English", [("greet", "Hello"), ("bye", "Goodbye")]);
        assert!(!language.is_finalized());
        assert_eq!(language.get("greet"), None);

        language.finalize();
        assert!(language.is_finalized());
        assert_eq!(language.get("greet"), Some("Hello"));
        assert_eq!(language.len(), 2);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut language = Language::from_pairs("English", [("greet", "Hello")]);
        language.finalize();
        language.finalize();
        assert_eq!(language.len(), 1);

        language.insert("bye", "Goodbye");
        assert!(!language.is_finalized());
        language.finalize();
        assert_eq!(language.get("bye"), Some("Goodbye"));
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let mut language = Language::from_pairs("English", [("greet", "Hello"), ("greet", "Hi")]);
        language.finalize();
        assert_eq!(language.get("greet"), Some("Hello"));
        assert_eq!(language.entries().len(), 2);
        assert_eq!(language.len(), 1);
    }

    #[test]
    fn test_ron_and_json_sources() {
        let ron_text = r#"(name: "Deutsch", entries: [(key: "greet", value: "Hallo")])"#;
        let mut german = Language::from_ron(ron_text).unwrap();
        german.finalize();
        assert_eq!(german.name, "Deutsch");
        assert_eq!(german.get("greet"), Some("Hallo"));

        let json_text = r#"{"name": "Français", "entries": [{"key": "greet", "value": "Bonjour"}]}"#;
        let mut french = Language::from_json(json_text).unwrap();
        french.finalize();
        assert_eq!(french.get("greet"), Some("Bonjour"));
    }

    #[test]
    fn test_deserialized_language_needs_finalize() {
        let language = Language::from_ron(r#"(name: "English", entries: [(key: "a", value: "b")])"#).unwrap();
        assert!(!language.is_finalized());
        assert!(language.is_empty());
    }
}
