// SPDX-License-Identifier: MIT OR Apache-2.0
//! Key-based localization for dialogue text.
//!
//! A [`LocalizationCatalog`] owns the available [`Language`]s in authored
//! order and resolves keys against the active one. Lookups never fail:
//! unresolved keys come back as `"Missing translation: <key>"` (or a caller
//! supplied fallback) and are reported through `tracing`.
//!
//! Switching languages notifies registered [`LanguageObserver`]s
//! synchronously, after the new language is fully indexed.

pub mod language;
pub mod catalog;
pub mod observer;

pub use language::{Language, TranslationEntry};
pub use catalog::{missing_translation, LocalizationCatalog};
pub use observer::{LanguageObserver, ObserverId, SharedObserver};

/// Errors raised by the localization catalog and language loading
#[derive(Debug, thiserror::Error)]
pub enum LocalizationError {
    /// The requested language is not registered
    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    /// A language file could not be read
    #[error("Failed to read language file: {0}")]
    Io(#[from] std::io::Error),

    /// A RON language file could not be parsed
    #[error("Failed to parse RON language: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// A JSON language file could not be parsed
    #[error("Failed to parse JSON language: {0}")]
    Json(#[from] serde_json::Error),
}
