// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player configuration.
//!
//! The player is driven by a single RON file naming the graph document, the
//! language files (first one is the default) and logging directives. Paths
//! are resolved relative to the directory holding the configuration file.

use dialogue_graph::{DialogueGraph, GraphDocument, GraphError};
use dialogue_localization::{Language, LocalizationCatalog, LocalizationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Configuration file looked up when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "dialogue.ron";

/// Errors raised while loading the configuration or the assets it names
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Configuration written by a newer player
    #[error("Configuration version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// Graph document failed to load or build
    #[error("Graph {path}: {source}")]
    Graph {
        /// Graph document path
        path: PathBuf,
        /// Underlying error
        source: GraphError,
    },

    /// Language file failed to load
    #[error("Language {path}: {source}")]
    Language {
        /// Language file path
        path: PathBuf,
        /// Underlying error
        source: LocalizationError,
    },

    /// Initial language is not among the loaded ones
    #[error(transparent)]
    InitialLanguage(#[from] LocalizationError),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directives added on top of `RUST_LOG`
    pub directives: Vec<String>,
    /// Show warnings and errors inline with the dialogue
    pub inline_diagnostics: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            directives: vec![
                "dialogue_player=info".to_string(),
                "dialogue_runtime=info".to_string(),
                "dialogue_localization=warn".to_string(),
            ],
            inline_diagnostics: true,
        }
    }
}

/// Player configuration as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Format version
    pub version: u32,
    /// Graph document path
    pub graph: PathBuf,
    /// Language files in authored order; the first is the default
    pub languages: Vec<PathBuf>,
    /// Language to activate instead of the first one
    #[serde(default)]
    pub initial_language: Option<String>,
    /// Logging
    #[serde(default)]
    pub log: LogSettings,
    /// Directory the relative paths above are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            graph: PathBuf::from("graph.ron"),
            languages: vec![PathBuf::from("en.ron")],
            initial_language: None,
            log: LogSettings::default(),
            base_dir: PathBuf::new(),
        }
    }
}

impl PlayerConfig {
    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: PlayerConfig = ron::from_str(text)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_ron(&text)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Resolve a configured path against the configuration directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Load and build the dialogue graph
    pub fn load_graph(&self) -> Result<DialogueGraph, ConfigError> {
        let path = self.resolve(&self.graph);
        GraphDocument::load(&path)
            .and_then(|doc| doc.build())
            .map_err(|source| ConfigError::Graph { path, source })
    }

    /// Load every language and build the catalog
    pub fn load_catalog(&self) -> Result<LocalizationCatalog, ConfigError> {
        let languages = self
            .languages
            .iter()
            .map(|path| {
                let path = self.resolve(path);
                Language::load(&path).map_err(|source| ConfigError::Language { path, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalog = LocalizationCatalog::new(languages);
        if let Some(name) = &self.initial_language {
            catalog.set_language(name)?;
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.languages.len(), 1);
        assert!(config.log.inline_diagnostics);
    }

    #[test]
    fn test_serialization() {
        let config = PlayerConfig {
            initial_language: Some("Deutsch".to_string()),
            ..PlayerConfig::default()
        };
        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = PlayerConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PlayerConfig::from_ron(
            r#"(version: 1, graph: "tavern.ron", languages: ["en.ron", "fr.json"])"#,
        )
        .unwrap();
        assert_eq!(config.initial_language, None);
        assert_eq!(config.log, LogSettings::default());
        assert_eq!(config.languages[1], PathBuf::from("fr.json"));
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = PlayerConfig::from_ron(r#"(version: 99, graph: "g.ron", languages: [])"#);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion { found: 99, .. })));
    }

    #[test]
    fn test_relative_paths_follow_config_dir() {
        let config = PlayerConfig {
            base_dir: PathBuf::from("assets/dialogue"),
            ..PlayerConfig::default()
        };
        assert_eq!(config.resolve(Path::new("en.ron")), PathBuf::from("assets/dialogue/en.ron"));
    }

    #[test]
    fn test_load_tavern_demo() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/tavern/dialogue.ron");
        let config = PlayerConfig::load(&path).unwrap();

        let graph = config.load_graph().unwrap();
        assert_eq!(graph.node_count(), 6);
        assert!(graph.node_by_name("wreck").is_some());

        let catalog = config.load_catalog().unwrap();
        let names: Vec<_> = catalog.available_languages().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["English", "Français"]);
        assert_eq!(catalog.get_translation("common.leave"), "I should go.");
    }

    #[test]
    fn test_unknown_initial_language() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/tavern/dialogue.ron");
        let mut config = PlayerConfig::load(&path).unwrap();
        config.initial_language = Some("Klingon".to_string());
        assert!(matches!(config.load_catalog(), Err(ConfigError::InitialLanguage(_))));
    }
}
