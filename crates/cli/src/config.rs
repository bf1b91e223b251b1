use anyhow::{Context, Result};
use biograph_entities::{DictionaryRegistry, ExtractorConfig};
use biograph_graph::{AliasEntry, AliasMap, GraphConfig, GraphFilters, VisualOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "biograph.toml";

/// Contents of `biograph.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub extraction: ExtractorConfig,
    pub graph: GraphSection,
    pub aliases: Vec<AliasEntry>,
    pub dictionaries: DictionarySection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphSection {
    /// Subject used when no letters name anyone
    pub central_person: Option<String>,
    pub unknown_names: Vec<String>,
    pub include_letter_places: bool,
    pub color_by_time: bool,
    pub size_by_activity: bool,
    pub show_people: bool,
    pub show_places: bool,
    pub show_organizations: bool,
}

impl Default for GraphSection {
    fn default() -> Self {
        let graph = GraphConfig::default();
        Self {
            central_person: None,
            unknown_names: graph.unknown_names,
            include_letter_places: graph.include_letter_places,
            color_by_time: graph.visual.color_by_time,
            size_by_activity: graph.visual.size_by_activity,
            show_people: graph.filters.show_people,
            show_places: graph.filters.show_places,
            show_organizations: graph.filters.show_organizations,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictionarySection {
    /// Directory of `*.toml` dictionaries loaded next to the bundled ones
    pub dir: Option<PathBuf>,
    /// Dictionary applied by `extract` when `--dictionary` is not given
    pub default: Option<String>,
}

impl AppConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config
            .extraction
            .validate()
            .map_err(|e| anyhow::anyhow!("[extraction] {e}"))?;
        Ok(config)
    }

    pub fn graph_config(&self) -> GraphConfig {
        let section = &self.graph;
        GraphConfig {
            unknown_names: section.unknown_names.clone(),
            include_letter_places: section.include_letter_places,
            visual: VisualOptions {
                color_by_time: section.color_by_time,
                size_by_activity: section.size_by_activity,
            },
            filters: GraphFilters {
                show_people: section.show_people,
                show_places: section.show_places,
                show_organizations: section.show_organizations,
            },
            aliases: AliasMap::new(self.aliases.clone()),
        }
    }

    /// Bundled dictionaries plus any found in `[dictionaries].dir`
    pub fn dictionary_registry(&self) -> DictionaryRegistry {
        let mut registry = DictionaryRegistry::with_builtins();
        if let Some(dir) = &self.dictionaries.dir {
            match registry.load_dir(dir) {
                Ok(count) => log::info!("Loaded {count} dictionaries from {}", dir.display()),
                Err(e) => log::warn!("Dictionary directory {} unusable: {e}", dir.display()),
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_libraries() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.graph_config(), GraphConfig::default());
        assert_eq!(config.extraction, ExtractorConfig::default());
    }

    #[test]
    fn test_sections_parse() {
        let config = AppConfig::from_toml_str(
            r#"
            [extraction]
            confidence_threshold = 0.7

            [graph]
            central_person = "Vincent van Gogh"
            show_organizations = false

            [[aliases]]
            canonical = "Vincent van Gogh"
            variants = ["Vincent"]

            [dictionaries]
            default = "vangogh"
            "#,
        )
        .unwrap();
        assert_eq!(config.extraction.confidence_threshold, 0.7);
        assert_eq!(config.graph.central_person.as_deref(), Some("Vincent van Gogh"));
        let graph = config.graph_config();
        assert!(!graph.filters.show_organizations);
        assert_eq!(graph.aliases.normalize("vincent"), "Vincent van Gogh");
        assert_eq!(config.dictionaries.default.as_deref(), Some("vangogh"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(AppConfig::from_toml_str("[graph]\ncolour_by_time = true\n").is_err());
        assert!(AppConfig::from_toml_str("[search]\n").is_err());
        assert!(AppConfig::from_toml_str("[extraction]\nconfidence_threshold = 3.0\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/biograph.toml"))).is_err());
    }
}
