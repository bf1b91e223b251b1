use crate::aliases::AliasMap;
use serde::{Deserialize, Serialize};

/// Per-build visual switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualOptions {
    /// Color letters along the corpus time gradient
    pub color_by_time: bool,
    /// Grow nodes with their activity count
    pub size_by_activity: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            color_by_time: true,
            size_by_activity: false,
        }
    }
}

/// Which mention categories get tier-4 nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphFilters {
    pub show_people: bool,
    pub show_places: bool,
    pub show_organizations: bool,
}

impl Default for GraphFilters {
    fn default() -> Self {
        Self {
            show_people: true,
            show_places: true,
            show_organizations: true,
        }
    }
}

/// Configuration for graph synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Sender/recipient/place values meaning "unknown"; compared case-insensitively
    pub unknown_names: Vec<String>,

    /// Treat a letter's origin and destination as place mentions
    pub include_letter_places: bool,

    pub visual: VisualOptions,

    pub filters: GraphFilters,

    /// Applied to every person name before it becomes a node id
    pub aliases: AliasMap,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            unknown_names: vec![
                "Unknown".to_string(),
                "Desconocido".to_string(),
                String::new(),
            ],
            include_letter_places: true,
            visual: VisualOptions::default(),
            filters: GraphFilters::default(),
            aliases: AliasMap::default(),
        }
    }
}

impl GraphConfig {
    /// Structure only: no time colors, no place/origin mentions
    pub fn minimal() -> Self {
        Self {
            include_letter_places: false,
            visual: VisualOptions {
                color_by_time: false,
                size_by_activity: false,
            },
            ..Default::default()
        }
    }

    pub fn with_aliases(mut self, aliases: AliasMap) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn is_unknown(&self, name: &str) -> bool {
        let name = name.trim();
        self.unknown_names
            .iter()
            .any(|u| u.trim().eq_ignore_ascii_case(name))
    }

    /// Alias-normalized name, or `None` for unknown sentinels
    pub fn resolve_person(&self, name: &str) -> Option<String> {
        if self.is_unknown(name) {
            return None;
        }
        Some(self.aliases.normalize(name)).filter(|n| !n.is_empty())
    }

    /// Trimmed entity name, or `None` for unknown sentinels
    pub fn resolve_entity(&self, name: &str) -> Option<String> {
        if self.is_unknown(name) {
            return None;
        }
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Some(name).filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::AliasEntry;

    #[test]
    fn test_unknown_sentinels() {
        let config = GraphConfig::default();
        assert!(config.is_unknown("unknown"));
        assert!(config.is_unknown(" Desconocido "));
        assert!(config.is_unknown(""));
        assert!(!config.is_unknown("Jo"));
        assert_eq!(config.resolve_person("   "), None);
    }

    #[test]
    fn test_resolve_person_applies_aliases() {
        let config = GraphConfig::default()
            .with_aliases(AliasMap::new(vec![AliasEntry::new("Theo van Gogh", ["Theo"])]));
        assert_eq!(config.resolve_person("Theo").as_deref(), Some("Theo van Gogh"));
        assert_eq!(config.resolve_entity(" Saint  Rémy ").as_deref(), Some("Saint Rémy"));
    }
}
