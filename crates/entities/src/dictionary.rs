//! Curated entity dictionaries.
//!
//! A dictionary is a named TOML file with `people`, `places` and
//! `organizations` lists. It is used two ways: to snap tagger output onto
//! canonical spellings, and to find known names the tagger missed.

use crate::error::{EntityError, Result};
use crate::types::ExtractedEntities;
use biograph_protocol::EntityCategory;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const BUILTIN_VANGOGH: &str = include_str!("../dictionaries/vangogh.toml");

/// Shortest name variant searched for in free text
const MIN_VARIANT_LEN: usize = 3;

/// Raw dictionary contents as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDictionary {
    pub name: String,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
}

impl EntityDictionary {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let dictionary: Self =
            toml::from_str(source).map_err(|e| EntityError::dictionary("<inline>", e))?;
        if dictionary.name.trim().is_empty() {
            return Err(EntityError::dictionary("<inline>", "missing name"));
        }
        Ok(dictionary)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EntityError::dictionary(path.display().to_string(), e))?;
        Self::from_toml_str(&source).map_err(|e| match e {
            EntityError::Dictionary { reason, .. } => {
                EntityError::dictionary(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Dictionary shipped with the crate
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "vangogh" => Self::from_toml_str(BUILTIN_VANGOGH).ok(),
            _ => None,
        }
    }

    pub fn entries(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::Person => &self.people,
            EntityCategory::Place => &self.places,
            EntityCategory::Organization => &self.organizations,
            EntityCategory::Miscellaneous => &[],
        }
    }

    /// Snap a detected name onto its canonical dictionary spelling.
    ///
    /// Exact case-insensitive matches win. Otherwise the first entry that
    /// contains the name, or is contained in it, is used; the contained side
    /// must be at least three characters. Names shorter than two characters
    /// yield `None`; names with no match come back unchanged.
    pub fn normalize(&self, entity: &str, category: EntityCategory) -> Option<String> {
        let lower = entity.trim().to_lowercase();
        if lower.chars().count() < 2 {
            return None;
        }

        let entries = self.entries(category);
        if let Some(exact) = entries.iter().find(|item| item.to_lowercase() == lower) {
            return Some(exact.clone());
        }

        let containing = entries.iter().find(|item| {
            let item_lower = item.to_lowercase();
            let (inner, outer) = if item_lower.len() >= lower.len() {
                (&lower, &item_lower)
            } else {
                (&item_lower, &lower)
            };
            inner.chars().count() >= MIN_VARIANT_LEN && outer.contains(inner.as_str())
        });

        Some(containing.cloned().unwrap_or_else(|| entity.trim().to_string()))
    }

    pub fn compile(self) -> Result<CompiledDictionary> {
        CompiledDictionary::new(self)
    }
}

struct KnownEntry {
    canonical: String,
    patterns: Vec<Regex>,
}

impl KnownEntry {
    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Dictionary with its text-search patterns built
pub struct CompiledDictionary {
    dictionary: EntityDictionary,
    people: Vec<KnownEntry>,
    places: Vec<KnownEntry>,
    organizations: Vec<KnownEntry>,
}

impl std::fmt::Debug for CompiledDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledDictionary")
            .field("name", &self.dictionary.name)
            .field("people", &self.people.len())
            .field("places", &self.places.len())
            .field("organizations", &self.organizations.len())
            .finish()
    }
}

impl CompiledDictionary {
    fn new(dictionary: EntityDictionary) -> Result<Self> {
        let name = dictionary.name.clone();
        let build = |names: &[String], variants: fn(&str) -> Vec<String>| -> Result<Vec<KnownEntry>> {
            names
                .iter()
                .map(|canonical| {
                    let patterns = variants(canonical)
                        .iter()
                        .filter(|v| v.chars().count() >= MIN_VARIANT_LEN)
                        .map(|v| word_pattern(v))
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(|e| EntityError::dictionary(&name, e))?;
                    Ok(KnownEntry {
                        canonical: canonical.clone(),
                        patterns,
                    })
                })
                .collect()
        };

        Ok(Self {
            people: build(&dictionary.people, person_variants)?,
            places: build(&dictionary.places, |s| vec![s.to_string()])?,
            organizations: build(&dictionary.organizations, |s| vec![s.to_string()])?,
            dictionary,
        })
    }

    pub fn name(&self) -> &str {
        &self.dictionary.name
    }

    pub fn dictionary(&self) -> &EntityDictionary {
        &self.dictionary
    }

    /// Known entities appearing in `text` as whole words
    pub fn find_known(&self, text: &str) -> ExtractedEntities {
        let mut found = ExtractedEntities::new();
        if text.trim().is_empty() {
            return found;
        }
        for (category, entries) in [
            (EntityCategory::Person, &self.people),
            (EntityCategory::Place, &self.places),
            (EntityCategory::Organization, &self.organizations),
        ] {
            for entry in entries.iter().filter(|e| e.matches(text)) {
                found.insert(category, entry.canonical.clone());
            }
        }
        found
    }

    /// Normalize tagger output and union it with dictionary hits in `text`
    pub fn augment(&self, detected: ExtractedEntities, text: &str) -> ExtractedEntities {
        let normalized = detected.map_categories(|category, names| {
            names
                .iter()
                .filter_map(|name| self.dictionary.normalize(name, category))
                .collect()
        });
        normalized.merge(self.find_known(text))
    }
}

/// Full name, plus last and first word for multi-word names.
/// Abbreviated titles such as `Dr.` are not searched for alone.
fn person_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() > 1 {
        for part in [parts[parts.len() - 1], parts[0]] {
            if !part.ends_with('.') && !variants.iter().any(|v| v == part) {
                variants.push(part.to_string());
            }
        }
    }
    variants
}

/// Case-insensitive whole-word pattern; `\b` is only anchored on word characters
fn word_pattern(literal: &str) -> std::result::Result<Regex, regex::Error> {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let start = if is_word(literal.chars().next()) { r"\b" } else { "" };
    let end = if is_word(literal.chars().last()) { r"\b" } else { "" };
    Regex::new(&format!("(?i){start}{}{end}", regex::escape(literal)))
}

/// Named dictionaries available to the extractor
#[derive(Debug, Clone, Default)]
pub struct DictionaryRegistry {
    dictionaries: HashMap<String, Arc<CompiledDictionary>>,
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled dictionaries
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        match EntityDictionary::builtin("vangogh").map(EntityDictionary::compile) {
            Some(Ok(compiled)) => registry.insert(compiled),
            Some(Err(e)) => log::warn!("Bundled dictionary failed to compile: {e}"),
            None => log::warn!("Bundled dictionary failed to parse"),
        }
        registry
    }

    pub fn insert(&mut self, dictionary: CompiledDictionary) {
        self.dictionaries
            .insert(dictionary.name().to_string(), Arc::new(dictionary));
    }

    /// Load and register a dictionary file, returning its name
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let compiled = EntityDictionary::load(path)?.compile()?;
        let name = compiled.name().to_string();
        self.insert(compiled);
        Ok(name)
    }

    /// Register every `*.toml` in a directory. Unreadable files are logged
    /// and skipped; returns how many loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            match self.load_file(&path) {
                Ok(name) => {
                    log::debug!("Loaded dictionary '{name}' from {}", path.display());
                    loaded += 1;
                }
                Err(e) => log::warn!("Skipping dictionary {}: {e}", path.display()),
            }
        }
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<Arc<CompiledDictionary>> {
        self.dictionaries.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dictionaries.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vangogh() -> CompiledDictionary {
        EntityDictionary::builtin("vangogh")
            .unwrap()
            .compile()
            .unwrap()
    }

    #[test]
    fn test_builtin_parses() {
        let dict = EntityDictionary::builtin("vangogh").unwrap();
        assert_eq!(dict.name, "vangogh");
        assert!(dict.people.contains(&"Paul Gauguin".to_string()));
        assert!(dict.places.contains(&"Arles".to_string()));
        assert!(EntityDictionary::builtin("unknown").is_none());
    }

    #[test]
    fn test_normalize() {
        let dict = EntityDictionary::builtin("vangogh").unwrap();
        assert_eq!(
            dict.normalize("paul gauguin", EntityCategory::Person),
            Some("Paul Gauguin".into())
        );
        assert_eq!(
            dict.normalize("Gau", EntityCategory::Person),
            Some("Paul Gauguin".into())
        );
        assert_eq!(
            dict.normalize("Unknown Painter", EntityCategory::Person),
            Some("Unknown Painter".into())
        );
        assert_eq!(dict.normalize("X", EntityCategory::Person), None);
    }

    #[test]
    fn test_find_known_uses_word_boundaries() {
        let dict = vangogh();
        let found = dict.find_known("I went to Arles with Gauguin and sold a piece to Goupil.");
        assert_eq!(found.places, vec!["Arles"]);
        assert!(found.people.contains(&"Paul Gauguin".to_string()));
        assert!(found.people.contains(&"Gauguin".to_string()));
        assert_eq!(found.organizations, vec!["Goupil"]);

        let none = dict.find_known("Parisian gossip from Arlesienne friends");
        assert!(none.places.is_empty());
    }

    #[test]
    fn test_titles_not_searched_alone() {
        let dict = vangogh();
        let found = dict.find_known("Dr. Smith came by.");
        assert!(found.people.is_empty());
    }

    #[test]
    fn test_punctuated_names_match() {
        let dict = vangogh();
        let found = dict.find_known("Letter from Goupil & Cie about prices");
        assert!(found.organizations.contains(&"Goupil & Cie".to_string()));
    }

    #[test]
    fn test_augment_unions() {
        let dict = vangogh();
        let detected = ExtractedEntities {
            people: vec!["Rappar".into()],
            places: vec!["Nowhere".into()],
            ..Default::default()
        };
        let out = dict.augment(detected, "News from Nuenen");
        assert_eq!(out.people, vec!["Anthon van Rappard"]);
        assert_eq!(out.places, vec!["Nowhere", "Nuenen"]);
    }

    #[test]
    fn test_registry_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("family.toml"),
            "name = \"family\"\npeople = [\"Ada Lovelace\"]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "people = 3").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = DictionaryRegistry::with_builtins();
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);
        assert_eq!(registry.names(), vec!["family", "vangogh"]);
        let family = registry.get("family").unwrap();
        assert_eq!(family.find_known("ada lovelace wrote").people, vec!["Ada Lovelace"]);
    }
}
