use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One real person (or place) and the spellings that refer to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub canonical: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl AliasEntry {
    pub fn new<I, S>(canonical: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-corpus map from name variants to canonical labels.
///
/// Matching is exact on a case-folded, whitespace-collapsed key. A variant
/// claimed by two different canonicals is dropped and left unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AliasEntry>", into = "Vec<AliasEntry>")]
pub struct AliasMap {
    entries: Vec<AliasEntry>,
    lookup: HashMap<String, String>,
}

impl AliasMap {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        let mut lookup: HashMap<String, String> = HashMap::new();
        let mut ambiguous = Vec::new();

        for entry in &entries {
            let canonical = collapse_whitespace(&entry.canonical);
            if canonical.is_empty() {
                continue;
            }
            let keys = std::iter::once(entry.canonical.as_str())
                .chain(entry.variants.iter().map(String::as_str))
                .map(alias_key)
                .filter(|k| !k.is_empty());
            for key in keys {
                match lookup.get(&key) {
                    Some(existing) if *existing != canonical => ambiguous.push(key),
                    Some(_) => {}
                    None => {
                        lookup.insert(key, canonical.clone());
                    }
                }
            }
        }

        for key in ambiguous {
            log::debug!("Alias '{key}' maps to several names; leaving it unmapped");
            lookup.remove(&key);
        }

        Self { entries, lookup }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Canonical label for `name`, or `name` itself (whitespace-collapsed)
    pub fn normalize(&self, name: &str) -> String {
        self.lookup
            .get(&alias_key(name))
            .cloned()
            .unwrap_or_else(|| collapse_whitespace(name))
    }
}

impl From<Vec<AliasEntry>> for AliasMap {
    fn from(entries: Vec<AliasEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<AliasMap> for Vec<AliasEntry> {
    fn from(map: AliasMap) -> Self {
        map.entries
    }
}

fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn alias_key(name: &str) -> String {
    collapse_whitespace(name).to_lowercase()
}
