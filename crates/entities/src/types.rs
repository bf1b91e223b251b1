use biograph_protocol::EntityCategory;
use serde::{Deserialize, Serialize};

/// Marker a WordPiece tagger puts on continuation fragments
pub const SUBWORD_MARKER: &str = "##";

/// One token as emitted by a sequence classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Token text; continuation fragments start with `##`
    #[serde(alias = "text")]
    pub word: String,

    /// BIO label such as `B-PER`, `I-LOC` or plain `ORG`
    #[serde(alias = "entity")]
    pub label: String,

    /// Classifier confidence (0.0 - 1.0)
    #[serde(default)]
    pub score: f32,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            label: label.into(),
            score,
        }
    }

    /// Label with any `B-`/`I-` prefix removed
    pub fn base_label(&self) -> &str {
        self.label
            .strip_prefix("B-")
            .or_else(|| self.label.strip_prefix("I-"))
            .unwrap_or(&self.label)
    }

    /// Explicit inside-entity tag
    pub fn is_continuation(&self) -> bool {
        self.label.starts_with("I-")
    }

    /// Subword fragment that glues onto the previous token
    pub fn is_subword(&self) -> bool {
        self.word.starts_with(SUBWORD_MARKER)
    }

    /// Word without the subword marker
    pub fn clean_word(&self) -> &str {
        self.word
            .strip_prefix(SUBWORD_MARKER)
            .unwrap_or(&self.word)
    }
}

/// A reassembled entity span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub category: EntityCategory,
    /// Highest token confidence within the span
    pub score: f32,
}

/// Deduplicated entity names per category, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
}

impl ExtractedEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.places.is_empty() && self.organizations.is_empty()
    }

    pub fn total(&self) -> usize {
        self.people.len() + self.places.len() + self.organizations.len()
    }

    /// Names for a category; `Miscellaneous` is never collected
    pub fn get(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::Person => &self.people,
            EntityCategory::Place => &self.places,
            EntityCategory::Organization => &self.organizations,
            EntityCategory::Miscellaneous => &[],
        }
    }

    pub fn get_mut(&mut self, category: EntityCategory) -> Option<&mut Vec<String>> {
        match category {
            EntityCategory::Person => Some(&mut self.people),
            EntityCategory::Place => Some(&mut self.places),
            EntityCategory::Organization => Some(&mut self.organizations),
            EntityCategory::Miscellaneous => None,
        }
    }

    /// Insert a name unless it is blank or already present
    pub fn insert(&mut self, category: EntityCategory, name: impl Into<String>) -> bool {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.get_mut(category) {
            Some(list) if !list.iter().any(|existing| existing == name) => {
                list.push(name.to_string());
                true
            }
            _ => false,
        }
    }

    /// Union with another result; names already present keep their position
    pub fn merge(mut self, other: ExtractedEntities) -> Self {
        for (category, names) in other.into_categories() {
            for name in names {
                self.insert(category, name);
            }
        }
        self
    }

    pub fn into_categories(self) -> [(EntityCategory, Vec<String>); 3] {
        [
            (EntityCategory::Person, self.people),
            (EntityCategory::Place, self.places),
            (EntityCategory::Organization, self.organizations),
        ]
    }

    /// Rebuild each category list through `f`
    pub fn map_categories(self, mut f: impl FnMut(EntityCategory, Vec<String>) -> Vec<String>) -> Self {
        let mut out = ExtractedEntities::new();
        for (category, names) in self.into_categories() {
            for name in f(category, names) {
                out.insert(category, name);
            }
        }
        out
    }
}
