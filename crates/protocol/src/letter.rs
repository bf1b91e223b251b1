use crate::date::parse_letter_date;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Category of a named entity mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Person,
    Place,
    Organization,
    Miscellaneous,
}

impl EntityCategory {
    /// Map a tagger label base (`PER`, `LOC`, `ORG`, `MISC`) to a category
    pub fn from_label(base: &str) -> Option<Self> {
        match base.trim().to_ascii_uppercase().as_str() {
            "PER" | "PERSON" => Some(Self::Person),
            "LOC" | "LOCATION" => Some(Self::Place),
            "ORG" | "ORGANIZATION" => Some(Self::Organization),
            "MISC" => Some(Self::Miscellaneous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Organization => "organization",
            Self::Miscellaneous => "miscellaneous",
        }
    }
}

/// A correspondence record.
///
/// Mention lists never contain empty or duplicate strings; deserialization
/// and [`Letter::add_mentions`] both enforce this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    /// Source file name or row label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Raw date text as ingested
    #[serde(default)]
    pub date: String,

    #[serde(default, alias = "personFrom", alias = "person_from")]
    pub sender: String,

    #[serde(default, alias = "personTo", alias = "person_to")]
    pub recipient: String,

    #[serde(default, alias = "place_from")]
    pub place_from: String,

    #[serde(default, alias = "place_to")]
    pub place_to: String,

    #[serde(default)]
    pub content: String,

    #[serde(
        default,
        alias = "mentioned_people",
        deserialize_with = "deserialize_mentions",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mentioned_people: Vec<String>,

    #[serde(
        default,
        alias = "mentioned_places",
        deserialize_with = "deserialize_mentions",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mentioned_places: Vec<String>,

    #[serde(
        default,
        alias = "mentioned_organizations",
        deserialize_with = "deserialize_mentions",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mentioned_organizations: Vec<String>,

    #[serde(
        default,
        alias = "mentioned_events",
        deserialize_with = "deserialize_mentions",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mentioned_events: Vec<String>,
}

impl Letter {
    pub fn new(
        date: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_places(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.place_from = from.into();
        self.place_to = to.into();
        self
    }

    pub fn with_mentions<I, S>(mut self, category: EntityCategory, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_mentions(category, names);
        self
    }

    /// Calendar date, or the sentinel date when unreadable
    pub fn parsed_date(&self) -> NaiveDate {
        parse_letter_date(&self.date)
    }

    /// Mention list for a category (`Miscellaneous` maps to events)
    pub fn mentions(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::Person => &self.mentioned_people,
            EntityCategory::Place => &self.mentioned_places,
            EntityCategory::Organization => &self.mentioned_organizations,
            EntityCategory::Miscellaneous => &self.mentioned_events,
        }
    }

    fn mentions_mut(&mut self, category: EntityCategory) -> &mut Vec<String> {
        match category {
            EntityCategory::Person => &mut self.mentioned_people,
            EntityCategory::Place => &mut self.mentioned_places,
            EntityCategory::Organization => &mut self.mentioned_organizations,
            EntityCategory::Miscellaneous => &mut self.mentioned_events,
        }
    }

    /// Append names to a mention list, skipping blanks and names already present.
    /// Returns how many were added.
    pub fn add_mentions<I, S>(&mut self, category: EntityCategory, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.mentions_mut(category);
        let mut seen: HashSet<String> = list.iter().cloned().collect();
        let mut added = 0;
        for name in names {
            let name = name.into().trim().to_string();
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            list.push(name);
            added += 1;
        }
        added
    }

    /// Total number of mentions across all categories
    pub fn mention_count(&self) -> usize {
        self.mentioned_people.len()
            + self.mentioned_places.len()
            + self.mentioned_organizations.len()
            + self.mentioned_events.len()
    }
}

fn deserialize_mentions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(dedup_names(raw.unwrap_or_default()))
}

/// Trim, drop blanks, and remove duplicates while keeping first-seen order
pub fn dedup_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.into().trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_from_label() {
        assert_eq!(EntityCategory::from_label("PER"), Some(EntityCategory::Person));
        assert_eq!(EntityCategory::from_label("loc"), Some(EntityCategory::Place));
        assert_eq!(EntityCategory::from_label("ORG"), Some(EntityCategory::Organization));
        assert_eq!(EntityCategory::from_label("MISC"), Some(EntityCategory::Miscellaneous));
        assert_eq!(EntityCategory::from_label("DATE"), None);
    }

    #[test]
    fn test_add_mentions_keeps_invariant() {
        let mut letter = Letter::new("1888-05-01", "Jo", "Vincent");
        let added = letter.add_mentions(EntityCategory::Place, ["Paris", " Paris ", "", "Arles"]);
        assert_eq!(added, 2);
        assert_eq!(letter.mentioned_places, vec!["Paris", "Arles"]);

        let added = letter.add_mentions(EntityCategory::Place, ["Arles"]);
        assert_eq!(added, 0);
    }

    #[test]
    fn test_deserialize_dedups_mentions() {
        let json = r#"{
            "date": "1888-05-01",
            "personFrom": "Jo",
            "personTo": "Vincent",
            "mentionedPlaces": ["Paris", "Paris", "  "],
            "mentioned_people": ["Theo"]
        }"#;
        let letter: Letter = serde_json::from_str(json).unwrap();
        assert_eq!(letter.sender, "Jo");
        assert_eq!(letter.recipient, "Vincent");
        assert_eq!(letter.mentioned_places, vec!["Paris"]);
        assert_eq!(letter.mentioned_people, vec!["Theo"]);
        assert!(letter.mentioned_organizations.is_empty());
    }

    #[test]
    fn test_null_mentions_deserialize_empty() {
        let letter: Letter =
            serde_json::from_str(r#"{"sender": "Jo", "mentionedPeople": null}"#).unwrap();
        assert!(letter.mentioned_people.is_empty());
    }
}
