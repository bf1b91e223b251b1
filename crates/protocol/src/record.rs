use crate::letter::Letter;
use serde::{Deserialize, Serialize};

/// Basic facts about the biography subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiographyBasics {
    pub first_name: String,
    pub last_name: String,
    pub birth_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub short_bio: String,
}

impl BiographyBasics {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoCategory {
    Family,
    Education,
    Travel,
    Work,
    Achievement,
    #[default]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub category: PhotoCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub destination: String,
    #[serde(default)]
    pub country: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companions: Option<String>,
}

/// Everything archived for one biography.
///
/// Graph building treats a record as read-only input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiographyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basics: Option<BiographyBasics>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub letters: Vec<Letter>,
    #[serde(default)]
    pub trips: Vec<Trip>,
}

impl BiographyRecord {
    pub fn with_letters(letters: Vec<Letter>) -> Self {
        Self {
            letters,
            ..Default::default()
        }
    }

    /// Subject name from the basics, if filled in
    pub fn subject_name(&self) -> Option<String> {
        self.basics
            .as_ref()
            .map(BiographyBasics::full_name)
            .filter(|name| !name.is_empty())
    }
}
