use serde::{Deserialize, Serialize};

/// Configuration for token reassembly and name cleanup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Tokens scoring below this are ignored during reassembly
    pub confidence_threshold: f32,

    /// Only this many leading characters of a text are classified
    pub max_text_chars: usize,

    /// Minimum length for an organization name to survive cleanup
    pub min_organization_len: usize,

    /// Function words never kept as an entity on their own
    pub common_words: Vec<String>,

    /// Honorifics, particles and tagger noise removed after cleanup
    pub blocklist: Vec<String>,
}

const DEFAULT_COMMON_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "for", "on", "at", "by", "with", "is", "was",
    "are", "be", "been", "as", "it", "from",
];

const DEFAULT_BLOCKLIST: &[&str] = &[
    "your honour",
    "your honor",
    "revue ine",
    "independent",
    "dr",
    "mr",
    "mrs",
    "ms",
    "sir",
    "madam",
    "the",
    "a",
    "an",
    "and",
    "or",
    "of",
    "to",
    "in",
    "v",
    "van",
    "de",
    "du",
    "la",
    "le",
];

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            max_text_chars: 2000,
            min_organization_len: 3,
            common_words: DEFAULT_COMMON_WORDS.iter().map(|w| w.to_string()).collect(),
            blocklist: DEFAULT_BLOCKLIST.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ExtractorConfig {
    /// Defaults overridden by `BIOGRAPH_NER_CONFIDENCE` and `BIOGRAPH_NER_MAX_CHARS`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(threshold) = env_parse::<f32>("BIOGRAPH_NER_CONFIDENCE") {
            config.confidence_threshold = threshold;
        }
        if let Some(max_chars) = env_parse::<usize>("BIOGRAPH_NER_MAX_CHARS") {
            config.max_text_chars = max_chars;
        }
        config
    }

    /// Keep every confident span (useful when the tagger is already filtered)
    pub fn permissive() -> Self {
        Self {
            confidence_threshold: 0.0,
            blocklist: Vec::new(),
            ..Default::default()
        }
    }

    pub fn is_common_word(&self, word: &str) -> bool {
        let lower = word.trim().to_lowercase();
        self.common_words.iter().any(|w| *w == lower)
    }

    pub fn is_blocked(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.blocklist.iter().any(|w| w.to_lowercase() == lower)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold ({}) must be within 0.0..=1.0",
                self.confidence_threshold
            ));
        }

        if self.max_text_chars == 0 {
            return Err("max_text_chars must be > 0".to_string());
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {key}={raw}");
            None
        }
    }
}
