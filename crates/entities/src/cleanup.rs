//! Name cleanup: splitting run-together names and dropping fragments that
//! a longer name in the same set already covers.

use crate::config::ExtractorConfig;
use crate::types::ExtractedEntities;
use biograph_protocol::EntityCategory;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Two capitalised runs with no space between them, e.g. `VincentTheo`
static STUCK_NAMES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Lu}\p{Ll}+)(\p{Lu}\p{Ll}*)").expect("stuck-name regex"));

static TWO_LETTER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}$").expect("two-letter regex"));

const STUCK_MIN_LEN: usize = 10;
const STUCK_PART_MIN_LEN: usize = 3;
const MAX_EDIT_DISTANCE: usize = 2;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split names the tagger glued together (`VincentTheo` → `Vincent`, `Theo`).
///
/// Only names longer than ten characters are considered; parts shorter than
/// three characters are dropped. Output is deduplicated in first-seen order.
pub fn split_stuck_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |name: &str| {
        if seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    };

    for name in names {
        let name = name.as_ref();
        let mut matches = STUCK_NAMES.captures_iter(name).peekable();
        if matches.peek().is_some() && char_len(name) > STUCK_MIN_LEN {
            for caps in matches {
                for part in [&caps[1], &caps[2]] {
                    if char_len(part) >= STUCK_PART_MIN_LEN {
                        push(part);
                    }
                }
            }
        } else {
            push(name);
        }
    }
    out
}

/// Whether `short` looks like a partial or misspelled form of `long`.
///
/// Comparison is case-insensitive; identical strings are never fragments.
pub fn is_fragment_of(short: &str, long: &str) -> bool {
    let short = short.trim().to_lowercase();
    let long = long.trim().to_lowercase();
    if short == long {
        return false;
    }

    if long.contains(&short) || long.starts_with(&short) || short.starts_with(&long) {
        return true;
    }

    let short_chars: Vec<char> = short.chars().collect();
    let long_chars: Vec<char> = long.chars().collect();
    let len_diff = short_chars.len().abs_diff(long_chars.len());
    if len_diff <= MAX_EDIT_DISTANCE {
        let positional = short_chars
            .iter()
            .zip(long_chars.iter())
            .filter(|(a, b)| a != b)
            .count();
        if positional + len_diff <= MAX_EDIT_DISTANCE {
            return true;
        }
    }

    let prefix_len = STUCK_PART_MIN_LEN.max(short_chars.len().saturating_sub(2));
    let prefix: String = short_chars.iter().take(prefix_len).collect();
    long.contains(&prefix)
}

/// Drop every name that is a fragment of some strictly longer name in the set.
///
/// Runs [`split_stuck_names`] first. One-character names, and two-character
/// names not shaped like `Jo`, are dropped outright. Idempotent.
pub fn clean_fragments<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let separated = split_stuck_names(names);

    separated
        .iter()
        .filter(|name| {
            let len = char_len(name);
            if len <= 1 || (len == 2 && !TWO_LETTER_NAME.is_match(name)) {
                return false;
            }
            !separated
                .iter()
                .any(|other| char_len(other) > len && is_fragment_of(name, other))
        })
        .cloned()
        .collect()
}

/// Full post-extraction cleanup: fragment removal then blocklist
pub fn clean_entities(entities: ExtractedEntities, config: &ExtractorConfig) -> ExtractedEntities {
    entities.map_categories(|category, names| {
        clean_fragments(&names)
            .into_iter()
            .filter(|name| !config.is_blocked(name))
            .filter(|name| {
                category != EntityCategory::Organization
                    || char_len(name) >= config.min_organization_len
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_stuck_names() {
        let split = split_stuck_names(&["VincentTheodorus", "Paul Gauguin", "JoBo"]);
        assert_eq!(split, vec!["Vincent", "Theodorus", "Paul Gauguin", "JoBo"]);
    }

    #[test]
    fn test_split_drops_short_parts() {
        assert_eq!(split_stuck_names(&["MonsieurDeLa"]), vec!["Monsieur"]);
    }

    #[test]
    fn test_fragment_rules() {
        assert!(is_fragment_of("Gau", "Gauguin"));
        assert!(is_fragment_of("gauguin", "Paul Gauguin"));
        assert!(is_fragment_of("Gaugin", "Gauguin"));
        assert!(is_fragment_of("Rappar", "Rappard"));
        assert!(!is_fragment_of("Paris", "paris"));
        assert!(!is_fragment_of("Arles", "Nuenen"));
        assert!(!is_fragment_of("Theo", "Paul Gauguin"));
    }

    #[test]
    fn test_clean_fragments_keeps_longest() {
        let cleaned = clean_fragments(&["Gau", "Gauguin", "Paul Gauguin"]);
        assert_eq!(cleaned, vec!["Paul Gauguin"]);
    }

    #[test]
    fn test_clean_fragments_short_names() {
        let cleaned = clean_fragments(&["J", "Jo", "jo", "Arles"]);
        assert_eq!(cleaned, vec!["Jo", "Arles"]);
    }

    #[test]
    fn test_clean_entities_blocklist() {
        let config = ExtractorConfig::default();
        let entities = ExtractedEntities {
            people: vec!["Mr".into(), "Theo".into(), "Your Honour".into()],
            places: vec!["Arles".into()],
            organizations: vec!["Goupil".into(), "GC".into()],
        };
        let cleaned = clean_entities(entities, &config);
        assert_eq!(cleaned.people, vec!["Theo"]);
        assert_eq!(cleaned.places, vec!["Arles"]);
        assert_eq!(cleaned.organizations, vec!["Goupil"]);
    }
}
