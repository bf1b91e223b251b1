//! Merging of per-token classifier output into whole entity names.
//!
//! A token joins the span being built when it carries the same base label
//! and is either an explicit inside tag (`I-`) or a `##` subword fragment.
//! Subwords glue on without a space; whole words are joined with one.
//! Anything else closes the open span and starts a new one.

use crate::config::ExtractorConfig;
use crate::types::{EntityMention, ExtractedEntities, TaggedToken};
use biograph_protocol::EntityCategory;
use once_cell::sync::Lazy;
use regex::Regex;

static NO_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\p{L}]+$").expect("no-letter regex"));

const NOISE_CHARS: &[char] = &['#', '@', '$', '%', '^', '&', '*', '(', ')'];

struct OpenSpan {
    text: String,
    label: String,
    score: f32,
}

impl OpenSpan {
    fn start(token: &TaggedToken) -> Self {
        Self {
            text: token.clean_word().to_string(),
            label: token.base_label().to_string(),
            score: token.score,
        }
    }

    fn accepts(&self, token: &TaggedToken) -> bool {
        self.label == token.base_label() && (token.is_continuation() || token.is_subword())
    }

    fn extend(&mut self, token: &TaggedToken) {
        if !token.is_subword() {
            self.text.push(' ');
        }
        self.text.push_str(token.clean_word());
        self.score = self.score.max(token.score);
    }

    fn close(self) -> Option<EntityMention> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(EntityMention {
            text: text.to_string(),
            category: EntityCategory::from_label(&self.label)?,
            score: self.score,
        })
    }
}

/// Merge tagged tokens into entity spans.
///
/// Tokens below `threshold` are skipped without closing the open span.
/// Spans whose label is not a known category (e.g. `O`) are discarded.
pub fn merge_tokens(tokens: &[TaggedToken], threshold: f32) -> Vec<EntityMention> {
    let mut mentions = Vec::new();
    let mut open: Option<OpenSpan> = None;

    for token in tokens {
        if token.score < threshold {
            continue;
        }

        match open.as_mut() {
            Some(span) if span.accepts(token) => span.extend(token),
            _ => {
                if let Some(span) = open.replace(OpenSpan::start(token)) {
                    mentions.extend(span.close());
                }
            }
        }
    }

    if let Some(span) = open {
        mentions.extend(span.close());
    }

    mentions
}

/// Whether a finished span is plausible as a name of its category
pub fn accept_mention(mention: &EntityMention, config: &ExtractorConfig) -> bool {
    let text = mention.text.trim();
    let text = text.strip_prefix("##").unwrap_or(text).trim();
    if text.is_empty() || config.is_common_word(text) {
        return false;
    }
    if NO_LETTERS.is_match(text) || text.contains(NOISE_CHARS) {
        return false;
    }

    let len = text.chars().count();
    let upper_initial = text.chars().next().is_some_and(char::is_uppercase);
    match mention.category {
        EntityCategory::Person => upper_initial || len >= 3,
        EntityCategory::Place => upper_initial && len >= 2,
        EntityCategory::Organization => len >= 2,
        EntityCategory::Miscellaneous => false,
    }
}

/// Reassemble tokens into per-category name lists, applying the span filters
pub fn reassemble(tokens: &[TaggedToken], config: &ExtractorConfig) -> ExtractedEntities {
    let mut entities = ExtractedEntities::new();
    for mention in merge_tokens(tokens, config.confidence_threshold) {
        if !accept_mention(&mention, config) {
            log::trace!("Dropping span {:?} ({})", mention.text, mention.category.as_str());
            continue;
        }
        let text = mention.text.strip_prefix("##").unwrap_or(&mention.text);
        entities.insert(mention.category, text);
    }
    entities
}
