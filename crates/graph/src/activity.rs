use crate::config::GraphConfig;
use crate::types::{node_id, NodeKind};
use biograph_protocol::{try_parse_date, EntityCategory, Letter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Span of letter dates in a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Range over readable letter dates; unreadable dates are left out
    pub fn from_letters(letters: &[Letter]) -> Option<Self> {
        letters
            .iter()
            .filter_map(|l| try_parse_date(&l.date))
            .fold(None, |range: Option<Self>, d| match range {
                Some(r) => Some(Self::new(r.min.min(d), r.max.max(d))),
                None => Some(Self::new(d, d)),
            })
    }

    pub fn span_days(&self) -> i64 {
        (self.max - self.min).num_days()
    }

    /// Position of `date` within the range, clamped to 0.0..=1.0;
    /// `None` for a single-day range
    pub fn progress(&self, date: NaiveDate) -> Option<f64> {
        let span = self.span_days();
        if span == 0 {
            return None;
        }
        let offset = (date - self.min).num_days() as f64;
        Some((offset / span as f64).clamp(0.0, 1.0))
    }
}

/// Most frequent sender/recipient after alias normalization.
///
/// Unknown sentinels are ignored; ties go to the name seen first.
pub fn detect_central_person(letters: &[Letter], config: &GraphConfig) -> Option<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for letter in letters {
        for raw in [&letter.sender, &letter.recipient] {
            let Some(name) = config.resolve_person(raw) else {
                continue;
            };
            let count = counts.entry(name.clone()).or_insert(0);
            if *count == 0 {
                order.push(name);
            }
            *count += 1;
        }
    }

    let mut best: Option<(&String, usize)> = None;
    for name in &order {
        let count = counts.get(name).copied().unwrap_or(0);
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.clone())
}

/// Per-node activity: letters sent or received by a person, or times an
/// entity was mentioned. Keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    counts: HashMap<String, usize>,
}

impl ActivityCounts {
    pub fn from_letters(letters: &[Letter], config: &GraphConfig) -> Self {
        let mut activity = Self::default();
        for letter in letters {
            let sender = config.resolve_person(&letter.sender);
            let recipient = config.resolve_person(&letter.recipient);
            for name in [&sender, &recipient].into_iter().flatten() {
                activity.bump(node_id(NodeKind::Person, name));
            }

            for (kind, names) in mention_lists(letter, config) {
                for name in names {
                    activity.bump(node_id(kind, &name));
                }
            }
        }
        activity
    }

    fn bump(&mut self, id: String) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    pub fn get(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Deduplicated, normalized mention names of a letter per node kind.
/// Origin and destination count as place mentions when configured.
pub(crate) fn mention_lists(letter: &Letter, config: &GraphConfig) -> Vec<(NodeKind, Vec<String>)> {
    let mut out = Vec::with_capacity(3);
    for category in [
        EntityCategory::Person,
        EntityCategory::Place,
        EntityCategory::Organization,
    ] {
        let Some(kind) = NodeKind::from_category(category) else {
            continue;
        };
        let mut raw: Vec<&str> = Vec::new();
        if category == EntityCategory::Place && config.include_letter_places {
            raw.push(&letter.place_from);
            raw.push(&letter.place_to);
        }
        raw.extend(letter.mentions(category).iter().map(String::as_str));

        let mut names: Vec<String> = Vec::new();
        for name in raw {
            let resolved = if kind == NodeKind::Person {
                config.resolve_person(name)
            } else {
                config.resolve_entity(name)
            };
            if let Some(name) = resolved {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        out.push((kind, names));
    }
    out
}

/// Mean of the readable dates, if any
pub(crate) fn mean_date(dates: &[NaiveDate]) -> Option<NaiveDate> {
    let first = *dates.first()?;
    let total: i64 = dates.iter().map(|d| (*d - first).num_days()).sum();
    Some(first + chrono::Duration::days(total / dates.len() as i64))
}
