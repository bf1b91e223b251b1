//! # Biograph Entities
//!
//! Named-entity extraction for correspondence archives.
//!
//! ## Pipeline
//!
//! 1. A [`TokenClassifier`] tags the (truncated) letter text
//! 2. [`reassemble`] merges BIO-tagged subword tokens into names
//! 3. [`clean_entities`] drops fragments, run-together names and blocklisted words
//! 4. Optionally a [`CompiledDictionary`] snaps names onto canonical spellings
//!    and adds known names the tagger missed
//!
//! [`EntityExtractor`] ties these together behind a one-time model load and
//! never fails outward: extraction problems degrade to empty results.
//!
//! ## Example
//!
//! ```no_run
//! use biograph_entities::{EntityExtractor, ExtractOptions, ExtractorConfig, UnavailableLoader};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let extractor = EntityExtractor::new(
//!     ExtractorConfig::default(),
//!     Arc::new(UnavailableLoader::new("no model")),
//! );
//! let found = extractor
//!     .extract_entities("Dear Theo, Arles is lovely.", &ExtractOptions::with_dictionary("vangogh"))
//!     .await;
//! println!("{} people", found.people.len());
//! # }
//! ```

mod classifier;
mod cleanup;
mod config;
mod dictionary;
mod error;
mod extractor;
mod reassembly;
mod types;

#[cfg(feature = "onnx")]
mod onnx;

pub use classifier::{
    ClassifierLoader, ReadyLoader, RecordedClassifier, TokenClassifier, UnavailableLoader,
};
pub use cleanup::{clean_entities, clean_fragments, is_fragment_of, split_stuck_names};
pub use config::ExtractorConfig;
pub use dictionary::{CompiledDictionary, DictionaryRegistry, EntityDictionary};
pub use error::{EntityError, Result};
pub use extractor::{BatchReport, CancelFlag, EntityExtractor, ExtractOptions};
pub use reassembly::{accept_mention, merge_tokens, reassemble};
pub use types::{EntityMention, ExtractedEntities, TaggedToken};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxConfig, OnnxLoader, OnnxTokenClassifier};
