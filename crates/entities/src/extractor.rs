use crate::classifier::{ClassifierLoader, TokenClassifier};
use crate::cleanup::clean_entities;
use crate::config::ExtractorConfig;
use crate::dictionary::DictionaryRegistry;
use crate::error::{EntityError, Result};
use crate::reassembly::reassemble;
use crate::types::ExtractedEntities;
use biograph_protocol::{EntityCategory, Letter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Per-call extraction options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Normalize against a dictionary and add its hits
    pub use_dictionary: bool,
    /// Dictionary to use; the extractor default when unset
    pub dictionary_name: Option<String>,
}

impl ExtractOptions {
    pub fn with_dictionary(name: impl Into<String>) -> Self {
        Self {
            use_dictionary: true,
            dictionary_name: Some(name.into()),
        }
    }
}

/// Shared flag for abandoning a batch between letters
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a batch enrichment run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    /// Letters the classifier was run on, successfully or not
    pub processed: usize,
    /// Letters left unchanged, including any skipped because the model
    /// was unavailable
    pub failed: usize,
    /// Mentions appended across all letters
    pub mentions_added: usize,
    pub cancelled: bool,
}

impl BatchReport {
    /// Every letter was run through the classifier without error
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed == 0 && self.processed == self.total
    }
}

/// Entity extraction service.
///
/// Owns the classifier lifecycle: the model is loaded once, on
/// [`initialize`](Self::initialize) or the first extraction. A failed load
/// leaves the service uninitialized so a later call can retry.
pub struct EntityExtractor {
    config: ExtractorConfig,
    loader: Arc<dyn ClassifierLoader>,
    classifier: OnceCell<Arc<dyn TokenClassifier>>,
    dictionaries: DictionaryRegistry,
    default_dictionary: Option<String>,
}

impl EntityExtractor {
    pub fn new(config: ExtractorConfig, loader: Arc<dyn ClassifierLoader>) -> Self {
        Self {
            config,
            loader,
            classifier: OnceCell::new(),
            dictionaries: DictionaryRegistry::with_builtins(),
            default_dictionary: None,
        }
    }

    pub fn with_dictionaries(mut self, dictionaries: DictionaryRegistry) -> Self {
        self.dictionaries = dictionaries;
        self
    }

    pub fn with_default_dictionary(mut self, name: impl Into<String>) -> Self {
        self.default_dictionary = Some(name.into());
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn dictionaries(&self) -> &DictionaryRegistry {
        &self.dictionaries
    }

    /// Load the classifier if it is not loaded yet
    pub async fn initialize(&self) -> Result<()> {
        self.classifier().await.map(|_| ())
    }

    pub fn is_ready(&self) -> bool {
        self.classifier.initialized()
    }

    async fn classifier(&self) -> Result<&Arc<dyn TokenClassifier>> {
        self.classifier
            .get_or_try_init(|| async {
                match self.loader.load().await {
                    Ok(classifier) => {
                        log::info!("Entity classifier loaded");
                        Ok(classifier)
                    }
                    Err(e) => {
                        log::warn!("Entity classifier failed to load: {e}");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Extract entities, degrading to an empty result on any failure
    pub async fn extract_entities(&self, text: &str, options: &ExtractOptions) -> ExtractedEntities {
        match self.try_extract(text, options).await {
            Ok(entities) => entities,
            Err(e) => {
                log::warn!("Entity extraction failed, returning no entities: {e}");
                ExtractedEntities::new()
            }
        }
    }

    /// Extract entities, surfacing model failures
    pub async fn try_extract(&self, text: &str, options: &ExtractOptions) -> Result<ExtractedEntities> {
        if text.trim().is_empty() {
            return Ok(ExtractedEntities::new());
        }

        let text = truncate_chars(text, self.config.max_text_chars);
        let classifier = self.classifier().await?;
        let tokens = classifier.classify(text)?;
        log::trace!("Classifier returned {} tokens", tokens.len());

        let detected = clean_entities(reassemble(&tokens, &self.config), &self.config);
        Ok(self.apply_dictionary(detected, text, options))
    }

    fn apply_dictionary(
        &self,
        detected: ExtractedEntities,
        text: &str,
        options: &ExtractOptions,
    ) -> ExtractedEntities {
        if !options.use_dictionary {
            return detected;
        }
        let Some(name) = options
            .dictionary_name
            .as_deref()
            .or(self.default_dictionary.as_deref())
        else {
            log::debug!("Dictionary requested but none named; using tagger output only");
            return detected;
        };
        match self.dictionaries.get(name) {
            Some(dictionary) => dictionary.augment(detected, text),
            None => {
                log::warn!("Dictionary '{name}' is not loaded; using tagger output only");
                detected
            }
        }
    }

    /// Enrich letters in order, appending detected entities to their
    /// mention lists.
    ///
    /// `progress` receives `(done, total)` after each letter. The cancel flag
    /// is checked before each letter; letters already enriched keep their
    /// mentions.
    pub async fn enrich_letters<F>(
        &self,
        letters: &mut [Letter],
        options: &ExtractOptions,
        cancel: &CancelFlag,
        mut progress: F,
    ) -> BatchReport
    where
        F: FnMut(usize, usize),
    {
        let total = letters.len();
        let mut report = BatchReport {
            total,
            ..Default::default()
        };

        for (i, letter) in letters.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                log::info!("Extraction cancelled after {i} of {total} letters");
                report.cancelled = true;
                break;
            }

            match self.try_extract(&letter.content, options).await {
                Ok(entities) => {
                    let mut added = 0;
                    for (category, names) in entities.into_categories() {
                        added += letter.add_mentions(category, names);
                    }
                    log::debug!("Letter {}: {added} new mentions", i + 1);
                    report.mentions_added += added;
                }
                Err(EntityError::ModelUnavailable(reason)) => {
                    log::warn!("Classifier unavailable, leaving remaining letters unchanged: {reason}");
                    report.failed += total - i;
                    break;
                }
                Err(e) => {
                    log::warn!("Letter {}: extraction failed: {e}", i + 1);
                    report.failed += 1;
                }
            }

            report.processed += 1;
            progress(i + 1, total);
        }

        report
    }

    /// Mentions of one category in `text`, as a convenience for callers
    /// that only track a single list
    pub async fn extract_category(
        &self,
        text: &str,
        category: EntityCategory,
        options: &ExtractOptions,
    ) -> Vec<String> {
        self.extract_entities(text, options)
            .await
            .get(category)
            .to_vec()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ReadyLoader, RecordedClassifier, UnavailableLoader};
    use crate::types::TaggedToken;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    struct CountingClassifier {
        calls: Arc<AtomicUsize>,
    }

    impl TokenClassifier for CountingClassifier {
        fn classify(&self, _text: &str) -> Result<Vec<TaggedToken>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![TaggedToken::new("Arles", "B-LOC", 0.99)])
        }
    }

    struct FlakyLoader {
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ClassifierLoader for FlakyLoader {
        async fn load(&self) -> Result<Arc<dyn TokenClassifier>> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(EntityError::model_unavailable("still downloading"))
            } else {
                Ok(Arc::new(RecordedClassifier::new()))
            }
        }
    }

    #[test]
    fn test_truncate_chars_on_boundary() {
        assert_eq!(truncate_chars("Émile", 2), "Ém");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_blank_text_skips_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = EntityExtractor::new(
            ExtractorConfig::default(),
            Arc::new(ReadyLoader::new(CountingClassifier {
                calls: Arc::clone(&calls),
            })),
        );
        let out = extractor
            .extract_entities("   \n", &ExtractOptions::default())
            .await;
        assert!(out.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!extractor.is_ready());

        let out = extractor
            .extract_entities("Off to Arles", &ExtractOptions::default())
            .await;
        assert_eq!(out.places, vec!["Arles"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(extractor.is_ready());
    }

    #[tokio::test]
    async fn test_unavailable_model_degrades_to_empty() {
        let extractor = EntityExtractor::new(
            ExtractorConfig::default(),
            Arc::new(UnavailableLoader::new("no model configured")),
        );
        let out = extractor
            .extract_entities("Dear Theo", &ExtractOptions::default())
            .await;
        assert!(out.is_empty());
        assert!(matches!(
            extractor.try_extract("Dear Theo", &ExtractOptions::default()).await,
            Err(EntityError::ModelUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_model_leaves_batch_incomplete() {
        let extractor = EntityExtractor::new(
            ExtractorConfig::default(),
            Arc::new(UnavailableLoader::new("no model configured")),
        );
        let mut letters: Vec<Letter> = ["Dear Theo", "From Arles", "Nuenen"]
            .iter()
            .map(|t| Letter::new("1888", "Vincent", "Theo").with_content(*t))
            .collect();
        let mut seen = Vec::new();
        let report = extractor
            .enrich_letters(
                &mut letters,
                &ExtractOptions::default(),
                &CancelFlag::new(),
                |done, total| seen.push((done, total)),
            )
            .await;

        assert_eq!(
            report,
            BatchReport {
                total: 3,
                processed: 0,
                failed: 3,
                mentions_added: 0,
                cancelled: false,
            }
        );
        assert!(!report.is_complete());
        assert!(seen.is_empty());
        assert!(letters.iter().all(|l| l.mentioned_places.is_empty()));
    }

    #[tokio::test]
    async fn test_initialize_is_retryable() {
        let extractor = EntityExtractor::new(
            ExtractorConfig::default(),
            Arc::new(FlakyLoader {
                attempts: AtomicUsize::new(0),
            }),
        );
        assert!(extractor.initialize().await.is_err());
        assert!(!extractor.is_ready());
        assert!(extractor.initialize().await.is_ok());
        assert!(extractor.is_ready());
    }

    #[tokio::test]
    async fn test_unknown_dictionary_falls_back() {
        let text = "Gau wrote from Arles";
        let classifier = RecordedClassifier::new().with_recording(
            text,
            vec![
                TaggedToken::new("Gau", "B-PER", 0.9),
                TaggedToken::new("Arles", "B-LOC", 0.9),
            ],
        );
        let extractor =
            EntityExtractor::new(ExtractorConfig::default(), Arc::new(ReadyLoader::new(classifier)));

        let plain = extractor
            .extract_entities(text, &ExtractOptions::with_dictionary("missing"))
            .await;
        assert_eq!(plain.people, vec!["Gau"]);

        let augmented = extractor
            .extract_entities(text, &ExtractOptions::with_dictionary("vangogh"))
            .await;
        assert_eq!(augmented.people, vec!["Paul Gauguin"]);
        assert_eq!(augmented.places, vec!["Arles"]);
    }
}
