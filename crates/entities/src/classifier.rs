use crate::error::{EntityError, Result};
use crate::types::TaggedToken;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Sequence classifier producing BIO-tagged tokens for a text
pub trait TokenClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Vec<TaggedToken>>;
}

/// Produces a classifier on first use
#[async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn TokenClassifier>>;
}

/// Replays token lists recorded for known texts.
///
/// Texts without a recording classify to no tokens.
#[derive(Debug, Clone, Default)]
pub struct RecordedClassifier {
    recordings: HashMap<String, Vec<TaggedToken>>,
}

impl RecordedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tokens` for `text`, returning the recording it replaced
    pub fn record(
        &mut self,
        text: impl Into<String>,
        tokens: Vec<TaggedToken>,
    ) -> Option<Vec<TaggedToken>> {
        self.recordings.insert(text.into(), tokens)
    }

    pub fn with_recording(mut self, text: impl Into<String>, tokens: Vec<TaggedToken>) -> Self {
        self.record(text, tokens);
        self
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}

impl TokenClassifier for RecordedClassifier {
    fn classify(&self, text: &str) -> Result<Vec<TaggedToken>> {
        Ok(self.recordings.get(text).cloned().unwrap_or_default())
    }
}

/// Loader handing out a classifier that already exists
pub struct ReadyLoader {
    classifier: Arc<dyn TokenClassifier>,
}

impl ReadyLoader {
    pub fn new(classifier: impl TokenClassifier + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

#[async_trait]
impl ClassifierLoader for ReadyLoader {
    async fn load(&self) -> Result<Arc<dyn TokenClassifier>> {
        Ok(Arc::clone(&self.classifier))
    }
}

/// Loader for setups with no model configured; every load fails
#[derive(Debug, Clone)]
pub struct UnavailableLoader {
    reason: String,
}

impl UnavailableLoader {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ClassifierLoader for UnavailableLoader {
    async fn load(&self) -> Result<Arc<dyn TokenClassifier>> {
        Err(EntityError::model_unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_returns_replaced_tokens() {
        let mut classifier = RecordedClassifier::new();
        let first = vec![TaggedToken::new("Arles", "B-LOC", 0.9)];
        assert!(classifier.record("Dear Theo", first.clone()).is_none());
        let replaced = classifier.record("Dear Theo", vec![TaggedToken::new("Paris", "B-LOC", 0.9)]);
        assert_eq!(replaced, Some(first));
        assert_eq!(classifier.len(), 1);
        assert_eq!(classifier.classify("Dear Theo").unwrap()[0].word, "Paris");
    }
}
