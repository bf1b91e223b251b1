//! BERT-style token classification through ONNX Runtime.
//!
//! Emits one [`TaggedToken`] per WordPiece with its argmax label and
//! softmax confidence. Continuation pieces keep their `##` prefix so the
//! reassembly step can glue them back onto the preceding word. `O` labels
//! and special tokens are not emitted.

use crate::classifier::{ClassifierLoader, TokenClassifier};
use crate::error::{EntityError, Result};
use crate::types::TaggedToken;
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;

/// Label order of a CoNLL-2003 BERT NER head
const DEFAULT_LABELS: &[&str] = &[
    "O", "B-MISC", "I-MISC", "B-PER", "I-PER", "B-ORG", "I-ORG", "B-LOC", "I-LOC",
];

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    /// Sequence length the model was exported with
    pub max_length: usize,
    /// Output index → BIO label
    pub labels: Vec<String>,
    pub intra_threads: usize,
}

impl OnnxConfig {
    /// Expects `model.onnx` and `tokenizer.json` inside `dir`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model_path: dir.join("model.onnx"),
            tokenizer_path: dir.join("tokenizer.json"),
            max_length: 512,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            intra_threads: 2,
        }
    }

    /// Reads `BIOGRAPH_NER_MODEL_PATH` (a model directory) and
    /// `BIOGRAPH_ONNX_THREADS`; `None` when no model path is set
    pub fn from_env() -> Option<Self> {
        let dir = std::env::var("BIOGRAPH_NER_MODEL_PATH").ok()?;
        let mut config = Self::from_dir(dir);
        if let Some(threads) = std::env::var("BIOGRAPH_ONNX_THREADS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.intra_threads = threads;
        }
        Some(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_length == 0 {
            return Err("max_length must be > 0".to_string());
        }
        if self.labels.is_empty() {
            return Err("labels must not be empty".to_string());
        }
        if !self.model_path.exists() {
            return Err(format!("model not found at {}", self.model_path.display()));
        }
        if !self.tokenizer_path.exists() {
            return Err(format!(
                "tokenizer not found at {}",
                self.tokenizer_path.display()
            ));
        }
        Ok(())
    }
}

pub struct OnnxTokenClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    config: OnnxConfig,
}

impl OnnxTokenClassifier {
    pub fn load(config: OnnxConfig) -> Result<Self> {
        config.validate().map_err(EntityError::invalid_config)?;
        log::info!(
            "Loading NER model from {} with {} threads",
            config.model_path.display(),
            config.intra_threads
        );

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(config.intra_threads))
            .and_then(|b| b.commit_from_file(&config.model_path))
            .map_err(|e| EntityError::model_unavailable(format!("NER session: {e}")))?;

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| EntityError::model_unavailable(format!("NER tokenizer: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            config,
        })
    }
}

impl TokenClassifier for OnnxTokenClassifier {
    fn classify(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EntityError::classification(format!("tokenization: {e}")))?;

        let max_length = self.config.max_length;
        let seq_len = encoding.get_ids().len().min(max_length);

        let mut input_ids = vec![0i64; max_length];
        let mut attention = vec![0i64; max_length];
        for (i, &id) in encoding.get_ids().iter().take(max_length).enumerate() {
            input_ids[i] = id as i64;
        }
        for (i, &mask) in encoding.get_attention_mask().iter().take(max_length).enumerate() {
            attention[i] = mask as i64;
        }
        let token_type_ids = vec![0i64; max_length];

        let tensor = |data: Vec<i64>| {
            Value::from_array((vec![1, max_length], data))
                .map_err(|e| EntityError::classification(format!("input tensor: {e}")))
        };
        let input_ids_value = tensor(input_ids)?;
        let attention_value = tensor(attention.clone())?;
        let token_type_value = tensor(token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EntityError::classification("session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => &input_ids_value,
                "attention_mask" => &attention_value,
                "token_type_ids" => &token_type_value,
            ])
            .map_err(|e| EntityError::classification(format!("inference: {e}")))?;

        let (_shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EntityError::classification(format!("output tensor: {e}")))?;

        let num_labels = self.config.labels.len();
        let words = encoding.get_tokens();
        let special = encoding.get_special_tokens_mask();
        let mut tokens = Vec::new();

        for i in 0..seq_len {
            if attention[i] == 0 || special.get(i).copied().unwrap_or(0) == 1 {
                continue;
            }
            let start = i * num_labels;
            let Some(row) = logits.get(start..start + num_labels) else {
                break;
            };
            let probs = softmax(row);
            let Some((best, &score)) = probs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
            else {
                continue;
            };
            let label = &self.config.labels[best];
            if label == "O" {
                continue;
            }
            tokens.push(TaggedToken::new(words[i].clone(), label.clone(), score));
        }

        Ok(tokens)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&x| x / sum).collect()
}

/// Loads [`OnnxTokenClassifier`] on a blocking thread
pub struct OnnxLoader {
    config: OnnxConfig,
}

impl OnnxLoader {
    pub fn new(config: OnnxConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClassifierLoader for OnnxLoader {
    async fn load(&self) -> Result<Arc<dyn TokenClassifier>> {
        let config = self.config.clone();
        let classifier = tokio::task::spawn_blocking(move || OnnxTokenClassifier::load(config))
            .await
            .map_err(|e| EntityError::model_unavailable(format!("loader task: {e}")))??;
        Ok(Arc::new(classifier))
    }
}
