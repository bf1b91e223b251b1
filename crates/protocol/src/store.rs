use crate::error::{ProtocolError, Result};
use crate::record::BiographyRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Key-value persistence for biography records, keyed by biography id
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    async fn save(&self, id: &str, record: &BiographyRecord) -> Result<()>;

    /// Load a record; `Ok(None)` when nothing is stored under `id`
    async fn load(&self, id: &str) -> Result<Option<BiographyRecord>>;
}

/// Process-local store, mostly for tests and one-shot CLI runs
#[derive(Default)]
pub struct MemoryArchiveStore {
    records: RwLock<HashMap<String, BiographyRecord>>,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    async fn save(&self, id: &str, record: &BiographyRecord) -> Result<()> {
        validate_id(id)?;
        self.records
            .write()
            .await
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<BiographyRecord>> {
        validate_id(id)?;
        Ok(self.records.read().await.get(id).cloned())
    }
}

/// One pretty-printed JSON file per biography: `<root>/<id>.json`
pub struct JsonFileArchiveStore {
    root: PathBuf,
}

impl JsonFileArchiveStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}.json")))
    }
}

#[async_trait]
impl ArchiveStore for JsonFileArchiveStore {
    async fn save(&self, id: &str, record: &BiographyRecord) -> Result<()> {
        let path = self.path_for(id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let bytes = serde_json::to_vec_pretty(record)?;

        // Readers only ever see a complete file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Saved biography {id} to {}", path.display());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<BiographyRecord>> {
        let path = self.path_for(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProtocolError::invalid_id(id))
    }
}
