use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Ego network depth must be at least 1, got {0}")]
    InvalidDepth(usize),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound(id.into())
    }

    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }
}
