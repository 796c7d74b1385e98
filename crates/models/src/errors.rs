use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot encode fields: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}
