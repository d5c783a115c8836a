use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to extract pages from '{source_id}': {reason}")]
    Extraction { source_id: String, reason: String },

    #[error("embedding provider failed during {op}: {reason}")]
    Embedding { op: &'static str, reason: String },

    #[error("generation provider failed: {0}")]
    Generation(String),

    #[error("no documents have been ingested yet")]
    NoDocuments,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage operation '{op}' failed: {reason}")]
    Store { op: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
