use thiserror::Error;

/// Typed errors for the audio pipeline. Unlike text generation, audio has no
/// safe fallback: provider failures surface to the caller.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Synthesis provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Object-store outcomes the gateway must tell apart.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found")]
    NotFound,

    #[error("object already exists")]
    AlreadyExists,

    #[error("storage error: {0}")]
    Other(#[from] anyhow::Error),
}
