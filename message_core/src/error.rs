use thiserror::Error;

/// Typed errors for the text-generation pipeline.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Text provider unavailable: {0}")]
    UpstreamUnavailable(String),
}
