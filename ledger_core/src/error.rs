use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Balance is zero or the jewel was deactivated. Callers route this to
    /// the top-up flow rather than treating it as a failure.
    #[error("No balance remaining or jewel inactive: {0}")]
    ExhaustedOrInactive(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payment not confirmed for session {0}")]
    PaymentNotConfirmed(String),

    #[error("Webhook signature verification failed")]
    InvalidSignature,

    #[error("Payment provider unavailable: {0}")]
    UpstreamUnavailable(String),
}
