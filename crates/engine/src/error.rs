//! Error types for the reception engine.
//!
//! The taxonomy follows the failure model of a live call: most "failures"
//! are conversational (a missed classification, a field the caller mumbled)
//! and must degrade to speakable text rather than propagate. Only
//! configuration and collaborator faults surface as errors, and even those
//! are caught at the orchestrator boundary and converted to a spoken
//! fallback — no error may reach the live call.

use thiserror::Error;

/// Result type for reception engine operations.
pub type Result<T> = std::result::Result<T, ReceptionError>;

/// Errors raised inside the reception engine.
#[derive(Debug, Error)]
pub enum ReceptionError {
    /// No classifier rule matched. Non-fatal: callers of `classify` fall
    /// back to the tenant's default route instead of erroring.
    #[error("classification miss: {0}")]
    Classification(String),

    /// A name/phone/reason extraction failed. This drives a bounded
    /// re-prompt, not an exception path.
    #[error("extraction failure: {0}")]
    Extraction(String),

    /// The transfer mechanism itself is unusable (missing contact,
    /// missing credentials). Fails closed to apology + hangup.
    #[error("transfer unavailable: {0}")]
    TransferUnavailable(String),

    /// Notification delivery failed. Logged, never retried, never blocks
    /// call completion.
    #[error("notification failure: {0}")]
    Notification(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external collaborator (retrieval, identity, appointment, call
    /// control) failed. Converted to a speakable fallback at the
    /// orchestrator boundary.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReceptionError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReceptionError::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ReceptionError::Internal(msg.into())
    }
}
