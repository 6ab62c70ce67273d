//! Error types for fieldproof infrastructure.

use thiserror::Error;

use crate::domain::TrustChecks;

/// Errors that can occur while verifying and persisting a proof.
///
/// The first four variants are business-rule rejections (client error, never
/// retried automatically); the rest are system faults.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The OS reported the submitted position as injected.
    #[error("mock location detected")]
    MockLocationDetected,

    /// The authoritative server-side trust score fell below the threshold.
    #[error("trust score {score} below threshold")]
    LowTrustScore { score: u8, checks: TrustChecks },

    /// The recomputed commitment does not match the client-submitted one:
    /// the bytes, coordinates, or timestamp changed after capture.
    #[error("commitment mismatch: claimed {claimed}, recomputed {recomputed}")]
    IntegrityViolation { claimed: String, recomputed: String },

    /// This exact file+location+time combination was already recorded.
    #[error("duplicate proof submission: {0}")]
    DuplicateSubmission(String),

    /// A submitted field failed validation before any hashing work.
    #[error("invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Media storage error.
    #[error("media storage error: {0}")]
    Media(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProofError {
    /// Whether this is a business-rule rejection rather than a system fault.
    /// Rejections delete the uploaded media and are not retried.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ProofError::MockLocationDetected
                | ProofError::LowTrustScore { .. }
                | ProofError::IntegrityViolation { .. }
                | ProofError::DuplicateSubmission(_)
                | ProofError::InvalidField { .. }
        )
    }
}

/// Result type for proof operations.
pub type Result<T> = std::result::Result<T, ProofError>;
