//! HTTP API layer for fieldproof.
//!
//! REST endpoints for proof uploads and submitter history, plus the
//! structured error envelope shared by every handler.

pub mod error;
mod rest;
mod types;

pub use error::{missing_fields, validation_error, ApiError, ErrorCode};
pub use rest::router;
pub use types::{ProofHistoryItem, ProofHistoryResponse, ProofUploadResponse};
