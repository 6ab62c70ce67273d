//! Shared request and response types for REST API handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ProofRecord;

// ============================================================================
// Proof upload types
// ============================================================================

/// Response for a successfully verified proof upload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofUploadResponse {
    pub id: Uuid,
    pub media_url: String,
    /// Verified capture time, epoch milliseconds.
    pub verified_timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    /// The commitment hash that now uniquely identifies this proof.
    pub integrity_hash: String,
}

impl From<ProofRecord> for ProofUploadResponse {
    fn from(record: ProofRecord) -> Self {
        Self {
            id: record.id,
            media_url: record.media_url,
            verified_timestamp: record.captured_at.timestamp_millis(),
            latitude: record.latitude,
            longitude: record.longitude,
            accuracy: record.accuracy,
            integrity_hash: record.commitment_hash,
        }
    }
}

// ============================================================================
// History types
// ============================================================================

/// One entry in a submitter's proof history.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofHistoryItem {
    pub id: Uuid,
    pub media_url: String,
    pub captured_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub integrity_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<ProofRecord> for ProofHistoryItem {
    fn from(record: ProofRecord) -> Self {
        Self {
            id: record.id,
            media_url: record.media_url,
            captured_at: record.captured_at,
            latitude: record.latitude,
            longitude: record.longitude,
            accuracy: record.accuracy,
            integrity_hash: record.commitment_hash,
            created_at: record.created_at,
        }
    }
}

/// Response for the proof history endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofHistoryResponse {
    pub proofs: Vec<ProofHistoryItem>,
    pub total: usize,
}
