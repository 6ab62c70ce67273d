//! Trait definitions for fieldproof core services.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::{NewProofRecord, OwnerRole, ProofRecord};

use super::Result;

/// Persistence sink for verified proofs.
///
/// Invariant: `commitment_hash` is unique system-wide. The uniqueness is
/// enforced by the storage engine, so even concurrent duplicate submissions
/// cannot both succeed; no application-level locking is involved.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProofStore: Send + Sync {
    /// Persist a verified proof.
    ///
    /// A uniqueness violation on the commitment hash surfaces as
    /// [`ProofError::DuplicateSubmission`](super::ProofError::DuplicateSubmission),
    /// not as a database fault.
    async fn insert(&self, record: NewProofRecord) -> Result<ProofRecord>;

    /// List a submitter's own proofs, newest first. No cross-tenant
    /// visibility: results are always filtered by owner id and role.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        role: OwnerRole,
        limit: u32,
    ) -> Result<Vec<ProofRecord>>;
}

/// Handle to media persisted by a [`MediaStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Store-internal key, used for deletion.
    pub key: String,

    /// URL the media is served from.
    pub url: String,
}

/// Storage for uploaded media bytes.
///
/// Media is written before verification runs and must be deleted again on
/// every rejection branch; no orphaned unverifiable files are retained.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist uploaded bytes, returning a handle for serving and deletion.
    async fn put(&self, bytes: &[u8], content_type: &str) -> Result<StoredMedia>;

    /// Delete previously stored media. Idempotent: deleting an unknown key
    /// is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
