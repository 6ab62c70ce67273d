//! Authoritative server-side proof verification.
//!
//! The verification pipeline runs a fixed sequence of gates, short-circuiting
//! on the first failure:
//!
//! 1. field validation (before any hashing work)
//! 2. mock-location hard gate
//! 3. authoritative trust re-score (the client's own score is advisory and
//!    never trusted)
//! 4. file-hash recompute from the bytes actually received
//! 5. commitment recompute and full-digest comparison
//! 6. persistence, with the storage-layer uniqueness constraint turning
//!    concurrent duplicates into `DuplicateSubmission`
//!
//! Uploaded media is written before the gates run and deleted again on every
//! rejection branch. A drop guard backstops cancellation: if the request
//! future is dropped mid-verification, the stored media is cleaned up and no
//! partial record becomes visible.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::crypto::{commitment_hash, digests_match, file_hash, ProofSecret, DIGEST_HEX_LEN};
use crate::domain::{
    gate, LocationSample, NewProofRecord, ProofRecord, Submitter, TrustRejection,
};

use super::{MediaStore, ProofError, ProofStore, Result};

/// One proof upload, as decoded from the transport layer.
#[derive(Debug, Clone)]
pub struct ProofSubmission {
    /// Raw media bytes as received. The file hash is always recomputed from
    /// these, never taken from the client.
    pub media_bytes: Vec<u8>,

    /// Declared media content type.
    pub content_type: String,

    /// Primary (GPS) fix as claimed by the client.
    pub primary: LocationSample,

    /// Optional network-provider fix for cross-checking.
    pub network: Option<LocationSample>,

    /// Client-computed commitment digest (hex).
    pub claimed_commitment: String,

    /// Client's advisory trust score, logged for diagnostics only.
    pub client_trust_score: Option<u8>,
}

/// Stateless verification service, constructed once at process start.
pub struct VerificationService<P, M> {
    proof_store: Arc<P>,
    media_store: Arc<M>,
    secret: ProofSecret,
}

impl<P, M> VerificationService<P, M>
where
    P: ProofStore,
    M: MediaStore + 'static,
{
    pub fn new(proof_store: Arc<P>, media_store: Arc<M>, secret: ProofSecret) -> Self {
        Self {
            proof_store,
            media_store,
            secret,
        }
    }

    /// Verify an upload and persist it as a [`ProofRecord`].
    ///
    /// `client_ip` is an auxiliary audit signal only; it never participates
    /// in any gate.
    pub async fn verify_upload(
        &self,
        submission: ProofSubmission,
        submitter: Submitter,
        client_ip: Option<IpAddr>,
    ) -> Result<ProofRecord> {
        // Input errors are rejected before any hashing or storage work.
        validate_submission(&submission)?;

        let primary = &submission.primary;
        let sensors = primary.sensors();

        // The upload is on disk from here on; every early return must clean
        // it up. The guard also covers request cancellation.
        let stored = self
            .media_store
            .put(&submission.media_bytes, &submission.content_type)
            .await?;
        let mut cleanup = MediaCleanup::new(self.media_store.clone(), stored.key.clone());

        // Gates 1 + 2: mock-location hard fail, then the authoritative
        // re-score. A client that skipped or lied about its own pre-check is
        // caught here.
        if let Err(rejection) = gate(primary, submission.network.as_ref(), &sensors) {
            let err = match rejection {
                TrustRejection::MockLocation => {
                    warn!(
                        owner_id = %submitter.owner_id,
                        role = %submitter.role,
                        client_ip = ?client_ip,
                        "rejected proof: OS reported a mock location"
                    );
                    ProofError::MockLocationDetected
                }
                TrustRejection::LowScore(assessment) => {
                    warn!(
                        owner_id = %submitter.owner_id,
                        role = %submitter.role,
                        client_ip = ?client_ip,
                        score = assessment.score,
                        failed_checks = ?assessment.checks.failed(),
                        client_score = ?submission.client_trust_score,
                        "rejected proof: trust score below threshold"
                    );
                    ProofError::LowTrustScore {
                        score: assessment.score,
                        checks: assessment.checks,
                    }
                }
            };
            return Err(self.discard(&mut cleanup, err).await);
        }

        if let Some(client_score) = submission.client_trust_score {
            // Purely diagnostic; a divergent client scorer is worth noticing.
            let server_score = crate::domain::assess(primary, submission.network.as_ref(), &sensors).score;
            if client_score != server_score {
                debug!(
                    owner_id = %submitter.owner_id,
                    client_score,
                    server_score,
                    "client and server trust scores diverge"
                );
            }
        }

        // Gates 3-5: recompute everything from what was actually received.
        let recomputed_file_hash = file_hash(&submission.media_bytes);
        let recomputed_commitment = commitment_hash(
            primary.latitude,
            primary.longitude,
            primary.captured_at_ms,
            &self.secret,
            &recomputed_file_hash,
        );

        if !digests_match(&submission.claimed_commitment, &recomputed_commitment) {
            // Security event: the bytes, coordinates, or timestamp were
            // substituted after the client computed its commitment. Both
            // digests are logged for audit; the secret never is.
            warn!(
                owner_id = %submitter.owner_id,
                role = %submitter.role,
                client_ip = ?client_ip,
                claimed = %submission.claimed_commitment,
                recomputed = %recomputed_commitment,
                "rejected proof: commitment mismatch"
            );
            let err = ProofError::IntegrityViolation {
                claimed: submission.claimed_commitment,
                recomputed: recomputed_commitment,
            };
            return Err(self.discard(&mut cleanup, err).await);
        }

        let record = NewProofRecord {
            owner_id: submitter.owner_id,
            owner_role: submitter.role,
            media_url: stored.url,
            captured_at: primary.captured_at(),
            latitude: primary.latitude,
            longitude: primary.longitude,
            accuracy: primary.accuracy,
            commitment_hash: recomputed_commitment,
        };

        // The unique constraint on commitment_hash serializes concurrent
        // duplicates; exactly one insert wins.
        match self.proof_store.insert(record).await {
            Ok(persisted) => {
                cleanup.disarm();
                info!(
                    proof_id = %persisted.id,
                    owner_id = %persisted.owner_id,
                    commitment = %persisted.commitment_hash,
                    "proof verified and recorded"
                );
                Ok(persisted)
            }
            Err(err) => {
                // Duplicate or storage fault: either way the media copy just
                // written has no record pointing at it.
                Err(self.discard(&mut cleanup, err).await)
            }
        }
    }

    /// Delete the stored media for a failed submission and pass the error on.
    async fn discard(&self, cleanup: &mut MediaCleanup<M>, err: ProofError) -> ProofError {
        if let Some(key) = cleanup.take_key() {
            if let Err(delete_err) = self.media_store.delete(&key).await {
                warn!(key = %key, error = %delete_err, "failed to delete media for rejected proof");
            }
        }
        err
    }
}

fn validate_submission(submission: &ProofSubmission) -> Result<()> {
    if submission.media_bytes.is_empty() {
        return Err(ProofError::InvalidField {
            field: "file",
            message: "uploaded file is empty".to_string(),
        });
    }

    submission
        .primary
        .check_ranges()
        .map_err(|field| ProofError::InvalidField {
            field,
            message: "value out of range".to_string(),
        })?;

    if let Some(network) = &submission.network {
        network.check_ranges().map_err(|field| ProofError::InvalidField {
            field,
            message: "network fix value out of range".to_string(),
        })?;
    }

    let commitment = &submission.claimed_commitment;
    if commitment.len() != DIGEST_HEX_LEN
        || !commitment.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(ProofError::InvalidField {
            field: "clientHash",
            message: "expected a 64-character hex digest".to_string(),
        });
    }

    Ok(())
}

/// Deletes stored media on drop unless disarmed.
///
/// The normal rejection paths delete eagerly via `take_key`; the drop impl
/// only fires when the request future is cancelled mid-verification, in which
/// case the deletion is spawned onto the runtime.
struct MediaCleanup<M: MediaStore + ?Sized + 'static> {
    store: Arc<M>,
    key: Option<String>,
}

impl<M: MediaStore + ?Sized + 'static> MediaCleanup<M> {
    fn new(store: Arc<M>, key: String) -> Self {
        Self {
            store,
            key: Some(key),
        }
    }

    fn take_key(&mut self) -> Option<String> {
        self.key.take()
    }

    fn disarm(mut self) {
        self.key = None;
    }
}

impl<M: MediaStore + ?Sized + 'static> Drop for MediaCleanup<M> {
    fn drop(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };
        let store = self.store.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = store.delete(&key).await {
                    warn!(key = %key, error = %err, "failed to delete media after cancellation");
                }
            });
        } else {
            warn!(key = %key, "media cleanup skipped: no runtime available");
        }
    }
}
