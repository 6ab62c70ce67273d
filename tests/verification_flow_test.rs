//! End-to-end verification pipeline tests against in-memory stores.

#[macro_use]
mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use fieldproof::client::{CaptureError, LocationProvider, ProofClient};
use fieldproof::domain::{OwnerRole, Submitter};
use fieldproof::infra::{ProofStore, VerificationService};
use fieldproof::{LocationSample, ProofError};

use common::*;

fn service(
    proofs: Arc<MemoryProofStore>,
    media: Arc<MemoryMediaStore>,
) -> VerificationService<MemoryProofStore, MemoryMediaStore> {
    VerificationService::new(proofs, media, test_secret())
}

#[tokio::test]
async fn honest_upload_is_verified_and_recorded() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let submission = honest_submission(b"field photo", clean_fix(), Some(nearby_network_fix()));
    let claimed = submission.claimed_commitment.clone();

    let record = assert_ok!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );

    assert_eq!(record.owner_id, test_owner_id());
    assert_eq!(record.owner_role, OwnerRole::Employee);
    assert_eq!(record.latitude, clean_fix().latitude);
    assert_eq!(record.captured_at.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(record.commitment_hash, claimed);
    assert!(record.media_url.starts_with("/media/"));

    assert_eq!(proofs.len(), 1);
    assert_eq!(media.stored_count(), 1);
    assert_eq!(media.delete_count(), 0);
}

#[tokio::test]
async fn mocked_location_is_rejected_and_media_removed() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let mut fix = clean_fix();
    fix.is_mocked = Some(true);
    let submission = honest_submission(b"photo", fix, None);

    let err = assert_err!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    assert!(matches!(err, ProofError::MockLocationDetected));

    assert_eq!(proofs.len(), 0);
    assert_eq!(media.stored_count(), 0);
    assert_eq!(media.delete_count(), 1);
}

#[tokio::test]
async fn distant_network_fix_fails_the_trust_gate() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    // Hard GPS/network mismatch stacked with an implausible altitude and a
    // negative speed drops the score to 30.
    let mut fix = clean_fix();
    fix.altitude = Some(12_000.0);
    fix.speed = Some(-3.0);
    let submission = honest_submission(b"photo", fix, Some(far_network_fix()));

    let err = assert_err!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    match err {
        ProofError::LowTrustScore { score, checks } => {
            assert_eq!(score, 30);
            assert!(!checks.gps_network_match);
            assert!(!checks.altitude_reasonable);
            assert!(!checks.sensors_consistent);
        }
        other => panic!("expected LowTrustScore, got {other:?}"),
    }

    assert_eq!(proofs.len(), 0);
    assert_eq!(media.stored_count(), 0);
}

#[tokio::test]
async fn tampered_media_violates_integrity() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    // Commitment computed over one set of bytes, upload carries another.
    let mut submission = honest_submission(b"original bytes", clean_fix(), None);
    submission.media_bytes = b"tampered bytes".to_vec();

    let err = assert_err!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    assert!(matches!(err, ProofError::IntegrityViolation { .. }));
    assert_eq!(media.stored_count(), 0);
    assert_eq!(proofs.len(), 0);
}

#[tokio::test]
async fn tampered_coordinates_violate_integrity() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let mut submission = honest_submission(b"photo", clean_fix(), None);
    submission.primary.latitude += 0.0001;

    let err = assert_err!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    assert!(matches!(err, ProofError::IntegrityViolation { .. }));
}

#[tokio::test]
async fn duplicate_submission_is_rejected_once_recorded() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let submission = honest_submission(b"photo", clean_fix(), None);

    assert_ok!(
        verifier
            .verify_upload(submission.clone(), test_submitter(), None)
            .await
    );
    let err = assert_err!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    assert!(matches!(err, ProofError::DuplicateSubmission(_)));

    // The first upload's media survives; the duplicate's copy is removed.
    assert_eq!(proofs.len(), 1);
    assert_eq!(media.stored_count(), 1);
    assert_eq!(media.delete_count(), 1);
}

#[tokio::test]
async fn racing_duplicates_record_exactly_once() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let submission = honest_submission(b"photo", clean_fix(), None);

    // Two in-flight verifications of the same proof; the store's uniqueness
    // constraint is the only serialization point between them.
    let (first, second) = tokio::join!(
        verifier.verify_upload(submission.clone(), test_submitter(), None),
        verifier.verify_upload(submission, test_submitter(), None),
    );

    let (winner, loser) = match (first, second) {
        (Ok(record), Err(err)) | (Err(err), Ok(record)) => (record, err),
        (Ok(_), Ok(_)) => panic!("both concurrent duplicates were accepted"),
        (Err(a), Err(b)) => panic!("both concurrent duplicates were rejected: {a:?} / {b:?}"),
    };

    assert!(matches!(loser, ProofError::DuplicateSubmission(_)));
    assert_eq!(winner.commitment_hash.len(), 64);

    // Exactly one record and one media file remain; the loser's copy is gone.
    assert_eq!(proofs.len(), 1);
    assert_eq!(media.stored_count(), 1);
    assert_eq!(media.delete_count(), 1);
}

#[tokio::test]
async fn invalid_coordinates_rejected_before_storage() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let mut fix = clean_fix();
    fix.latitude = 95.0;
    let submission = honest_submission(b"photo", fix, None);

    let err = assert_err!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    assert!(matches!(
        err,
        ProofError::InvalidField {
            field: "latitude",
            ..
        }
    ));

    // Rejected during validation; nothing was ever written.
    assert_eq!(media.stored_count(), 0);
    assert_eq!(media.delete_count(), 0);
}

#[tokio::test]
async fn history_is_scoped_to_the_submitter() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let mine = honest_submission(b"my photo", clean_fix(), None);
    assert_ok!(verifier.verify_upload(mine, test_submitter(), None).await);

    let mut other_fix = clean_fix();
    other_fix.captured_at_ms += 60_000;
    let theirs = honest_submission(b"their photo", other_fix, None);
    let other = Submitter {
        owner_id: other_owner_id(),
        role: OwnerRole::Manager,
    };
    assert_ok!(verifier.verify_upload(theirs, other, None).await);

    let mine = assert_ok!(
        proofs
            .list_for_owner(test_owner_id(), OwnerRole::Employee, 100)
            .await
    );
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].owner_id, test_owner_id());

    // Same id under a different role sees nothing.
    let cross_role = assert_ok!(
        proofs
            .list_for_owner(test_owner_id(), OwnerRole::Admin, 100)
            .await
    );
    assert!(cross_role.is_empty());
}

// ============================================================================
// Client-to-server agreement
// ============================================================================

struct FixedProvider {
    primary: LocationSample,
    network: Option<LocationSample>,
}

#[async_trait]
impl LocationProvider for FixedProvider {
    async fn capture(&self) -> Result<LocationSample, CaptureError> {
        Ok(self.primary.clone())
    }

    async fn capture_network(&self) -> Option<LocationSample> {
        self.network.clone()
    }
}

#[tokio::test]
async fn client_prepared_proof_verifies_on_the_server() {
    let proofs = MemoryProofStore::new();
    let media = MemoryMediaStore::new();
    let verifier = service(proofs.clone(), media.clone());

    let client = ProofClient::new(
        FixedProvider {
            primary: clean_fix(),
            network: Some(nearby_network_fix()),
        },
        test_secret(),
    )
    .with_capture_timeout(Duration::from_secs(1));

    let media_bytes = b"jpeg bytes from the field";
    let prepared = client.prepare(media_bytes).await.unwrap();
    assert_eq!(prepared.trust_score, 100);

    let submission = fieldproof::ProofSubmission {
        media_bytes: media_bytes.to_vec(),
        content_type: "image/jpeg".to_string(),
        primary: prepared.primary,
        network: prepared.network,
        claimed_commitment: prepared.commitment,
        client_trust_score: Some(prepared.trust_score),
    };

    let record = assert_ok!(
        verifier
            .verify_upload(submission, test_submitter(), None)
            .await
    );
    assert_eq!(proofs.len(), 1);
    assert_eq!(record.commitment_hash.len(), 64);
}
