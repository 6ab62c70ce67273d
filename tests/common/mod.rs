//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use fieldproof::crypto::{commitment_hash, file_hash, ProofSecret};
use fieldproof::domain::{LocationSample, NewProofRecord, OwnerRole, ProofRecord, Submitter};
use fieldproof::infra::{MediaStore, ProofError, ProofStore, StoredMedia};
use fieldproof::ProofSubmission;

/// Test submitter ID
pub fn test_owner_id() -> Uuid {
    Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
}

/// A second submitter, for ownership-scoping checks
pub fn other_owner_id() -> Uuid {
    Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap()
}

pub fn test_submitter() -> Submitter {
    Submitter {
        owner_id: test_owner_id(),
        role: OwnerRole::Employee,
    }
}

pub fn test_secret() -> ProofSecret {
    ProofSecret::new("integration-test-secret")
}

/// A clean GPS fix in Bengaluru with all signals healthy.
pub fn clean_fix() -> LocationSample {
    LocationSample {
        latitude: 12.9716,
        longitude: 77.5946,
        accuracy: 5.0,
        altitude: Some(920.0),
        heading: Some(180.0),
        speed: Some(0.5),
        captured_at_ms: 1_700_000_000_000,
        is_mocked: Some(false),
    }
}

/// A network fix a few hundred metres from [`clean_fix`].
pub fn nearby_network_fix() -> LocationSample {
    LocationSample {
        latitude: 12.9740,
        longitude: 77.5960,
        accuracy: 150.0,
        altitude: None,
        heading: None,
        speed: None,
        captured_at_ms: 1_700_000_000_000,
        is_mocked: None,
    }
}

/// A network fix roughly 111 km north of [`clean_fix`].
pub fn far_network_fix() -> LocationSample {
    LocationSample {
        latitude: 13.9716,
        longitude: 77.5946,
        accuracy: 150.0,
        altitude: None,
        heading: None,
        speed: None,
        captured_at_ms: 1_700_000_000_000,
        is_mocked: None,
    }
}

/// Build a submission whose commitment is honestly computed over its own
/// fields, the way a well-behaved client would.
pub fn honest_submission(
    media_bytes: &[u8],
    primary: LocationSample,
    network: Option<LocationSample>,
) -> ProofSubmission {
    let hash = file_hash(media_bytes);
    let commitment = commitment_hash(
        primary.latitude,
        primary.longitude,
        primary.captured_at_ms,
        &test_secret(),
        &hash,
    );

    ProofSubmission {
        media_bytes: media_bytes.to_vec(),
        content_type: "image/jpeg".to_string(),
        primary,
        network,
        claimed_commitment: commitment,
        client_trust_score: None,
    }
}

// ============================================================================
// In-memory store implementations
// ============================================================================

/// In-memory [`ProofStore`] enforcing the same commitment uniqueness the
/// Postgres schema does.
#[derive(Default)]
pub struct MemoryProofStore {
    records: Mutex<Vec<ProofRecord>>,
}

impl MemoryProofStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl ProofStore for MemoryProofStore {
    async fn insert(&self, record: NewProofRecord) -> fieldproof::Result<ProofRecord> {
        let mut records = self.records.lock().unwrap();

        if records
            .iter()
            .any(|r| r.commitment_hash == record.commitment_hash)
        {
            return Err(ProofError::DuplicateSubmission(record.commitment_hash));
        }

        let stored = ProofRecord {
            id: Uuid::new_v4(),
            owner_id: record.owner_id,
            owner_role: record.owner_role,
            media_url: record.media_url,
            captured_at: record.captured_at,
            latitude: record.latitude,
            longitude: record.longitude,
            accuracy: record.accuracy,
            commitment_hash: record.commitment_hash,
            created_at: Utc.timestamp_millis_opt(1_700_000_100_000).unwrap(),
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        role: OwnerRole,
        limit: u32,
    ) -> fieldproof::Result<Vec<ProofRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.owner_id == owner_id && r.owner_role == role)
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// In-memory [`MediaStore`] tracking what is currently stored, so tests can
/// assert that rejected uploads leave nothing behind.
#[derive(Default)]
pub struct MemoryMediaStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    deletes: AtomicUsize,
}

impl MemoryMediaStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stored_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(&self, bytes: &[u8], _content_type: &str) -> fieldproof::Result<StoredMedia> {
        let key = format!("{}.jpg", Uuid::new_v4());
        self.files
            .lock()
            .unwrap()
            .insert(key.clone(), bytes.to_vec());
        Ok(StoredMedia {
            url: format!("/media/{key}"),
            key,
        })
    }

    async fn delete(&self, key: &str) -> fieldproof::Result<()> {
        self.files.lock().unwrap().remove(key);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
