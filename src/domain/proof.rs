//! Persisted proof records and submitter identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of the authenticated submitter, stamped onto each record.
///
/// Identity and role come from the external authentication collaborator; they
/// are never re-derived here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerRole {
    Employee,
    Manager,
    Admin,
}

impl OwnerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerRole::Employee => "employee",
            OwnerRole::Manager => "manager",
            OwnerRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(OwnerRole::Employee),
            "manager" => Some(OwnerRole::Manager),
            "admin" => Some(OwnerRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for OwnerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity submitting a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitter {
    pub owner_id: Uuid,
    pub role: OwnerRole,
}

/// A verified proof, ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewProofRecord {
    pub owner_id: Uuid,
    pub owner_role: OwnerRole,
    pub media_url: String,
    pub captured_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub commitment_hash: String,
}

/// A persisted, verified proof of work performed at a place and time.
///
/// Created only after verification succeeds; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_role: OwnerRole,
    pub media_url: String,
    pub captured_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub commitment_hash: String,
    pub created_at: DateTime<Utc>,
}
