//! Fieldproof Library
//!
//! Proof-of-work integrity and location-trust verification: field workers
//! submit a photo with a GPS capture, the client commits to it with a keyed
//! SHA-256 hash, and the server independently re-verifies trust signals and
//! the commitment before anything is recorded.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (location samples, trust scoring, proof records)
//! - [`crypto`] - Hashing and the commitment scheme
//! - [`infra`] - Infrastructure implementations (verification pipeline, PostgreSQL, media storage)
//! - [`auth`] - Authentication (JWT)
//! - [`client`] - Client-side capture and proof preparation
//! - [`api`] - REST API routes

pub mod api;
pub mod auth;
pub mod client;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod migrations;
pub mod server;

// Re-export commonly used types
pub use domain::{
    LocationSample, OwnerRole, ProofRecord, Submitter, TrustAssessment, TrustChecks,
    TRUST_SCORE_THRESHOLD,
};

pub use infra::{
    FsMediaStore, MediaStore, PgProofStore, ProofError, ProofStore, ProofSubmission, Result,
    VerificationService,
};
