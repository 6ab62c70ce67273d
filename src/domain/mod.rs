//! Core domain types for fieldproof.
//!
//! - [`location`]: position fixes and sensor readings
//! - [`trust`]: deterministic multi-signal trust scoring
//! - [`proof`]: persisted proof records and submitter identity

mod location;
mod proof;
mod trust;

pub use location::{LocationSample, SensorReadings};
pub use proof::{NewProofRecord, OwnerRole, ProofRecord, Submitter};
pub use trust::{
    assess, gate, haversine_km, TrustAssessment, TrustChecks, TrustRejection, EARTH_RADIUS_KM,
    TRUST_SCORE_THRESHOLD,
};
