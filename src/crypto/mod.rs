//! Cryptographic utilities for fieldproof.
//!
//! Provides:
//! - File and commitment hashing with a fixed, cross-implementation encoding
//! - Shared-secret handling with redacted debug output

mod hash;
mod secret;

pub use hash::{
    canonical_number, commitment_hash, commitment_preimage, digests_match, file_hash,
    DIGEST_HEX_LEN,
};
pub use secret::{ProofSecret, SecretError, SECRET_ENV_VAR};
