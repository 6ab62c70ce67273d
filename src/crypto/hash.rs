//! Commitment hashing for proof uploads.
//!
//! Both ends of the wire must produce byte-identical digests, so every
//! encoding choice here is fixed:
//!
//! - `file_hash` is SHA-256 over the *base64 text encoding* of the raw media
//!   bytes (standard alphabet, padded), not over the bytes themselves. This
//!   mirrors how clients read media for upload; changing it breaks every
//!   deployed client.
//! - `commitment_hash` is SHA-256 over the UTF-8 preimage
//!   `"{lat}:{lon}:{timestampMs}:{secret}:{fileHashHex}"`.
//! - Coordinates are formatted with [`canonical_number`], the shortest
//!   round-trip decimal form. serde_json emits the same digits for fractional
//!   values in coordinate range (real fixes are never exactly integral), so
//!   wire-serialized and commitment-formatted coordinates agree.
//! - Digests are lowercase hex; comparison is case-insensitive over the full
//!   64 characters, never a prefix.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

use super::secret::ProofSecret;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash the media content as the client does: SHA-256 over the base64 text
/// of the raw bytes, hex-encoded.
pub fn file_hash(bytes: &[u8]) -> String {
    let encoded = BASE64.encode(bytes);
    hex::encode(Sha256::digest(encoded.as_bytes()))
}

/// Canonical numeric-to-string conversion for commitment preimages.
///
/// Shortest round-trip decimal (Rust `Display`). Fixed on both ends: any
/// other float formatting breaks the commitment match.
pub fn canonical_number(value: f64) -> String {
    format!("{value}")
}

/// Build the commitment preimage without hashing it. Split out so tests can
/// assert the exact byte layout.
pub fn commitment_preimage(
    latitude: f64,
    longitude: f64,
    captured_at_ms: i64,
    secret: &ProofSecret,
    file_hash_hex: &str,
) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        canonical_number(latitude),
        canonical_number(longitude),
        captured_at_ms,
        secret.expose(),
        file_hash_hex,
    )
}

/// Commitment digest binding location, capture time, the shared secret, and
/// the file hash. Any post-capture change to the media bytes, coordinates, or
/// timestamp produces a different digest.
pub fn commitment_hash(
    latitude: f64,
    longitude: f64,
    captured_at_ms: i64,
    secret: &ProofSecret,
    file_hash_hex: &str,
) -> String {
    let preimage = commitment_preimage(latitude, longitude, captured_at_ms, secret, file_hash_hex);
    hex::encode(Sha256::digest(preimage.as_bytes()))
}

/// Compare two hex digests over their full length, case-insensitively and in
/// constant time. Malformed or truncated input never matches.
pub fn digests_match(claimed: &str, recomputed: &str) -> bool {
    let claimed = match decode_digest(claimed) {
        Some(bytes) => bytes,
        None => return false,
    };
    let recomputed = match decode_digest(recomputed) {
        Some(bytes) => bytes,
        None => return false,
    };

    let mut diff = 0u8;
    for (a, b) in claimed.iter().zip(recomputed.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

fn decode_digest(hex_str: &str) -> Option<[u8; 32]> {
    if hex_str.len() != DIGEST_HEX_LEN {
        return None;
    }
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}
