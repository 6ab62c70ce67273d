//! Shared commitment secret handling.

use thiserror::Error;

/// Environment variable holding the pre-shared commitment secret.
pub const SECRET_ENV_VAR: &str = "PROOF_SHARED_SECRET";

/// The pre-shared value mixed into every commitment preimage.
///
/// Known to client and server only; never transmitted and never logged. Only
/// its effect on the commitment digest crosses the wire. Debug output is
/// redacted so the value cannot leak through error or audit logs.
#[derive(Clone)]
pub struct ProofSecret(String);

impl ProofSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Load from `PROOF_SHARED_SECRET`. Refuses an empty value: an empty
    /// secret would make commitments forgeable by anyone who knows the
    /// preimage layout.
    pub fn from_env() -> Result<Self, SecretError> {
        let value = std::env::var(SECRET_ENV_VAR).map_err(|_| SecretError::Missing)?;
        if value.trim().is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self(value))
    }

    /// The raw secret, for preimage construction only.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProofSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProofSecret(..)")
    }
}

/// Errors loading the shared secret.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("{SECRET_ENV_VAR} is not set")]
    Missing,

    #[error("{SECRET_ENV_VAR} is empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = ProofSecret::new("super-sensitive");
        let debug = format!("{secret:?}");
        assert_eq!(debug, "ProofSecret(..)");
        assert!(!debug.contains("sensitive"));
    }
}
