//! Authentication for fieldproof.
//!
//! Bearer-token (JWT) authentication for the upload and history endpoints.
//! Every proof record is attributed to the authenticated subject; the token
//! carries the submitter's identity and role, nothing more.
//!
//! # Configuration
//!
//! - `AUTH_MODE`: `required` (default) or `disabled` for development
//! - `JWT_SECRET`: HMAC secret for token validation
//! - `JWT_ISSUER` / `JWT_AUDIENCE`: expected token provenance

mod jwt;
mod middleware;

pub use jwt::{Claims, JwtValidator};
pub use middleware::{auth_middleware, AuthContextExt, AuthMiddlewareState, Authenticator};

use uuid::Uuid;

use crate::domain::OwnerRole;

/// Authentication context extracted from a request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Submitter identity from the token subject
    pub subject_id: Uuid,

    /// Role claim, used to scope record ownership
    pub role: OwnerRole,
}

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authentication")]
    MissingAuth,

    #[error("invalid JWT: {0}")]
    InvalidJwt(String),

    #[error("token expired")]
    TokenExpired,
}
