//! JWT authentication
//!
//! HMAC-signed tokens carrying the submitter identity and role claim.

use super::{AuthContext, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::OwnerRole;

/// JWT claims for fieldproof
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (submitter id)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID
    pub jti: String,

    /// Submitter role (employee, manager, admin)
    #[serde(default)]
    pub role: String,
}

/// JWT validator and issuer
pub struct JwtValidator {
    /// Secret key for signing/verifying
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,

    /// Issuer string
    issuer: String,

    /// Audience string
    audience: String,
}

impl JwtValidator {
    /// Create a new JWT validator with a secret key
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Issue a new JWT token
    pub fn issue(
        &self,
        subject_id: &Uuid,
        role: OwnerRole,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: subject_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            role: role.as_str().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidJwt(e.to_string()))
    }

    /// Validate a JWT token and return auth context
    pub fn validate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidJwt(e.to_string()),
            }
        })?;

        let claims = token_data.claims;

        let subject_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidJwt("invalid subject id".to_string()))?;

        let role = OwnerRole::parse(&claims.role)
            .ok_or_else(|| AuthError::InvalidJwt(format!("unknown role '{}'", claims.role)))?;

        Ok(AuthContext { subject_id, role })
    }
}
