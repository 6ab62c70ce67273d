//! Authentication middleware for Axum
//!
//! Extracts the bearer token from requests and attaches the resulting
//! [`AuthContext`] to request extensions for the handlers.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{AuthContext, AuthError, JwtValidator};
use crate::api::error::{ApiError, ErrorCode};
use crate::domain::OwnerRole;

/// Bearer-token authenticator.
pub struct Authenticator {
    jwt_validator: Arc<JwtValidator>,
}

impl Authenticator {
    pub fn new(jwt_validator: Arc<JwtValidator>) -> Self {
        Self { jwt_validator }
    }

    /// Authenticate a request from its Authorization header.
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<AuthContext, AuthError> {
        let header = auth_header.ok_or(AuthError::MissingAuth)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingAuth)?;

        self.jwt_validator.validate(token)
    }
}

/// Auth context extension for request
#[derive(Clone)]
pub struct AuthContextExt(pub AuthContext);

/// Authentication middleware configuration/state.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub authenticator: Arc<Authenticator>,
    /// If false, requests are treated as fully authorized (dev mode).
    pub require_auth: bool,
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let context = match state.authenticator.authenticate(auth_header) {
        Ok(context) => context,
        Err(e) if state.require_auth => return auth_error_response(e),
        Err(_) => AuthContext {
            subject_id: Uuid::nil(),
            role: OwnerRole::Admin,
        },
    };

    request.extensions_mut().insert(AuthContextExt(context));
    next.run(request).await
}

/// Convert auth error to the structured error envelope.
fn auth_error_response(error: AuthError) -> Response {
    let api_error = match error {
        AuthError::MissingAuth => {
            ApiError::new(ErrorCode::AuthRequired, "Missing authentication")
        }
        AuthError::InvalidJwt(_) => ApiError::new(ErrorCode::InvalidToken, "Invalid bearer token"),
        AuthError::TokenExpired => ApiError::new(ErrorCode::TokenExpired, "Token expired"),
    };
    api_error.into_response()
}
