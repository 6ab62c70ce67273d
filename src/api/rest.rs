//! REST API endpoints for fieldproof.

use std::collections::HashMap;
use std::net::IpAddr;

use axum::extract::{DefaultBodyLimit, Extension, Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::error::{missing_fields, validation_error, ApiError, ErrorCode};
use crate::api::types::{ProofHistoryItem, ProofHistoryResponse, ProofUploadResponse};
use crate::auth::AuthContextExt;
use crate::domain::{LocationSample, Submitter};
use crate::infra::{ProofStore, ProofSubmission};
use crate::server::AppState;

/// Upload size cap. Field photos are a few MB; anything larger is abuse.
const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Default and maximum history page sizes.
const DEFAULT_HISTORY_LIMIT: u32 = 100;
const MAX_HISTORY_LIMIT: u32 = 500;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/proofs", post(submit_proof).get(list_proofs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

// ============================================================================
// Upload handler
// ============================================================================

/// Multipart fields as received, before typed parsing.
#[derive(Default)]
struct RawUpload {
    media: Option<(Vec<u8>, String)>,
    text: HashMap<String, String>,
}

impl RawUpload {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut raw = RawUpload::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = match field.name() {
                Some(name) => name.to_string(),
                None => continue,
            };

            if name == "file" {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                raw.media = Some((bytes.to_vec(), content_type));
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                raw.text.insert(name, value);
            }
        }

        Ok(raw)
    }

    fn f64_field(&self, name: &'static str) -> Result<Option<f64>, ApiError> {
        self.text
            .get(name)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| validation_error(name, format!("{name} must be a number")))
            })
            .transpose()
    }

    fn i64_field(&self, name: &'static str) -> Result<Option<i64>, ApiError> {
        self.text
            .get(name)
            .map(|v| {
                v.trim()
                    .parse::<i64>()
                    .map_err(|_| validation_error(name, format!("{name} must be an integer")))
            })
            .transpose()
    }

    fn bool_field(&self, name: &'static str) -> Result<Option<bool>, ApiError> {
        self.text
            .get(name)
            .map(|v| match v.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(validation_error(name, format!("{name} must be a boolean"))),
            })
            .transpose()
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(
        ErrorCode::InvalidRequestBody,
        format!("Malformed multipart body: {err}"),
    )
}

/// Parse the multipart payload into a [`ProofSubmission`].
///
/// Missing or malformed fields are rejected here, before any hashing work
/// and before the media touches storage.
fn parse_submission(raw: RawUpload) -> Result<ProofSubmission, ApiError> {
    let mut missing: Vec<&str> = Vec::new();
    if raw.media.is_none() {
        missing.push("file");
    }
    for required in ["latitude", "longitude", "timestamp", "accuracy", "clientHash"] {
        if !raw.text.contains_key(required) {
            missing.push(required);
        }
    }
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    let (media_bytes, content_type) = raw.media.clone().expect("checked above");

    let primary = LocationSample {
        latitude: raw.f64_field("latitude")?.expect("checked above"),
        longitude: raw.f64_field("longitude")?.expect("checked above"),
        accuracy: raw.f64_field("accuracy")?.expect("checked above"),
        altitude: raw.f64_field("altitude")?,
        heading: raw.f64_field("heading")?,
        speed: raw.f64_field("speed")?,
        captured_at_ms: raw.i64_field("timestamp")?.expect("checked above"),
        // Absent on platforms that cannot report the flag; the trust scorer
        // treats that conservatively rather than hard-failing.
        is_mocked: raw.bool_field("isMocked")?,
    };

    // The network fix is best-effort on the client; both coordinates must be
    // present for it to count.
    let network = match (
        raw.f64_field("networkLatitude")?,
        raw.f64_field("networkLongitude")?,
    ) {
        (Some(latitude), Some(longitude)) => Some(LocationSample {
            latitude,
            longitude,
            accuracy: raw.f64_field("networkAccuracy")?.unwrap_or(0.0),
            altitude: None,
            heading: None,
            speed: None,
            captured_at_ms: primary.captured_at_ms,
            is_mocked: None,
        }),
        _ => None,
    };

    let client_trust_score = raw
        .i64_field("trustScore")?
        .map(|v| v.clamp(0, 100) as u8);

    Ok(ProofSubmission {
        media_bytes,
        content_type,
        primary,
        network,
        claimed_commitment: raw.text["clientHash"].trim().to_string(),
        client_trust_score,
    })
}

/// Extract the submitter address for audit logging. Auxiliary signal only.
fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
}

/// `POST /api/v1/proofs`: verify and record a proof-of-work upload.
async fn submit_proof(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProofUploadResponse>), ApiError> {
    let raw = RawUpload::read(multipart).await?;
    let submission = parse_submission(raw)?;

    let submitter = Submitter {
        owner_id: auth.subject_id,
        role: auth.role,
    };

    let record = state
        .verifier
        .verify_upload(submission, submitter, client_ip(&headers))
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

// ============================================================================
// History handler
// ============================================================================

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<u32>,
}

/// `GET /api/v1/proofs`: the caller's own verified proofs, newest first.
///
/// Always filtered by the authenticated identity and role; there is no
/// cross-tenant visibility and no way to query another submitter's records.
async fn list_proofs(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ProofHistoryResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let records = state
        .proof_store
        .list_for_owner(auth.subject_id, auth.role, limit)
        .await?;

    let proofs: Vec<ProofHistoryItem> = records.into_iter().map(Into::into).collect();
    Ok(Json(ProofHistoryResponse {
        total: proofs.len(),
        proofs,
    }))
}
