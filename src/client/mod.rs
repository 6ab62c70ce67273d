//! Client-side proof preparation.
//!
//! Mirrors what the capture device does before an upload: acquire a location
//! fix, run the trust gate locally, hash the media, and build the commitment
//! that the server later recomputes. The server remains the authority;
//! everything here exists so a client can fail fast (and avoid a doomed
//! upload) and so both sides agree byte-for-byte on the preimage.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::crypto::{commitment_hash, file_hash, ProofSecret};
use crate::domain::{gate, LocationSample, TrustAssessment, TrustRejection};

#[cfg(test)]
use mockall::automock;

/// Default time to wait for a GPS fix before giving up.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(15);

/// Location acquisition failure.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("timed out waiting for a location fix")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of device location fixes.
///
/// Implemented per platform; tests use a simulated provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Acquire the primary (GPS) fix.
    async fn capture(&self) -> Result<LocationSample, CaptureError>;

    /// Acquire the network-derived fix, if the platform offers one.
    async fn capture_network(&self) -> Option<LocationSample>;
}

/// Wrap a capture in a deadline. A hung GPS stack must not hang the upload UI.
pub async fn capture_with_timeout<P: LocationProvider + ?Sized>(
    provider: &P,
    timeout: Duration,
) -> Result<LocationSample, CaptureError> {
    match tokio::time::timeout(timeout, provider.capture()).await {
        Ok(result) => result,
        Err(_) => Err(CaptureError::Timeout),
    }
}

/// Client-side preparation failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The OS flagged the fix as injected. Terminal; no upload is attempted.
    #[error("location reported as mocked, refusing to prepare proof")]
    MockedLocation,

    /// The local trust score fell below the acceptance threshold. Soft fail:
    /// the assessment carries the score and failed checks so the UI can say
    /// why, and the caller may retry after the signals improve.
    #[error("local trust score {} below threshold", .0.score)]
    LowTrustScore(TrustAssessment),

    #[error("invalid capture data: {0}")]
    InvalidCapture(&'static str),
}

/// Everything the client sends with the upload.
#[derive(Debug, Clone)]
pub struct PreparedProof {
    pub primary: LocationSample,
    pub network: Option<LocationSample>,
    /// Hex SHA-256 of the base64-encoded media, sent as reference.
    pub file_hash: String,
    /// The commitment the server will recompute and compare against.
    pub commitment: String,
    /// Advisory local score; the server recomputes its own.
    pub trust_score: u8,
}

/// Client-side proof pipeline.
pub struct ProofClient<P> {
    provider: P,
    secret: ProofSecret,
    capture_timeout: Duration,
}

impl<P: LocationProvider> ProofClient<P> {
    pub fn new(provider: P, secret: ProofSecret) -> Self {
        Self {
            provider,
            secret,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Capture location, run the trust gate locally, and commit to the media
    /// bytes.
    ///
    /// A mocked fix aborts immediately. A score below the threshold is a
    /// soft fail carrying the assessment: the server would reject the upload
    /// anyway, so it is never attempted. The same gate runs again server-side
    /// on whatever is actually submitted.
    pub async fn prepare(&self, media_bytes: &[u8]) -> Result<PreparedProof, ClientError> {
        let primary = capture_with_timeout(&self.provider, self.capture_timeout).await?;

        if primary.is_mocked == Some(true) {
            warn!("mock location flag set on capture, aborting preparation");
            return Err(ClientError::MockedLocation);
        }
        primary
            .check_ranges()
            .map_err(ClientError::InvalidCapture)?;

        // The network fix is best-effort; a hung provider gets the same
        // deadline as the primary capture and degrades to no fix.
        let network = tokio::time::timeout(self.capture_timeout, self.provider.capture_network())
            .await
            .unwrap_or(None);

        let assessment = match gate(&primary, network.as_ref(), &primary.sensors()) {
            Ok(assessment) => assessment,
            Err(TrustRejection::MockLocation) => return Err(ClientError::MockedLocation),
            Err(TrustRejection::LowScore(assessment)) => {
                warn!(
                    score = assessment.score,
                    failed = ?assessment.checks.failed(),
                    "local trust score below threshold, refusing to upload"
                );
                return Err(ClientError::LowTrustScore(assessment));
            }
        };

        let file_hash = file_hash(media_bytes);
        let commitment = commitment_hash(
            primary.latitude,
            primary.longitude,
            primary.captured_at_ms,
            &self.secret,
            &file_hash,
        );

        Ok(PreparedProof {
            primary,
            network,
            file_hash,
            commitment,
            trust_score: assessment.score,
        })
    }
}
