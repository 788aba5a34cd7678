use async_trait::async_trait;
use derive_more::{Display, Error, From};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Path of the scan tracking route relative to the payload origin.
pub const TRACK_PATH: &str = "/track-scan";

/// JSON request body of the tracking route.
#[derive(Debug, Serialize)]
pub struct TrackRequest<'a> {
    /// Scanned code identifier.
    pub qr_id: &'a str,

    /// Opaque device fingerprint.
    pub fingerprint: &'a str,
}

/// JSON response body of the tracking route.
#[derive(Debug, Deserialize)]
pub struct TrackResponse {
    /// Whether the scan was processed.
    pub success: bool,

    /// Target URL to navigate to.
    #[serde(default)]
    pub link: Option<String>,
}

/// Scan tracking errors.
#[derive(Debug, Display, From, Error)]
pub enum TrackError {
    /// HTTP client error, including non-success responses.
    Http(reqwest::Error),

    /// Scanned code does not exist.
    #[display(fmt = "code not found")]
    NotFound,
}

/// Scan reporting capability.
#[async_trait]
pub trait ScanTracker {
    /// Report a single scan.
    ///
    /// Implementations must not retry on failure.
    async fn track(&self, request: TrackRequest<'_>) -> Result<TrackResponse, TrackError>;
}

/// [`ScanTracker`] implementation that calls the tracking route over HTTP.
pub struct HttpTracker {
    client: Client,
    endpoint: Url,
}

impl HttpTracker {
    /// Create a new tracker that reports scans to the tracking route of the provided origin.
    pub fn new(origin: &Url) -> Self {
        let mut endpoint = origin.clone();
        endpoint.set_path(TRACK_PATH);
        endpoint.set_query(None);
        endpoint.set_fragment(None);

        Self {
            client: Client::new(),
            endpoint,
        }
    }

    /// Tracking route URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ScanTracker for HttpTracker {
    async fn track(&self, request: TrackRequest<'_>) -> Result<TrackResponse, TrackError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrackError::NotFound);
        }

        Ok(response.error_for_status()?.json().await?)
    }
}
