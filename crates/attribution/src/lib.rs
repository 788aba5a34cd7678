//! # Scan attribution
//!
//! Tracked payloads point to a scan entry point instead of the code's target URL.
//! Before navigating to the target URL, the scanning client derives a device
//! fingerprint and reports the scan, which is modelled as an explicit state machine:
//!
//! ```text
//! Preparing -> Fingerprinting -> Tracking -> Redirecting
//!     |              |              |
//!     +--------------+--------------+-----> Failed
//! ```
//!
//! The flow fails closed: if the scan cannot be reported, navigation never happens.
//! A flow runs at most once and never retries.

use std::io;

use derive_more::{Display, Error, From};
use reqwest::Url;
use tracing::{debug, warn};

/// Device fingerprinting.
mod fingerprint;

/// Attribution flow phases.
mod phase;

/// Scan reporting.
mod tracker;

pub use fingerprint::{DeviceFingerprinter, Fingerprinter};
pub use phase::{IllegalTransition, Phase};
pub use tracker::{HttpTracker, ScanTracker, TrackError, TrackRequest, TrackResponse, TRACK_PATH};

/// Navigation capability used once the scan is recorded.
pub trait Navigator {
    /// Navigate to the provided link.
    fn navigate(&self, link: &str) -> io::Result<()>;
}

/// Payload parsing errors.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum InvalidPayload {
    /// Payload is not an absolute `http` or `https` URL.
    #[display(fmt = "payload is not an http URL")]
    Url,

    /// Payload does not point to the scan entry point.
    #[display(fmt = "payload does not point to a scan entry point")]
    Path,

    /// Payload points to a slug, which is redirected without tracking.
    #[display(fmt = "payload points to an untracked slug")]
    Untracked,
}

/// Tracked scan entry point parsed from a payload.
#[derive(Debug, PartialEq, Eq)]
pub struct ScanTarget {
    origin: Url,
    code_id: String,
}

impl ScanTarget {
    /// Parse a payload, such as `http://192.168.1.50:3000/scan/{id}`.
    pub fn from_payload(payload: &str) -> Result<Self, InvalidPayload> {
        let url = Url::parse(payload.trim()).map_err(|_| InvalidPayload::Url)?;

        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(InvalidPayload::Url);
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();

        let [scan, key] = segments.as_slice() else {
            return Err(InvalidPayload::Path);
        };

        if *scan != "scan" {
            return Err(InvalidPayload::Path);
        }

        if !common::id::looks_like_id(key) {
            return Err(InvalidPayload::Untracked);
        }

        let code_id = key.to_string();
        let mut origin = url;
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);

        Ok(Self { origin, code_id })
    }

    /// Origin of the scan entry point.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Scanned code identifier.
    pub fn code_id(&self) -> &str {
        &self.code_id
    }
}

/// Attribution flow errors.
#[derive(Debug, Display, From, Error)]
pub enum AttributionError {
    /// Flow was already started once.
    #[display(fmt = "attribution flow can only run once")]
    AlreadyRun,

    /// Code identifier does not follow the minting convention.
    #[display(fmt = "malformed code identifier")]
    MalformedId,

    /// No device signals are available.
    #[display(fmt = "unable to derive device fingerprint")]
    NoFingerprint,

    /// Tracking route is unreachable or returned an error.
    #[display(fmt = "unable to record scan: {}", _0)]
    Tracking(TrackError),

    /// Tracking route did not confirm the scan.
    #[display(fmt = "scan was not confirmed")]
    NotConfirmed,

    /// Flow attempted an illegal transition.
    Transition(IllegalTransition),

    /// Navigation to the target URL failed after the scan was recorded.
    #[display(fmt = "unable to open link: {}", _0)]
    Navigation(io::Error),
}

/// Single scan attribution flow.
pub struct Attribution<F, T, N> {
    code_id: String,
    fingerprinter: F,
    tracker: T,
    navigator: N,
    phase: Phase,
}

impl<F, T, N> Attribution<F, T, N>
where
    F: Fingerprinter,
    T: ScanTracker + Sync,
    N: Navigator,
{
    /// Create a new flow for the provided code identifier.
    pub fn new(code_id: impl Into<String>, fingerprinter: F, tracker: T, navigator: N) -> Self {
        Self {
            code_id: code_id.into(),
            fingerprinter,
            tracker,
            navigator,
            phase: Phase::Preparing,
        }
    }

    /// Current flow phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the flow, returning the link navigated to.
    ///
    /// Any failure before navigation moves the flow to [`Phase::Failed`].
    pub async fn run(&mut self) -> Result<String, AttributionError> {
        if self.phase != Phase::Preparing {
            return Err(AttributionError::AlreadyRun);
        }

        let result = self.attempt().await;

        if let Err(error) = &result {
            if let Ok(phase) = self.phase.enter(Phase::Failed) {
                self.phase = phase;
            }

            warn!(%error, code_id = %self.code_id, phase = %self.phase, "attribution failed");
        }

        result
    }

    async fn attempt(&mut self) -> Result<String, AttributionError> {
        if common::id::parse_minted(&self.code_id).is_none() {
            return Err(AttributionError::MalformedId);
        }

        self.enter(Phase::Fingerprinting)?;

        let fingerprint = self
            .fingerprinter
            .fingerprint()
            .ok_or(AttributionError::NoFingerprint)?;

        self.enter(Phase::Tracking)?;

        let response = self
            .tracker
            .track(TrackRequest {
                qr_id: &self.code_id,
                fingerprint: &fingerprint,
            })
            .await?;

        let link = match response {
            TrackResponse {
                success: true,
                link: Some(link),
            } => link,
            _ => return Err(AttributionError::NotConfirmed),
        };

        self.enter(Phase::Redirecting)?;
        self.navigator
            .navigate(&link)
            .map_err(AttributionError::Navigation)?;

        Ok(link)
    }

    fn enter(&mut self, next: Phase) -> Result<(), IllegalTransition> {
        self.phase = self.phase.enter(next)?;
        debug!(code_id = %self.code_id, phase = %self.phase, "attribution phase changed");
        Ok(())
    }
}
