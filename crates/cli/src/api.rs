use derive_more::{Display, Error, From};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::config::CliConfig;

/// Code management API errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ApiError {
    /// HTTP client error.
    Http(reqwest::Error),

    /// Server rejected the request.
    #[display(fmt = "{} ({})", message, status)]
    Rejected {
        /// Response status code.
        status: StatusCode,

        /// Error message reported by the server.
        message: String,
    },
}

/// Error body returned by the API server.
#[derive(Deserialize)]
struct ErrorBody {
    /// Error message.
    error: String,
}

/// JSON request body used to create a code.
#[derive(Serialize)]
pub(crate) struct CreateRequest<'a> {
    /// Pre-minted code identifier.
    pub id: &'a str,

    /// Code name.
    pub name: &'a str,

    /// Code description.
    pub description: Option<&'a str>,

    /// Redirect destination.
    pub target_url: &'a str,

    /// Public slug.
    pub slug: Option<&'a str>,

    /// Whether scans are recorded.
    pub tracking_enabled: bool,

    /// Style snapshot.
    pub settings: Option<Value>,

    /// Opaque creator identifier.
    pub creator_id: Option<&'a str>,
}

/// JSON response body with a newly created code.
#[derive(Deserialize)]
pub(crate) struct CreatedCode {
    /// Code identifier.
    pub id: String,

    /// Payload to embed into the printed code.
    pub payload: String,
}

/// JSON request body used to edit a code.
///
/// Missing fields are left untouched.
#[derive(Default, Serialize)]
pub(crate) struct EditRequest<'a> {
    /// New code name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,

    /// `Some(None)` clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<&'a str>>,

    /// New redirect destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<&'a str>,

    /// `Some(None)` clears the slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<Option<&'a str>>,

    /// Whether scans are recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_enabled: Option<bool>,
}

/// JSON request body used to update a single style value.
#[derive(Serialize)]
pub(crate) struct StyleRequest<'a> {
    /// Dotted style path.
    pub path: &'a str,

    /// New value.
    pub value: Value,
}

/// Complete information about a single code.
#[derive(Deserialize)]
pub(crate) struct CodeDetails {
    /// Code identifier.
    pub id: String,

    /// Public slug.
    pub slug: Option<String>,

    /// Code name.
    pub name: String,

    /// Code description.
    pub description: Option<String>,

    /// Current redirect destination.
    pub target_url: String,

    /// Whether scans are recorded.
    pub tracking_enabled: bool,

    /// Style snapshot.
    pub settings: Value,

    /// Count of recorded scans.
    pub total_scans: i64,

    /// Estimated count of distinct scanning devices.
    pub unique_scans: i64,

    /// Count of edits that changed the code.
    pub total_edits: i64,

    /// Opaque creator identifier.
    pub creator_id: Option<String>,

    /// Payload to embed into the printed code.
    pub payload: String,
}

/// JSON response body with a code payload.
#[derive(Deserialize)]
struct PayloadResponse {
    /// Payload to embed into the printed code.
    payload: String,
}

/// Code management API client.
pub(crate) struct ApiClient {
    /// Underlying HTTP client.
    client: Client,

    /// API server path without the trailing slash.
    server_path: String,
}

impl ApiClient {
    /// Create a new client for the configured API server.
    pub fn new(config: &CliConfig) -> Self {
        Self {
            client: Client::new(),
            server_path: String::from(config.server_path()),
        }
    }

    /// Create a new code.
    pub async fn create(&self, request: &CreateRequest<'_>) -> Result<CreatedCode, ApiError> {
        json(self.client.post(self.url("/codes")).json(request)).await
    }

    /// Get code details.
    pub async fn details(&self, id: &str) -> Result<CodeDetails, ApiError> {
        json(self.client.get(self.url(&format!("/codes/{id}")))).await
    }

    /// Edit code fields.
    pub async fn edit(&self, id: &str, request: &EditRequest<'_>) -> Result<CodeDetails, ApiError> {
        json(
            self.client
                .patch(self.url(&format!("/codes/{id}")))
                .json(request),
        )
        .await
    }

    /// Replace a single style value.
    pub async fn style(&self, id: &str, request: &StyleRequest<'_>) -> Result<CodeDetails, ApiError> {
        json(
            self.client
                .patch(self.url(&format!("/codes/{id}/settings")))
                .json(request),
        )
        .await
    }

    /// Delete a code with its scans.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        send(self.client.delete(self.url(&format!("/codes/{id}")))).await?;
        Ok(())
    }

    /// Get the payload to embed into the printed code.
    pub async fn payload(&self, id: &str) -> Result<String, ApiError> {
        let PayloadResponse { payload } =
            json(self.client.get(self.url(&format!("/codes/{id}/payload")))).await?;

        Ok(payload)
    }

    /// Build an absolute API URL.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_path)
    }
}

/// Send the request, converting error responses into [`ApiError::Rejected`].
async fn send(request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => String::from(status.canonical_reason().unwrap_or("request failed")),
    };

    Err(ApiError::Rejected { status, message })
}

/// Send the request and deserialize the JSON response body.
async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    Ok(send(request).await?.json().await?)
}
