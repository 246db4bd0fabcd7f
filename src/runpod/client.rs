//! RunPod REST API client.
//!
//! One read-only call to check the credential, one write call to create the
//! pod. Transport failures are terminal; there is no retry, no backoff, and
//! no alternative request shapes.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use super::models::{CreatePodBody, Pod};
use crate::error::DeployError;

/// Base URL for the RunPod REST API.
const API_BASE_URL: &str = "https://rest.runpod.io/v1";

/// Timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// RunPod REST API client.
#[derive(Clone)]
pub struct RunPod {
    /// HTTP client.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Endpoint base URL.
    base_url: String,
}

impl RunPod {
    /// Create a client against the production endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self, DeployError> {
        Self::with_base_url(api_key, API_BASE_URL)
    }

    /// Create a client against a non-default endpoint. Used by tests.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, DeployError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Check the API key with a read-only request.
    ///
    /// Any success status with a well-formed JSON body counts as valid;
    /// anything else is an authentication error.
    pub async fn verify_api_key(&self) -> Result<(), DeployError> {
        let url = format!("{}/pods", self.base_url);
        debug!(url = %url, "verifying API key");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(DeployError::Auth {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        serde_json::from_str::<serde_json::Value>(&text).map_err(|e| {
            warn!(error = %e, "verification response is not JSON");
            DeployError::MalformedResponse(format!("verification body is not JSON: {e}"))
        })?;

        info!("API key verified");
        Ok(())
    }

    /// Submit the deployment with a single `POST /pods`.
    pub async fn deploy_pod(&self, body: &CreatePodBody) -> Result<Pod, DeployError> {
        let url = format!("{}/pods", self.base_url);
        info!(name = %body.name, gpu_type = %body.gpu_type_id, "creating pod");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(DeployError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let pod: Pod = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "unexpected pod response shape");
            DeployError::MalformedResponse(e.to_string())
        })?;

        info!(pod_id = %pod.id, "pod created");
        Ok(pod)
    }
}

/// Pull the provider's message out of an error payload when there is one,
/// otherwise fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
