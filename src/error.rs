//! Errors that can occur during a deployment run.

use thiserror::Error;

/// Everything here is terminal except the malformed env-file lines the
/// loader skips with a warning.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Missing or unusable local configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credential rejected by the verification call.
    #[error("API key rejected: {status} - {message}")]
    Auth { status: u16, message: String },

    /// API returned an error response.
    #[error("RunPod API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Connection failure, timeout, or other transport-level problem.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response was not in the expected shape.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
}
