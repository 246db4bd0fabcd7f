//! Provision Ollama inference pods on RunPod with inactivity auto-shutdown.
//!
//! One linear pipeline per invocation:
//!
//! 1. CLI flags and an optional `KEY=VALUE` env file become a [`DeployConfig`].
//! 2. The config maps onto the RunPod REST `POST /pods` request body.
//! 3. The API key is checked with a read-only call, then the pod is created.
//! 4. A text report with the proxy endpoint and sample requests is printed.
//!
//! The created pod shuts itself down after `INACTIVITY_TIMEOUT` seconds of
//! idleness; that supervision runs inside the pod, not in this process.
//!
//! ## Example
//!
//! ```ignore
//! use podup::runpod::models::CreatePodBody;
//! use podup::RunPod;
//!
//! let client = RunPod::new(api_key)?;
//! client.verify_api_key().await?;
//! let pod = client.deploy_pod(&CreatePodBody::from_config(&config)).await?;
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod runpod;

pub use config::DeployConfig;
pub use error::DeployError;
pub use runpod::RunPod;
