//! RunPod REST API client and wire types.

pub mod client;
pub mod models;

pub use client::RunPod;
pub use models::{CreatePodBody, Pod, PortMapping};
