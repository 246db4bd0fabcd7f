//! RunPod REST API wire types and the config-to-body mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DeployConfig;

/// Exposed ports: Ollama's API, reachable through the RunPod HTTP proxy.
pub const DEFAULT_PORTS: &str = "11434/http";

/// Where the storage volume is mounted inside the container.
pub const VOLUME_MOUNT_PATH: &str = "/workspace";

/// Marketplace GPU ids that ship without an `NVIDIA` prefix.
const VENDORLESS_GPU_IDS: [&str; 3] = [
    "AMD Instinct MI300X OAM",
    "Tesla V100-SXM2-16GB",
    "Tesla V100-FHHL-16GB",
];

/// A port exposed on the pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Port number.
    pub port: u16,
    /// Protocol, uppercase (`HTTP` or `TCP`).
    pub protocol: String,
}

/// Request body for `POST /pods`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePodBody {
    /// Pod display name.
    pub name: String,
    /// Container image reference.
    pub image_name: String,
    /// Normalized GPU type id.
    pub gpu_type_id: String,
    /// Number of GPUs.
    pub gpu_count: u32,
    /// Cloud class.
    pub cloud_type: String,
    /// Container disk size in GB.
    pub container_disk_in_gb: u32,
    /// Storage volume size in GB.
    pub volume_in_gb: u32,
    /// Volume mount path inside the container.
    pub volume_mount_path: String,
    /// Minimum vCPU count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_vcpu_count: Option<u32>,
    /// Minimum memory in GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_memory_in_gb: Option<u32>,
    /// Exposed ports.
    pub ports: Vec<PortMapping>,
    /// Environment injected into the pod.
    pub env: BTreeMap<String, String>,
}

impl CreatePodBody {
    /// Map a deployment configuration onto the REST `/pods` body.
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            name: config.name.clone(),
            image_name: config.image.clone(),
            gpu_type_id: normalize_gpu_type(&config.gpu_type),
            gpu_count: 1,
            cloud_type: config.cloud_type.clone(),
            container_disk_in_gb: config.container_disk_size_gb,
            volume_in_gb: config.volume_size_gb,
            volume_mount_path: VOLUME_MOUNT_PATH.to_string(),
            min_vcpu_count: config.min_vcpu,
            min_memory_in_gb: config.min_memory_gb,
            ports: parse_port_specs(&config.ports),
            env: config.env.iter().cloned().collect(),
        }
    }
}

/// Pod returned by the REST API. The shape varies across API revisions, so
/// only `id` and `name` are required; everything else is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    /// Pod identifier.
    pub id: String,
    /// Pod display name.
    pub name: String,
    /// Container image reference.
    #[serde(default)]
    pub image_name: Option<String>,
    /// GPU type id the pod landed on.
    #[serde(default)]
    pub gpu_type_id: Option<String>,
    /// Desired status (e.g. `RUNNING`).
    #[serde(default)]
    pub desired_status: Option<String>,
    /// Hourly cost in USD.
    #[serde(default)]
    pub cost_per_hr: Option<f64>,
    /// Machine the pod was scheduled on.
    #[serde(default)]
    pub machine_id: Option<String>,
    /// Creation timestamp, RFC3339 when present.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Canonicalize a GPU type to the id form the marketplace expects.
///
/// Containment checks only, no validation: `RTX 6000 Ada` family names are
/// completed to `NVIDIA RTX 6000 Ada Generation`; any other bare id gets an
/// `NVIDIA ` prefix unless it is a known vendor-less marketplace id.
pub fn normalize_gpu_type(raw: &str) -> String {
    let gpu = raw.trim();

    if gpu.contains("RTX 6000 Ada") && !gpu.contains("Generation") {
        return "NVIDIA RTX 6000 Ada Generation".to_string();
    }

    if gpu.contains("NVIDIA") || VENDORLESS_GPU_IDS.contains(&gpu) {
        return gpu.to_string();
    }

    format!("NVIDIA {gpu}")
}

/// Parse a comma-separated `port/protocol` list. A bare port defaults to
/// TCP; entries that do not parse are skipped.
pub fn parse_port_specs(spec: &str) -> Vec<PortMapping> {
    let mut ports = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (port_str, protocol) = match entry.split_once('/') {
            Some((port, protocol)) => (port.trim(), protocol.trim().to_uppercase()),
            None => (entry, "TCP".to_string()),
        };

        match port_str.parse::<u16>() {
            Ok(port) => ports.push(PortMapping { port, protocol }),
            Err(_) => warn!(entry, "skipping unparseable port spec"),
        }
    }

    ports
}
