//! Deployment configuration: CLI flags plus an optional env file.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::DeployError;

/// Pod environment variables that are always set from flags. Entries with
/// these names in an env file are dropped, regardless of file order.
pub const RESERVED_ENV_KEYS: [&str; 5] = [
    "OLLAMA_HOST",
    "INACTIVITY_TIMEOUT",
    "RUNPOD_API_KEY",
    "LOG_LEVEL",
    "PRELOAD_MODELS",
];

/// Everything needed to submit one deployment request.
///
/// Lives for a single invocation; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Pod display name.
    pub name: String,
    /// GPU type as given on the command line (normalized at request-build time).
    pub gpu_type: String,
    /// Cloud class: `ALL`, `SECURE`, or `COMMUNITY`.
    pub cloud_type: String,
    /// Container image reference.
    pub image: String,
    /// Container disk size in GB.
    pub container_disk_size_gb: u32,
    /// Storage volume size in GB.
    pub volume_size_gb: u32,
    /// Seconds of idleness before the pod shuts itself down.
    pub timeout_secs: u32,
    /// Interface Ollama binds to inside the pod.
    pub ollama_host: String,
    /// `LOG_LEVEL` value injected into the pod.
    pub log_level: String,
    /// Comma-separated models to pull on startup.
    pub preload_models: Option<String>,
    /// Minimum vCPU count, if constrained.
    pub min_vcpu: Option<u32>,
    /// Minimum memory in GB, if constrained.
    pub min_memory_gb: Option<u32>,
    /// Exposed ports as a comma-separated `port/protocol` list.
    pub ports: String,
    /// Ordered pod environment, reserved keys first. Keys are unique.
    pub env: Vec<(String, String)>,
}

impl DeployConfig {
    /// Materialize the pod environment: reserved variables from flags first,
    /// then pass-through entries from the env file.
    pub fn attach_env(&mut self, api_key: &str, file_vars: &[(String, String)]) {
        let mut env = vec![
            ("OLLAMA_HOST".to_string(), self.ollama_host.clone()),
            ("INACTIVITY_TIMEOUT".to_string(), self.timeout_secs.to_string()),
            ("RUNPOD_API_KEY".to_string(), api_key.to_string()),
            ("LOG_LEVEL".to_string(), self.log_level.clone()),
        ];

        if let Some(models) = &self.preload_models {
            env.push(("PRELOAD_MODELS".to_string(), models.clone()));
        }

        for (key, value) in file_vars {
            if RESERVED_ENV_KEYS.contains(&key.as_str()) {
                continue;
            }
            env.push((key.clone(), value.clone()));
        }

        self.env = env;
    }
}

/// Pick the credential: the flag wins, then a `RUNPOD_API_KEY` entry from
/// the env file. An empty-after-trim credential is a configuration error,
/// raised before any network call.
pub fn resolve_api_key(flag: &str, file_vars: &[(String, String)]) -> Result<String, DeployError> {
    let flag = flag.trim();
    if !flag.is_empty() {
        return Ok(flag.to_string());
    }

    if let Some((_, value)) = file_vars.iter().find(|(key, _)| key == "RUNPOD_API_KEY") {
        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }

    Err(DeployError::Config(
        "no RunPod API key provided; pass --api-key, set RUNPOD_API_KEY, or add it to the env file"
            .to_string(),
    ))
}

/// Load `KEY=VALUE` pairs from a file. Blank lines and `#` comments are
/// ignored; lines without `=` are skipped with a warning, never fatal.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<Vec<(String, String)>, DeployError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        DeployError::Config(format!("cannot read env file {}: {e}", path.display()))
    })?;
    Ok(parse_env_lines(&contents))
}

fn parse_env_lines(contents: &str) -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                let key = key.trim().to_string();
                let value = value.trim().to_string();
                // Later lines override earlier ones.
                if let Some(existing) = vars.iter_mut().find(|(k, _)| *k == key) {
                    existing.1 = value;
                } else {
                    vars.push((key, value));
                }
            }
            _ => warn!(line = idx + 1, "skipping malformed env file line"),
        }
    }

    vars
}

#[cfg(test)]
impl DeployConfig {
    /// A config matching the CLI defaults, for tests.
    pub(crate) fn sample() -> Self {
        Self {
            name: "Ollama-Pod".to_string(),
            gpu_type: "NVIDIA A40".to_string(),
            cloud_type: "ALL".to_string(),
            image: "runpod/pytorch:latest".to_string(),
            container_disk_size_gb: 5,
            volume_size_gb: 50,
            timeout_secs: 60,
            ollama_host: "0.0.0.0".to_string(),
            log_level: "INFO".to_string(),
            preload_models: None,
            min_vcpu: None,
            min_memory_gb: None,
            ports: crate::runpod::models::DEFAULT_PORTS.to_string(),
            env: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_lines_skips_comments_and_blanks() {
        let vars = parse_env_lines("# comment\n\n  \nFOO=bar\n");
        assert_eq!(vars, vec![("FOO".to_string(), "bar".to_string())]);
    }

    #[test]
    fn test_parse_env_lines_skips_malformed() {
        let vars = parse_env_lines("NOEQUALS\nFOO=bar\n=nokey\nBAZ = qux value \n");
        assert_eq!(
            vars,
            vec![
                ("FOO".to_string(), "bar".to_string()),
                ("BAZ".to_string(), "qux value".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_env_lines_splits_on_first_equals() {
        let vars = parse_env_lines("URL=http://host:8080/?a=b\n");
        assert_eq!(
            vars,
            vec![("URL".to_string(), "http://host:8080/?a=b".to_string())]
        );
    }

    #[test]
    fn test_parse_env_lines_later_lines_override() {
        let vars = parse_env_lines("FOO=first\nFOO=second\n");
        assert_eq!(vars, vec![("FOO".to_string(), "second".to_string())]);
    }

    #[test]
    fn test_reserved_keys_not_overridden_by_file() {
        let mut config = DeployConfig::sample();
        let file_vars = vec![
            ("OLLAMA_HOST".to_string(), "127.0.0.1".to_string()),
            ("INACTIVITY_TIMEOUT".to_string(), "9999".to_string()),
            ("RUNPOD_API_KEY".to_string(), "rpa_stolen".to_string()),
            ("HF_TOKEN".to_string(), "hf_abc".to_string()),
            ("LOG_LEVEL".to_string(), "DEBUG".to_string()),
            ("PRELOAD_MODELS".to_string(), "llama2".to_string()),
        ];
        config.attach_env("rpa_real", &file_vars);

        let lookup = |key: &str| {
            config
                .env
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(lookup("OLLAMA_HOST"), vec!["0.0.0.0"]);
        assert_eq!(lookup("INACTIVITY_TIMEOUT"), vec!["60"]);
        assert_eq!(lookup("RUNPOD_API_KEY"), vec!["rpa_real"]);
        assert_eq!(lookup("LOG_LEVEL"), vec!["INFO"]);
        // Not set via flag, and the file must not sneak it in.
        assert!(lookup("PRELOAD_MODELS").is_empty());
        // Pass-through vars survive.
        assert_eq!(lookup("HF_TOKEN"), vec!["hf_abc"]);
    }

    #[test]
    fn test_attach_env_includes_preload_models() {
        let mut config = DeployConfig::sample();
        config.preload_models = Some("mistral,llama2".to_string());
        config.attach_env("rpa_real", &[]);

        assert!(config
            .env
            .iter()
            .any(|(k, v)| k == "PRELOAD_MODELS" && v == "mistral,llama2"));
    }

    #[test]
    fn test_resolve_api_key_flag_wins() {
        let file_vars = vec![("RUNPOD_API_KEY".to_string(), "rpa_file".to_string())];
        assert_eq!(
            resolve_api_key(" rpa_flag ", &file_vars).unwrap(),
            "rpa_flag"
        );
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_file() {
        let file_vars = vec![("RUNPOD_API_KEY".to_string(), "rpa_file".to_string())];
        assert_eq!(resolve_api_key("", &file_vars).unwrap(), "rpa_file");
    }

    #[test]
    fn test_resolve_api_key_empty_is_config_error() {
        let err = resolve_api_key("   ", &[]).unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));

        let file_vars = vec![("RUNPOD_API_KEY".to_string(), "  ".to_string())];
        let err = resolve_api_key("", &file_vars).unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));
    }
}
