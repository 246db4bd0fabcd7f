//! Post-deployment report: string interpolation and conditional fields only.

use crate::config::{DeployConfig, RESERVED_ENV_KEYS};
use crate::runpod::models::Pod;

/// Render the report shown after a successful deployment.
pub fn render(pod: &Pod, config: &DeployConfig) -> String {
    let proxy_url = format!("https://{}-11434.proxy.runpod.net", pod.id);
    let rule = "=".repeat(50);
    let mut out = String::new();

    out.push_str(&format!("\n{rule}\n"));
    out.push_str("✅ Pod deployed successfully!\n");
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("   ID:      {}\n", pod.id));
    out.push_str(&format!("   Name:    {}\n", pod.name));
    if let Some(image) = &pod.image_name {
        out.push_str(&format!("   Image:   {image}\n"));
    }
    if let Some(gpu) = &pod.gpu_type_id {
        out.push_str(&format!("   GPU:     {gpu}\n"));
    }
    if let Some(status) = &pod.desired_status {
        out.push_str(&format!("   Status:  {status}\n"));
    }
    if let Some(machine) = &pod.machine_id {
        out.push_str(&format!("   Machine: {machine}\n"));
    }
    if let Some(cost) = pod.cost_per_hr {
        out.push_str(&format!("   Cost:    ${cost:.3}/hr\n"));
    }
    if let Some(created) = pod
        .created_at
        .as_deref()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
    {
        out.push_str(&format!(
            "   Created: {}\n",
            created
                .with_timezone(&chrono::Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    out.push_str("\nConfiguration:\n");
    out.push_str(&format!("   GPU type:            {}\n", config.gpu_type));
    out.push_str(&format!(
        "   Auto-shutdown after: {} seconds of inactivity\n",
        config.timeout_secs
    ));
    out.push_str(&format!("   OLLAMA_HOST:         {}\n", config.ollama_host));
    out.push_str(&format!("   LOG_LEVEL:           {}\n", config.log_level));
    if let Some(models) = &config.preload_models {
        out.push_str(&format!("   PRELOAD_MODELS:      {models}\n"));
    }
    let pass_through = config
        .env
        .iter()
        .filter(|(key, _)| !RESERVED_ENV_KEYS.contains(&key.as_str()))
        .count();
    if pass_through > 0 {
        out.push_str(&format!(
            "   Pass-through vars:   {pass_through} from env file\n"
        ));
    }

    out.push_str("\nAccess:\n");
    out.push_str(&format!("   Ollama API endpoint: {proxy_url}/\n"));

    out.push_str("\nSample requests:\n");
    out.push_str("   # List models\n");
    out.push_str(&format!("   curl {proxy_url}/api/tags\n\n"));
    out.push_str("   # Generate text\n");
    out.push_str(&format!("   curl -X POST {proxy_url}/api/generate \\\n"));
    out.push_str("     -d '{\"model\": \"mistral\", \"prompt\": \"Hello world!\"}'\n");

    out.push_str(&format!("{rule}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pod() -> Pod {
        serde_json::from_value(serde_json::json!({
            "id": "abc123",
            "name": "Ollama-Pod",
            "imageName": "runpod/pytorch:latest",
            "desiredStatus": "RUNNING",
            "costPerHr": 0.44,
            "createdAt": "2025-03-01T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_report_includes_proxy_url_and_samples() {
        let mut config = DeployConfig::sample();
        config.timeout_secs = 120;
        config.attach_env("rpa_test", &[]);

        let report = render(&sample_pod(), &config);

        assert!(report.contains("https://abc123-11434.proxy.runpod.net/"));
        assert!(report.contains("curl https://abc123-11434.proxy.runpod.net/api/tags"));
        assert!(report.contains("/api/generate"));
        assert!(report.contains("120 seconds of inactivity"));
        assert!(report.contains("2025-03-01 12:00:00 UTC"));
    }

    #[test]
    fn test_report_skips_absent_fields() {
        let pod: Pod =
            serde_json::from_value(serde_json::json!({"id": "p1", "name": "n1"})).unwrap();
        let mut config = DeployConfig::sample();
        config.attach_env("rpa_test", &[]);

        let report = render(&pod, &config);

        assert!(!report.contains("Status:"));
        assert!(!report.contains("Cost:"));
        assert!(!report.contains("PRELOAD_MODELS"));
        assert!(!report.contains("Pass-through"));
    }

    #[test]
    fn test_report_counts_pass_through_vars() {
        let mut config = DeployConfig::sample();
        config.preload_models = Some("mistral".to_string());
        let file_vars = vec![
            ("HF_TOKEN".to_string(), "hf_abc".to_string()),
            ("EXTRA".to_string(), "1".to_string()),
        ];
        config.attach_env("rpa_test", &file_vars);

        let report = render(&sample_pod(), &config);

        assert!(report.contains("PRELOAD_MODELS:      mistral"));
        assert!(report.contains("2 from env file"));
    }
}
