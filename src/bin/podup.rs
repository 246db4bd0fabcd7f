//! podup - deploy an Ollama inference pod on RunPod with auto-shutdown.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing_subscriber::EnvFilter;

use podup::config::{load_env_file, resolve_api_key, DeployConfig};
use podup::report;
use podup::runpod::models::{CreatePodBody, DEFAULT_PORTS};
use podup::RunPod;

/// Deploy an Ollama pod on RunPod with inactivity auto-shutdown.
#[derive(Parser)]
#[command(name = "podup", version)]
#[command(about = "Deploy an Ollama pod on RunPod with inactivity auto-shutdown")]
struct Cli {
    /// RunPod API key (or set `RUNPOD_API_KEY`).
    #[arg(long, env = "RUNPOD_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// GPU type.
    #[arg(long, default_value = "NVIDIA A40")]
    gpu_type: String,

    /// Cloud type: ALL, SECURE, or COMMUNITY.
    #[arg(long, default_value = "ALL")]
    cloud_type: String,

    /// Pod name.
    #[arg(long, default_value = "Ollama-Pod")]
    name: String,

    /// Auto-shutdown timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u32,

    /// Container disk size in GB.
    #[arg(long, default_value_t = 5)]
    container_disk_size_gb: u32,

    /// Storage volume size in GB.
    #[arg(long, default_value_t = 50)]
    volume_size_gb: u32,

    /// Container image to use.
    #[arg(long, default_value = "runpod/pytorch:latest")]
    image: String,

    /// Path to an env file with KEY=VALUE pairs for the pod.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Comma-separated models to preload (e.g. "mistral,llama2").
    #[arg(long)]
    preload_models: Option<String>,

    /// Log level, used locally and injected into the pod as LOG_LEVEL.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Ollama host interface binding inside the pod.
    #[arg(long, default_value = "0.0.0.0")]
    ollama_host: String,

    /// Minimum vCPU count.
    #[arg(long)]
    min_vcpu: Option<u32>,

    /// Minimum memory in GB.
    #[arg(long)]
    min_memory_gb: Option<u32>,

    /// Skip confirmation prompts.
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Value injected into the pod as `LOG_LEVEL`.
    fn as_pod_value(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Local tracing filter directive.
    fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level.as_filter()))
        .init();

    let file_vars = match &cli.env_file {
        Some(path) => load_env_file(path)?,
        None => Vec::new(),
    };

    // Resolved before anything touches the network.
    let api_key = resolve_api_key(&cli.api_key, &file_vars)?;

    if !api_key.starts_with("rpa_") && !confirm_unusual_api_key(cli.yes)? {
        println!("{}", "Deployment cancelled.".yellow());
        return Ok(());
    }

    let mut config = DeployConfig {
        name: cli.name.clone(),
        gpu_type: cli.gpu_type.clone(),
        cloud_type: cli.cloud_type.clone(),
        image: cli.image.clone(),
        container_disk_size_gb: cli.container_disk_size_gb,
        volume_size_gb: cli.volume_size_gb,
        timeout_secs: cli.timeout,
        ollama_host: cli.ollama_host.clone(),
        log_level: cli.log_level.as_pod_value().to_string(),
        preload_models: cli.preload_models.clone(),
        min_vcpu: cli.min_vcpu,
        min_memory_gb: cli.min_memory_gb,
        ports: DEFAULT_PORTS.to_string(),
        env: Vec::new(),
    };
    config.attach_env(&api_key, &file_vars);

    print_summary(&config, cli.env_file.as_deref());

    if !cli.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Proceed with deployment?")
            .default(true)
            .interact()?;

        if !proceed {
            println!("{}", "Deployment cancelled.".yellow());
            return Ok(());
        }
    }

    let client = RunPod::new(&api_key)?;
    client.verify_api_key().await?;

    println!("\n⏳ Deploying pod... (this may take a minute)");
    let body = CreatePodBody::from_config(&config);
    let pod = client.deploy_pod(&body).await?;

    print!("{}", report::render(&pod, &config));
    Ok(())
}

/// Warn about a key without the usual `rpa_` prefix and ask before going on.
fn confirm_unusual_api_key(yes: bool) -> Result<bool> {
    println!(
        "{}",
        "⚠️  API key does not look like a RunPod key (expected an `rpa_` prefix).".yellow()
    );

    if yes {
        return Ok(true);
    }

    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Continue with this key anyway?")
        .default(false)
        .interact()?)
}

fn print_summary(config: &DeployConfig, env_file: Option<&Path>) {
    println!("\nDeployment configuration:");
    println!("   Name:          {}", config.name);
    println!("   GPU:           {}", config.gpu_type);
    println!("   Cloud type:    {}", config.cloud_type);
    println!("   Image:         {}", config.image);
    println!(
        "   Disk/volume:   {} GB / {} GB",
        config.container_disk_size_gb, config.volume_size_gb
    );
    println!("   Auto-shutdown: {} seconds", config.timeout_secs);
    if let Some(models) = &config.preload_models {
        println!("   Preload:       {models}");
    }
    if let Some(path) = env_file {
        println!("   Env file:      {}", path.display());
    }
}
