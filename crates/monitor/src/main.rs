//! CI Monitor CLI
//!
//! Polls the latest GitHub Actions or GitLab CI run for a repository and
//! posts failure/recovery alerts to Slack, Discord or generic webhooks.

use anyhow::{Context, Result};
use clap::Parser;
use config::{AlertConfig, Platform, SinkTarget};
use monitor::PollLoop;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CI pipeline monitor - alerts when pipeline runs fail or recover
#[derive(Parser)]
#[command(name = "ci-monitor")]
#[command(about = "CI pipeline monitor - alerts when pipeline runs fail or recover")]
#[command(version)]
struct Cli {
    /// JSON config file; flags and environment variables override its values
    #[arg(long, env = "CI_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// CI platform (github or gitlab)
    #[arg(long, env = "CI_PLATFORM")]
    platform: Option<Platform>,

    /// API token for the platform
    #[arg(long, env = "CI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository owner, user or group
    #[arg(long, env = "CI_OWNER")]
    owner: Option<String>,

    /// Repository name
    #[arg(long, env = "CI_REPO")]
    repo: Option<String>,

    /// Webhook to notify, as a URL or kind=URL (slack, webhook, discord); repeatable
    #[arg(long = "webhook", value_name = "URL")]
    webhooks: Vec<SinkTarget>,

    /// Poll interval in seconds
    #[arg(long, env = "CI_POLL_INTERVAL")]
    interval: Option<u64>,

    /// Keep polling until interrupted
    #[arg(long)]
    continuous: bool,

    /// Timeout for each HTTP request, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// API base URL (GitHub Enterprise or self-hosted GitLab)
    #[arg(long, env = "CI_API_URL")]
    api_url: Option<String>,

    /// Log output format
    #[arg(long, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Merge flags over the optional config file.
    fn into_config(self) -> Result<AlertConfig> {
        let mut config = match &self.config {
            Some(path) => AlertConfig::from_file(path)?,
            None => AlertConfig::new(
                self.platform.context("--platform is required without --config")?,
                String::new(),
                String::new(),
                String::new(),
                Vec::new(),
            ),
        };

        if let Some(platform) = self.platform {
            config.platform = platform;
        }
        if let Some(token) = self.token {
            config.token = token;
        }
        if let Some(owner) = self.owner {
            config.owner = owner;
        }
        if let Some(repo) = self.repo {
            config.repo = repo;
        }
        if !self.webhooks.is_empty() {
            config.sinks = self.webhooks;
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if self.continuous {
            config.continuous = true;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if self.api_url.is_some() {
            config.api_base_url = self.api_url;
        }

        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }

    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.into_config().context("Invalid configuration")?;
    let mut poll_loop = PollLoop::from_config(&config).context("Invalid configuration")?;

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    let cycles = poll_loop.run(cancel).await;
    info!(cycles, "Monitor stopped");
    Ok(())
}
