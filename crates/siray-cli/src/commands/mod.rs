//! CLI command definitions and dispatch.

pub mod generate;
pub mod status;
pub mod upload;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use siray::{CancelHandle, CancelSignal, MediaKind, Siray, SirayConfig, BASE_URL_ENV};

use crate::output::OutputFormat;

/// Siray: image and video generation from the command line
#[derive(Debug, Parser)]
#[command(name = "siray", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// API key (defaults to SIRAY_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API base URL (defaults to SIRAY_BASE_URL, then https://api.siray.ai)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate an image
    Image(generate::GenerateArgs),
    /// Generate a video
    Video(generate::GenerateArgs),
    /// Show or wait for the status of a task
    Status(status::StatusArgs),
    /// Upload a local file and print its URL
    Upload(upload::UploadArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let siray = self.client()?;
        match &self.command {
            Commands::Image(args) => generate::execute(args, &siray, MediaKind::Image, self.format).await,
            Commands::Video(args) => generate::execute(args, &siray, MediaKind::Video, self.format).await,
            Commands::Status(args) => status::execute(args, &siray, self.format).await,
            Commands::Upload(args) => upload::execute(args, &siray, self.format).await,
        }
    }

    fn client(&self) -> anyhow::Result<Siray> {
        let config = match &self.api_key {
            Some(key) => {
                let config = SirayConfig::new(key);
                match std::env::var(BASE_URL_ENV) {
                    Ok(url) if !url.trim().is_empty() => config.with_base_url(url.trim()),
                    _ => config,
                }
            }
            None => SirayConfig::from_env()?,
        };
        let config = match &self.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        };
        Ok(Siray::new(config)?)
    }
}

/// Cancellation triggered by Ctrl-C.
pub fn ctrl_c_signal() -> CancelSignal {
    let handle = CancelHandle::new();
    let signal = handle.signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, cancelling");
            handle.cancel();
        }
    });
    signal
}

/// Parse a duration in (fractional) seconds.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {s}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration {s}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_image_command() {
        let cli = Cli::try_parse_from([
            "siray", "image", "--model", "flux", "--prompt", "a cat", "--param", "size=1024x1024",
            "--param", "n=2", "--timeout", "30", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Image(args) = cli.command else {
            panic!("expected image command");
        };
        assert_eq!(args.model, "flux");
        assert_eq!(args.params.len(), 2);
        assert_eq!(args.timeout, Some(Duration::from_secs(30)));
        assert_eq!(args.poll_interval, Duration::from_secs(2));
        assert!(!args.no_wait);
    }

    #[test]
    fn test_parse_status_command() {
        let cli = Cli::try_parse_from(["siray", "status", "--kind", "video", "t-1", "--wait"]).unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("expected status command");
        };
        assert_eq!(args.kind, MediaKind::Video);
        assert_eq!(args.task_id, "t-1");
        assert!(args.wait);
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("0.5").unwrap(), Duration::from_millis(500));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }
}
