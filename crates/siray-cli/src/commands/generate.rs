//! Image and video generation commands.

use std::time::Duration;

use anyhow::Context;
use clap::Args;

use siray::{GenerationRequest, MediaKind, ParamValue, RunOptions, Siray};

use super::{ctrl_c_signal, parse_seconds};
use crate::output::{self, OutputFormat};

/// Arguments for the image and video commands
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Model identifier
    #[arg(short, long)]
    pub model: String,

    /// Text prompt
    #[arg(short, long)]
    pub prompt: String,

    /// Extra model parameter; JSON values are parsed, anything else is a string
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, ParamValue)>,

    /// Seconds between status queries
    #[arg(long, value_parser = parse_seconds, default_value = "2")]
    pub poll_interval: Duration,

    /// Give up waiting after this many seconds
    #[arg(long, value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Print the task id and exit without polling
    #[arg(long)]
    pub no_wait: bool,
}

/// Execute a generation command
pub async fn execute(
    args: &GenerateArgs,
    siray: &Siray,
    kind: MediaKind,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = GenerationRequest::new(&args.model, &args.prompt)
        .with_params(args.params.iter().cloned())
        .context("invalid generation parameters")?;
    let generations = siray.generations(kind);

    if args.no_wait {
        let handle = generations.generate_async(&request).await?;
        output::print_handle(&handle, format);
        return Ok(());
    }

    let mut options = RunOptions::new()
        .with_poll_interval(args.poll_interval)
        .with_cancel(ctrl_c_signal());
    if let Some(timeout) = args.timeout {
        options = options.with_timeout(timeout);
    }

    let status = generations.run(&request, &options).await?;
    output::print_status(&status, format);

    if status.is_failed() {
        anyhow::bail!(
            "task {} failed: {}",
            status.task_id,
            status.fail_reason.as_deref().unwrap_or("no reason given")
        );
    }
    Ok(())
}

/// Parse a `key=value` parameter.
pub fn parse_param(s: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in `{s}`"));
    }
    let value = serde_json::from_str::<ParamValue>(value)
        .unwrap_or_else(|_| ParamValue::String(value.to_string()));
    Ok((key.to_string(), value))
}
