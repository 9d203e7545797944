//! Task status command.

use std::time::Duration;

use clap::Args;

use siray::{MediaKind, RunOptions, Siray};

use super::{ctrl_c_signal, parse_seconds};
use crate::output::{self, OutputFormat};

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Task id returned at submission
    pub task_id: String,

    /// Kind of task (image or video)
    #[arg(short, long, default_value = "image")]
    pub kind: MediaKind,

    /// Keep polling until the task settles
    #[arg(long)]
    pub wait: bool,

    /// Seconds between status queries when waiting
    #[arg(long, value_parser = parse_seconds, default_value = "2")]
    pub poll_interval: Duration,

    /// Give up waiting after this many seconds
    #[arg(long, value_parser = parse_seconds)]
    pub timeout: Option<Duration>,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, siray: &Siray, format: OutputFormat) -> anyhow::Result<()> {
    let generations = siray.generations(args.kind);

    let status = if args.wait {
        let mut options = RunOptions::new()
            .with_poll_interval(args.poll_interval)
            .with_cancel(ctrl_c_signal());
        if let Some(timeout) = args.timeout {
            options = options.with_timeout(timeout);
        }
        generations.wait(&args.task_id, &options).await?
    } else {
        generations.query_task(&args.task_id).await?
    };

    output::print_status(&status, format);
    Ok(())
}
