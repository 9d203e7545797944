//! Text and JSON output for CLI commands.

use serde_json::{json, Value};

use siray::{GenerationHandle, TaskStatus, UploadReceipt};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

fn print_json(value: &Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{json}");
}

pub fn print_handle(handle: &GenerationHandle, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("Submitted task {handle}"),
        OutputFormat::Json => print_json(&json!({ "task_id": handle.task_id() })),
    }
}

pub fn print_status(status: &TaskStatus, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("task_id:  {}", status.task_id);
            println!("status:   {}", status.status);
            if let Some(progress) = &status.progress {
                println!("progress: {progress}");
            }
            if let Some(reason) = &status.fail_reason {
                println!("reason:   {reason}");
            }
            if let Some(finished) = status.finished_at() {
                println!("finished: {}", finished.to_rfc3339());
            }
            for output in &status.outputs {
                println!("output:   {output}");
            }
        }
        OutputFormat::Json => {
            print_json(&serde_json::to_value(status).unwrap_or_else(|_| json!({})));
        }
    }
}

pub fn print_upload(receipt: &UploadReceipt, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", receipt.url),
        OutputFormat::Json => print_json(&json!({
            "url": receipt.url,
            "key": receipt.key,
            "size": receipt.size,
            "strategy": receipt.strategy,
            "content_type": receipt.content_type,
            "parts": receipt.parts,
        })),
    }
}
