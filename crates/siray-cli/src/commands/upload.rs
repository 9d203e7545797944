//! File upload command.

use std::path::PathBuf;

use clap::Args;

use siray::{Siray, UploadOptions};

use super::ctrl_c_signal;
use crate::output::{self, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Override the content type guessed from the extension
    #[arg(long)]
    pub content_type: Option<String>,
}

/// Execute the upload command
pub async fn execute(args: &UploadArgs, siray: &Siray, format: OutputFormat) -> anyhow::Result<()> {
    let mut options = UploadOptions::new().with_cancel(ctrl_c_signal());
    if let Some(content_type) = &args.content_type {
        options = options.with_content_type(content_type);
    }

    let receipt = siray.files().upload_with(&args.file, &options).await?;
    output::print_upload(&receipt, format);
    Ok(())
}
