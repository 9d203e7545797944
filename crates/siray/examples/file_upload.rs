//! Upload a local file and print its public URL.
//!
//! `SIRAY_API_KEY=... cargo run -p siray --example file_upload -- ./photo.png`

use siray::{Siray, SirayResult, UploadOptions};

#[tokio::main]
async fn main() -> SirayResult<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./photo.png".to_string());

    let siray = Siray::from_env()?;
    let receipt = siray.files().upload_with(&path, &UploadOptions::new()).await?;

    println!("{} ({} bytes, {:?})", receipt.url, receipt.size, receipt.strategy);
    Ok(())
}
