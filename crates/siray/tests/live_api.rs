//! Live API tests. Run with `SIRAY_API_KEY` set and `--ignored`.

use std::time::Duration;

use siray::{GenerationRequest, RunOptions, Siray};

/// Submit an image task and poll it to a terminal status.
#[tokio::test]
#[ignore = "requires SIRAY_API_KEY"]
async fn test_image_generation_round() {
    dotenvy::dotenv().ok();

    let siray = Siray::from_env().expect("Failed to create Siray client");
    let model = std::env::var("SIRAY_TEST_IMAGE_MODEL")
        .unwrap_or_else(|_| "black-forest-labs/flux-1.1-pro-ultra-i2i".to_string());

    let request = GenerationRequest::new(model, "A small red cube on a white table");
    let options = RunOptions::new()
        .with_poll_interval(Duration::from_secs(3))
        .with_timeout(Duration::from_secs(300));

    let status = siray
        .image()
        .run(&request, &options)
        .await
        .expect("Generation did not settle");

    println!("Final status: {:?}", status.status);
    assert!(status.is_terminal());
}

/// Upload a small file through STS credentials.
#[tokio::test]
#[ignore = "requires SIRAY_API_KEY"]
async fn test_upload_small_file() {
    use std::io::Write;

    dotenvy::dotenv().ok();

    let siray = Siray::from_env().expect("Failed to create Siray client");

    let mut temp_file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("Failed to create temp file");
    temp_file
        .write_all(b"Integration test content")
        .expect("Failed to write to temp file");

    let url = siray
        .files()
        .upload(temp_file.path(), None)
        .await
        .expect("Upload failed");

    println!("Uploaded to {url}");
    assert!(url.starts_with("https://") || url.starts_with("http://"));
}
