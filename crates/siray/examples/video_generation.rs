//! Start a video generation, check on it once, then wait for the result.
//!
//! `SIRAY_API_KEY=... cargo run -p siray --example video_generation`

use std::time::Duration;

use siray::{GenerationRequest, RunOptions, Siray, SirayResult};

#[tokio::main]
async fn main() -> SirayResult<()> {
    let siray = Siray::from_env()?;

    let request = GenerationRequest::new("your-video-model", "Time-lapse of a flower blooming")
        .with_param("duration", 5)?
        .with_param("fps", 24)?
        .with_param("resolution", "1920x1080")?;

    let handle = siray.video().generate_async(&request).await?;
    println!("Task ID: {handle}");

    let status = siray.video().query_task(handle.task_id()).await?;
    println!("Status: {} ({})", status.status, status.progress.as_deref().unwrap_or("-"));

    let options = RunOptions::new()
        .with_poll_interval(Duration::from_secs(5))
        .with_timeout(Duration::from_secs(600));
    let status = siray.video().wait(handle.task_id(), &options).await?;

    if status.is_completed() {
        for (i, url) in status.outputs.iter().enumerate() {
            println!("{}. {url}", i + 1);
        }
    } else {
        println!("Failed: {}", status.fail_reason.as_deref().unwrap_or("-"));
    }
    Ok(())
}
