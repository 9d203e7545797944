//! Blocking image generation with the synchronous client.
//!
//! `SIRAY_API_KEY=... cargo run -p siray --example blocking_generation`

use std::time::Duration;

use siray::blocking::Siray;
use siray::{GenerationRequest, RunOptions, SirayError};

fn main() -> Result<(), SirayError> {
    let siray = Siray::from_env()?;

    let request = GenerationRequest::new(
        "black-forest-labs/flux-1.1-pro-ultra-i2i",
        "A retro robot sketch on blueprint paper",
    )
    .with_param("image", "https://example.com/input.png")?;

    let options = RunOptions::new()
        .with_poll_interval(Duration::from_secs(2))
        .with_timeout(Duration::from_secs(120));

    match siray.image().run(&request, &options) {
        Ok(status) if status.is_completed() => {
            for url in &status.outputs {
                println!("Output: {url}");
            }
        }
        Ok(status) => println!(
            "Finished as {}: {}",
            status.status,
            status.fail_reason.as_deref().unwrap_or("-")
        ),
        Err(SirayError::Timeout { task_id, elapsed }) => {
            println!("Task {task_id} still running after {elapsed:?}");
        }
        Err(e) => return Err(e),
    }
    Ok(())
}
