//! Retry transient failures and report the rest by kind.
//!
//! `SIRAY_API_KEY=... cargo run -p siray --example error_handling`

use std::time::Duration;

use siray::{GenerationHandle, GenerationRequest, Siray, SirayError, SirayResult};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

async fn submit_with_retry(siray: &Siray, request: &GenerationRequest) -> SirayResult<GenerationHandle> {
    let mut attempt = 1;
    loop {
        match siray.image().generate_async(request).await {
            Ok(handle) => return Ok(handle),
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                let delay = RETRY_DELAY * attempt;
                eprintln!("Attempt {attempt} failed: {e}; retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[tokio::main]
async fn main() {
    let siray = match Siray::from_env() {
        Ok(siray) => siray,
        Err(e) => {
            eprintln!("{e}. Set SIRAY_API_KEY or pass a key explicitly.");
            std::process::exit(1);
        }
    };

    let request = match GenerationRequest::new("black-forest-labs/flux-1.1-pro-ultra-i2i", "A serene landscape")
        .with_param("image", "https://example.com/image.jpg")
    {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match submit_with_retry(&siray, &request).await {
        Ok(handle) => println!("Submitted task {handle}"),
        Err(SirayError::Authentication { message, .. }) => {
            eprintln!("Authentication failed: {message}. The API key may be invalid or expired.");
        }
        Err(SirayError::BadRequest {
            message, code, error_type, ..
        }) => {
            eprintln!("Invalid request: {message}");
            if let Some(code) = code {
                eprintln!("Error code: {code}");
            }
            if let Some(error_type) = error_type {
                eprintln!("Error type: {error_type}");
            }
        }
        Err(e) if e.is_retryable() => {
            eprintln!("Gave up after {MAX_ATTEMPTS} attempts: {e}");
        }
        Err(e) => match e.status_code() {
            Some(status) => eprintln!("API error ({status}): {}", e.message()),
            None => eprintln!("{} error: {}", e.kind(), e.message()),
        },
    }
}
