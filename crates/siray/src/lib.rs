//! Client SDK for Siray image and video generation.
//!
//! ```no_run
//! use siray::{GenerationRequest, RunOptions, Siray};
//!
//! # async fn demo() -> siray::SirayResult<()> {
//! let siray = Siray::from_env()?;
//! let request = GenerationRequest::new("black-forest-labs/flux-1.1-pro", "a lighthouse at dusk")
//!     .with_param("size", "1024x1024")?;
//! let status = siray.image().run(&request, &RunOptions::new()).await?;
//! println!("{:?}", status.result());
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod client;

pub use client::{Files, Generations, Siray};

pub use siray_client::config::{API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, TIMEOUT_ENV};
pub use siray_client::{CancelHandle, CancelSignal, RunOptions, SirayConfig, Sleeper, TaskPoller, Transport};
pub use siray_models::{
    ErrorKind, GenerationHandle, GenerationRequest, MediaKind, ParamValue, SirayError, SirayResult,
    TaskState, TaskStatus, UploadStrategy,
};
pub use siray_storage::{UploadOptions, UploadReceipt};
