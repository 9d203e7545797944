//! HTTP client for the Siray generation API.
//!
//! This crate provides:
//! - The authenticated transport and HTTP error mapping
//! - Generation task submission, status queries and the polling loop
//! - Cancellation signals and the injectable sleep used between polls

pub mod cancel;
pub mod config;
pub mod metrics;
pub mod sleep;
pub mod tasks;
pub mod transport;

pub use cancel::{CancelHandle, CancelSignal};
pub use config::SirayConfig;
pub use sleep::{Sleeper, TokioSleeper};
pub use tasks::{RunOptions, TaskPoller, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use transport::{HttpTransport, Transport};
