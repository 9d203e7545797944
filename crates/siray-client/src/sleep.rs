//! Suspension point used between status queries.

use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait for a duration.
///
/// The poll loop only decides *when* to wait; how the wait happens is up to
/// the implementation.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
