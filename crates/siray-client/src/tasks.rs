//! Generation task lifecycle: submit, query, and poll until terminal.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use siray_models::{GenerationHandle, GenerationRequest, MediaKind, SirayError, SirayResult, TaskStatus};

use crate::cancel::CancelSignal;
use crate::metrics::record_poll;
use crate::sleep::{Sleeper, TokioSleeper};
use crate::transport::Transport;

/// Lower bound for the delay between two status queries.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Options for [`TaskPoller::run`] and [`TaskPoller::wait`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Delay between status queries, clamped to [`MIN_POLL_INTERVAL`]
    pub poll_interval: Duration,
    /// Give up after this much time without a terminal status
    pub timeout: Option<Duration>,
    /// Stop polling when signalled
    pub cancel: Option<CancelSignal>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Poll interval actually used.
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }
}

/// Submits and tracks generation tasks of one media kind.
#[derive(Clone)]
pub struct TaskPoller {
    transport: Arc<dyn Transport>,
    kind: MediaKind,
    sleeper: Arc<dyn Sleeper>,
}

impl TaskPoller {
    pub fn new(transport: Arc<dyn Transport>, kind: MediaKind) -> Self {
        Self {
            transport,
            kind,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the suspension used between queries.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Submit a generation request.
    pub async fn submit(&self, request: &GenerationRequest) -> SirayResult<GenerationHandle> {
        let body = request.to_body()?;
        let response = self
            .transport
            .post(self.kind.generations_path(), Some(&body))
            .await?;
        let handle = GenerationHandle::from_submit_response(response)?;

        info!(
            task_id = %handle,
            kind = %self.kind,
            model = %request.model(),
            "Submitted generation task"
        );
        Ok(handle)
    }

    /// Fetch a fresh status snapshot.
    pub async fn query(&self, handle: &GenerationHandle) -> SirayResult<TaskStatus> {
        record_poll(self.kind.as_str());

        let response = self.transport.get(&self.kind.task_path(handle.task_id())).await?;
        let mut status = TaskStatus::from_response(response)?;
        if status.task_id.is_empty() {
            status.task_id = handle.task_id().to_string();
        }

        debug!(
            task_id = %status.task_id,
            status = %status.status,
            progress = status.progress.as_deref().unwrap_or("-"),
            "Task status"
        );
        Ok(status)
    }

    /// Submit a request and poll until it reaches a terminal status.
    ///
    /// The timeout is measured from the moment submission succeeds. Fails with
    /// [`SirayError::Timeout`] when `options.timeout` elapses first; the remote
    /// task keeps running and can be resumed with [`TaskPoller::wait`].
    pub async fn run(&self, request: &GenerationRequest, options: &RunOptions) -> SirayResult<TaskStatus> {
        let handle = self.submit(request).await?;
        self.wait(&handle, options).await
    }

    /// Poll an existing task until it reaches a terminal status.
    pub async fn wait(&self, handle: &GenerationHandle, options: &RunOptions) -> SirayResult<TaskStatus> {
        self.poll_until_terminal(handle, options, Instant::now()).await
    }

    async fn poll_until_terminal(
        &self,
        handle: &GenerationHandle,
        options: &RunOptions,
        started: Instant,
    ) -> SirayResult<TaskStatus> {
        let interval = options.effective_poll_interval();
        let mut polls = 0u32;

        loop {
            ensure_not_cancelled(options.cancel.as_ref(), handle)?;

            let status = self.query(handle).await?;
            polls += 1;

            if status.is_terminal() {
                info!(
                    task_id = %handle,
                    status = %status.status,
                    polls,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Task reached terminal status"
                );
                return Ok(status);
            }

            let elapsed = started.elapsed();
            if let Some(timeout) = options.timeout {
                if elapsed >= timeout {
                    warn!(
                        task_id = %handle,
                        status = %status.status,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Task did not finish before timeout"
                    );
                    return Err(SirayError::Timeout {
                        task_id: handle.task_id().to_string(),
                        elapsed,
                    });
                }
            }

            match &options.cancel {
                Some(cancel) => {
                    tokio::select! {
                        _ = self.sleeper.sleep(interval) => {}
                        _ = cancel.cancelled() => {
                            return Err(cancelled(handle));
                        }
                    }
                }
                None => self.sleeper.sleep(interval).await,
            }
        }
    }
}

fn ensure_not_cancelled(cancel: Option<&CancelSignal>, handle: &GenerationHandle) -> SirayResult<()> {
    match cancel {
        Some(signal) if signal.is_cancelled() => Err(cancelled(handle)),
        _ => Ok(()),
    }
}

fn cancelled(handle: &GenerationHandle) -> SirayError {
    info!(task_id = %handle, "Polling cancelled");
    SirayError::Cancelled(format!("polling of task {handle} was cancelled"))
}
