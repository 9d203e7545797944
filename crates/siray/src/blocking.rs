//! Synchronous client.
//!
//! Wraps the async client with a private current-thread runtime. Must not be
//! used from inside another tokio runtime.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use siray_client::{RunOptions, SirayConfig, Transport};
use siray_models::{GenerationHandle, GenerationRequest, MediaKind, SirayResult, TaskStatus};
use siray_storage::{UploadOptions, UploadReceipt};

use crate::client;

/// Blocking counterpart of [`crate::Siray`].
pub struct Siray {
    inner: client::Siray,
    runtime: Runtime,
}

impl Siray {
    pub fn new(config: SirayConfig) -> SirayResult<Self> {
        Ok(Self {
            inner: client::Siray::new(config)?,
            runtime: new_runtime()?,
        })
    }

    pub fn from_env() -> SirayResult<Self> {
        Ok(Self {
            inner: client::Siray::from_env()?,
            runtime: new_runtime()?,
        })
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> SirayResult<Self> {
        Ok(Self {
            inner: client::Siray::with_transport(transport),
            runtime: new_runtime()?,
        })
    }

    pub fn image(&self) -> Generations<'_> {
        self.generations(MediaKind::Image)
    }

    pub fn video(&self) -> Generations<'_> {
        self.generations(MediaKind::Video)
    }

    pub fn generations(&self, kind: MediaKind) -> Generations<'_> {
        Generations {
            inner: self.inner.generations(kind),
            runtime: &self.runtime,
        }
    }

    pub fn files(&self) -> Files<'_> {
        Files {
            inner: self.inner.files(),
            runtime: &self.runtime,
        }
    }
}

fn new_runtime() -> SirayResult<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

/// Blocking generation tasks of one media kind.
pub struct Generations<'a> {
    inner: &'a client::Generations,
    runtime: &'a Runtime,
}

impl Generations<'_> {
    pub fn generate_async(&self, request: &GenerationRequest) -> SirayResult<GenerationHandle> {
        self.runtime.block_on(self.inner.generate_async(request))
    }

    pub fn query_task(&self, task_id: &str) -> SirayResult<TaskStatus> {
        self.runtime.block_on(self.inner.query_task(task_id))
    }

    pub fn run(&self, request: &GenerationRequest, options: &RunOptions) -> SirayResult<TaskStatus> {
        self.runtime.block_on(self.inner.run(request, options))
    }

    pub fn wait(&self, task_id: &str, options: &RunOptions) -> SirayResult<TaskStatus> {
        self.runtime.block_on(self.inner.wait(task_id, options))
    }
}

/// Blocking file uploads.
pub struct Files<'a> {
    inner: &'a client::Files,
    runtime: &'a Runtime,
}

impl Files<'_> {
    pub fn upload(&self, path: impl AsRef<Path>, content_type: Option<&str>) -> SirayResult<String> {
        self.runtime.block_on(self.inner.upload(path, content_type))
    }

    pub fn upload_with(&self, path: impl AsRef<Path>, options: &UploadOptions) -> SirayResult<UploadReceipt> {
        self.runtime.block_on(self.inner.upload_with(path, options))
    }
}
