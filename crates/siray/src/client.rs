//! The `Siray` client and its resource namespaces.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use siray_client::{HttpTransport, RunOptions, SirayConfig, TaskPoller, Transport};
use siray_models::{GenerationHandle, GenerationRequest, MediaKind, SirayResult, TaskStatus};
use siray_storage::{UploadEngine, UploadOptions, UploadReceipt};

/// Entry point to the Siray API.
///
/// Cloning is cheap; clones share one HTTP connection pool.
#[derive(Clone)]
pub struct Siray {
    image: Generations,
    video: Generations,
    files: Files,
}

impl Siray {
    pub fn new(config: SirayConfig) -> SirayResult<Self> {
        debug!(base_url = %config.base_url, "Creating Siray client");
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    /// Build from `SIRAY_*` environment variables, loading `.env` first.
    pub fn from_env() -> SirayResult<Self> {
        dotenvy::dotenv().ok();
        Self::new(SirayConfig::from_env()?)
    }

    /// Build on a custom transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            image: Generations::new(TaskPoller::new(transport.clone(), MediaKind::Image)),
            video: Generations::new(TaskPoller::new(transport.clone(), MediaKind::Video)),
            files: Files::new(UploadEngine::with_transport(transport)),
        }
    }

    /// Image generation tasks.
    pub fn image(&self) -> &Generations {
        &self.image
    }

    /// Video generation tasks.
    pub fn video(&self) -> &Generations {
        &self.video
    }

    pub fn files(&self) -> &Files {
        &self.files
    }

    /// Namespace for a media kind chosen at runtime.
    pub fn generations(&self, kind: MediaKind) -> &Generations {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
        }
    }
}

/// Asynchronous generation tasks of one media kind.
#[derive(Clone)]
pub struct Generations {
    poller: TaskPoller,
}

impl Generations {
    pub fn new(poller: TaskPoller) -> Self {
        Self { poller }
    }

    pub fn kind(&self) -> MediaKind {
        self.poller.kind()
    }

    pub fn poller(&self) -> &TaskPoller {
        &self.poller
    }

    /// Submit a task without waiting for it.
    pub async fn generate_async(&self, request: &GenerationRequest) -> SirayResult<GenerationHandle> {
        self.poller.submit(request).await
    }

    pub async fn query_task(&self, task_id: &str) -> SirayResult<TaskStatus> {
        self.poller.query(&GenerationHandle::new(task_id)).await
    }

    /// Submit and poll until the task settles.
    pub async fn run(&self, request: &GenerationRequest, options: &RunOptions) -> SirayResult<TaskStatus> {
        self.poller.run(request, options).await
    }

    /// Poll an already submitted task until it settles.
    pub async fn wait(&self, task_id: &str, options: &RunOptions) -> SirayResult<TaskStatus> {
        self.poller.wait(&GenerationHandle::new(task_id), options).await
    }
}

/// File uploads.
#[derive(Clone)]
pub struct Files {
    engine: UploadEngine,
}

impl Files {
    pub fn new(engine: UploadEngine) -> Self {
        Self { engine }
    }

    /// Upload a local file and return its public URL.
    pub async fn upload(&self, path: impl AsRef<Path>, content_type: Option<&str>) -> SirayResult<String> {
        self.engine.upload(path, content_type).await
    }

    pub async fn upload_with(&self, path: impl AsRef<Path>, options: &UploadOptions) -> SirayResult<UploadReceipt> {
        self.engine.upload_with(path, options).await
    }
}
