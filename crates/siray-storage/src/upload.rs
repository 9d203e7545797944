//! Local file upload: credentials, strategy selection and multipart lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use siray_client::{CancelSignal, Transport};
use siray_models::{MultipartSession, SirayError, SirayResult, UploadPlan, UploadStrategy};

use crate::credentials::{CredentialSource, StsBroker};
use crate::s3::S3Connector;
use crate::store::{ObjectStore, StoreConnector};
use crate::url::resolve_object_url;

/// Per-upload options.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Overrides the type guessed from the file extension
    pub content_type: Option<String>,
    /// Checked between parts of a multipart upload
    pub cancel: Option<CancelSignal>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Outcome of a finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub url: String,
    pub key: String,
    pub size: u64,
    pub strategy: UploadStrategy,
    pub content_type: Option<String>,
    /// Number of store calls that carried file data
    pub parts: u64,
}

/// Uploads local files to the object store the API hands out credentials for.
#[derive(Clone)]
pub struct UploadEngine {
    credentials: Arc<dyn CredentialSource>,
    connector: Arc<dyn StoreConnector>,
}

impl UploadEngine {
    pub fn new(credentials: Arc<dyn CredentialSource>, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            credentials,
            connector,
        }
    }

    /// STS credentials from the API and an S3 client per upload.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(Arc::new(StsBroker::new(transport)), Arc::new(S3Connector))
    }

    /// Upload a file and return its public URL.
    pub async fn upload(
        &self,
        local_path: impl AsRef<Path>,
        content_type: Option<&str>,
    ) -> SirayResult<String> {
        let options = UploadOptions {
            content_type: content_type.map(str::to_string),
            cancel: None,
        };
        Ok(self.upload_with(local_path, &options).await?.url)
    }

    pub async fn upload_with(
        &self,
        local_path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> SirayResult<UploadReceipt> {
        let path = expand_home(local_path.as_ref());
        let size = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            _ => return Err(SirayError::FileNotFound(path.display().to_string())),
        };

        let credentials = self
            .credentials
            .fetch()
            .await
            .map_err(SirayError::credential_fetch)?;

        let key = credentials.object_key_for(&path)?;
        let content_type = options.content_type.clone().or_else(|| guess_content_type(&path));
        let plan = UploadPlan::for_size(size);
        let store = self.connector.connect(&credentials)?;

        info!(
            path = %path.display(),
            key = %key,
            size,
            strategy = ?plan.strategy,
            "Uploading file"
        );

        match plan.strategy {
            UploadStrategy::Simple => {
                store.put_object(&key, &path, content_type.as_deref()).await?;
            }
            UploadStrategy::Multipart => {
                upload_multipart(
                    store.as_ref(),
                    &key,
                    &path,
                    &plan,
                    content_type.as_deref(),
                    options.cancel.as_ref(),
                )
                .await?;
            }
        }

        let url = resolve_object_url(&credentials, &key);
        info!(url = %url, "Upload complete");

        Ok(UploadReceipt {
            url,
            key,
            size,
            strategy: plan.strategy,
            content_type,
            parts: plan.part_count(),
        })
    }
}

async fn upload_multipart(
    store: &dyn ObjectStore,
    key: &str,
    path: &Path,
    plan: &UploadPlan,
    content_type: Option<&str>,
    cancel: Option<&CancelSignal>,
) -> SirayResult<()> {
    let upload_id = store.create_multipart_upload(key, content_type).await?;
    let mut session = MultipartSession::new(key, upload_id);

    let result = match send_parts(store, &mut session, path, plan, cancel).await {
        Ok(()) => {
            store
                .complete_multipart_upload(key, &session.upload_id, session.parts())
                .await
        }
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        if let Err(abort_err) = store.abort_multipart_upload(key, &session.upload_id).await {
            warn!(
                key = %key,
                upload_id = %session.upload_id,
                error = %abort_err,
                "Failed to abort multipart upload"
            );
        }
        return Err(err);
    }

    Ok(())
}

async fn send_parts(
    store: &dyn ObjectStore,
    session: &mut MultipartSession,
    path: &Path,
    plan: &UploadPlan,
    cancel: Option<&CancelSignal>,
) -> SirayResult<()> {
    let mut file = File::open(path).await?;

    loop {
        if cancel.is_some_and(CancelSignal::is_cancelled) {
            return Err(SirayError::Cancelled(format!(
                "upload of {} cancelled",
                session.key
            )));
        }

        let chunk = read_chunk(&mut file, plan.chunk_size).await?;
        if chunk.is_empty() {
            return Ok(());
        }

        let part_number = session.next_part_number();
        let len = chunk.len();
        let e_tag = store
            .upload_part(&session.key, &session.upload_id, part_number, chunk)
            .await?;
        session.record_part(part_number, e_tag)?;

        debug!(part_number, bytes = len, "Uploaded part");
    }
}

async fn read_chunk(file: &mut File, chunk_size: u64) -> SirayResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(usize::try_from(chunk_size).unwrap_or(usize::MAX));
    file.take(chunk_size).read_to_end(&mut buf).await?;
    Ok(buf)
}

fn guess_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first().map(|m| m.essence_str().to_string())
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    expand_home_with(path, home.as_deref())
}

fn expand_home_with(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
