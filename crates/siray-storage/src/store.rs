//! Object store seams used by the upload engine.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use siray_models::{CompletedPart, SirayResult, UploadCredentials};

/// The subset of an S3-compatible store the uploader needs.
///
/// Every call is scoped to the bucket the store was connected with.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Single-request upload of a whole file.
    async fn put_object(&self, key: &str, path: &Path, content_type: Option<&str>) -> SirayResult<()>;

    /// Open a multipart upload and return its upload id.
    async fn create_multipart_upload(&self, key: &str, content_type: Option<&str>) -> SirayResult<String>;

    /// Upload one part and return its integrity tag.
    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> SirayResult<String>;

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> SirayResult<()>;

    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> SirayResult<()>;
}

/// Builds a store client from freshly issued credentials.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, credentials: &UploadCredentials) -> SirayResult<Arc<dyn ObjectStore>>;
}
