//! S3-compatible store client built from STS credentials.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart as S3CompletedPart};
use aws_sdk_s3::Client;
use tracing::debug;

use siray_client::metrics::record_store_call;
use siray_models::{CompletedPart, SirayError, SirayResult, UploadCredentials};

use crate::store::{ObjectStore, StoreConnector};
use crate::url::normalize_endpoint;

const CREDENTIALS_PROVIDER: &str = "siray-sts";

/// Store client bound to the bucket named by the credentials.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(credentials: &UploadCredentials) -> Self {
        let provider = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            Some(credentials.session_token.clone()),
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .force_path_style(true);

        if let Some(endpoint) = credentials.upload_endpoint.as_deref() {
            builder = builder.endpoint_url(normalize_endpoint(endpoint));
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: credentials.bucket_name.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn store_error(operation: &str, err: impl std::error::Error) -> SirayError {
    SirayError::store_failed(operation, DisplayErrorContext(&err).to_string())
}

async fn timed<T>(operation: &str, call: impl Future<Output = SirayResult<T>>) -> SirayResult<T> {
    let start = Instant::now();
    let result = call.await;
    record_store_call(operation, result.is_ok(), start.elapsed().as_millis() as f64);
    result
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, path: &Path, content_type: Option<&str>) -> SirayResult<()> {
        timed("PutObject", async {
            debug!("Uploading {} to {}/{}", path.display(), self.bucket, key);

            let body = ByteStream::from_path(path)
                .await
                .map_err(|e| store_error("PutObject", e))?;

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .set_content_type(content_type.map(str::to_string))
                .send()
                .await
                .map_err(|e| store_error("PutObject", e))?;

            Ok(())
        })
        .await
    }

    async fn create_multipart_upload(&self, key: &str, content_type: Option<&str>) -> SirayResult<String> {
        timed("CreateMultipartUpload", async {
            let output = self
                .client
                .create_multipart_upload()
                .bucket(&self.bucket)
                .key(key)
                .set_content_type(content_type.map(str::to_string))
                .send()
                .await
                .map_err(|e| store_error("CreateMultipartUpload", e))?;

            output
                .upload_id()
                .map(str::to_string)
                .ok_or_else(|| SirayError::store_failed("CreateMultipartUpload", "response carried no upload id"))
        })
        .await
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> SirayResult<String> {
        timed("UploadPart", async {
            let output = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(body))
                .send()
                .await
                .map_err(|e| store_error("UploadPart", e))?;

            output.e_tag().map(str::to_string).ok_or_else(|| {
                SirayError::store_failed("UploadPart", format!("part {part_number} returned no ETag"))
            })
        })
        .await
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> SirayResult<()> {
        timed("CompleteMultipartUpload", async {
            let parts: Vec<S3CompletedPart> = parts
                .iter()
                .map(|p| {
                    S3CompletedPart::builder()
                        .part_number(p.part_number)
                        .e_tag(&p.e_tag)
                        .build()
                })
                .collect();

            self.client
                .complete_multipart_upload()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .multipart_upload(CompletedMultipartUpload::builder().set_parts(Some(parts)).build())
                .send()
                .await
                .map_err(|e| store_error("CompleteMultipartUpload", e))?;

            Ok(())
        })
        .await
    }

    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> SirayResult<()> {
        timed("AbortMultipartUpload", async {
            self.client
                .abort_multipart_upload()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .send()
                .await
                .map_err(|e| store_error("AbortMultipartUpload", e))?;

            Ok(())
        })
        .await
    }
}

/// Connects [`S3Store`] clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Connector;

impl StoreConnector for S3Connector {
    fn connect(&self, credentials: &UploadCredentials) -> SirayResult<Arc<dyn ObjectStore>> {
        Ok(Arc::new(S3Store::new(credentials)))
    }
}
