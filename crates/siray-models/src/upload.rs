//! Upload credentials, plans and multipart session bookkeeping.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SirayError, SirayResult};

/// Files above this size go through multipart upload.
pub const MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Part size used for multipart uploads.
pub const CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Region used when the credential response omits one.
pub const DEFAULT_REGION: &str = "cn-bj";

/// Short-lived storage credentials for a single upload session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
    pub bucket_name: String,
    /// Key prefix objects are placed under
    pub upload_path: String,
    /// S3 API endpoint used for writes
    pub upload_endpoint: Option<String>,
    /// Public read endpoint, when distinct from the upload endpoint
    pub access_endpoint: Option<String>,
}

impl fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .field("bucket_name", &self.bucket_name)
            .field("upload_path", &self.upload_path)
            .field("upload_endpoint", &self.upload_endpoint)
            .field("access_endpoint", &self.access_endpoint)
            .finish()
    }
}

impl UploadCredentials {
    /// Object key for a local file: upload path joined with the file's base name.
    pub fn object_key_for(&self, local_path: &Path) -> SirayResult<String> {
        object_key(&self.upload_path, local_path)
    }
}

/// Join an upload prefix and a local file's base name into an object key.
///
/// The leading `/` of the prefix is dropped and separators are normalized to `/`.
pub fn object_key(upload_path: &str, local_path: &Path) -> SirayResult<String> {
    let file_name = local_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            SirayError::bad_parameter(format!(
                "cannot derive an object name from {}",
                local_path.display()
            ))
        })?;

    let prefix = upload_path.replace('\\', "/");
    let prefix = prefix.trim_start_matches('/').trim_end_matches('/');

    let key = if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{prefix}/{file_name}")
    };
    Ok(key.replace('\\', "/"))
}

/// Upload strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStrategy {
    Simple,
    Multipart,
}

/// Strategy and chunking derived from a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    pub size: u64,
    pub strategy: UploadStrategy,
    pub chunk_size: u64,
}

impl UploadPlan {
    pub fn for_size(size: u64) -> Self {
        let strategy = if size > MULTIPART_THRESHOLD {
            UploadStrategy::Multipart
        } else {
            UploadStrategy::Simple
        };
        Self {
            size,
            strategy,
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn is_multipart(&self) -> bool {
        self.strategy == UploadStrategy::Multipart
    }

    /// Number of store calls that carry file data.
    pub fn part_count(&self) -> u64 {
        match self.strategy {
            UploadStrategy::Simple => 1,
            UploadStrategy::Multipart => self.size.div_ceil(self.chunk_size),
        }
    }
}

/// A part accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    /// 1-based part number
    pub part_number: i32,
    /// Integrity tag (ETag) returned by the store
    pub e_tag: String,
}

/// Client-side view of an open multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartSession {
    pub key: String,
    pub upload_id: String,
    parts: Vec<CompletedPart>,
}

impl MultipartSession {
    pub fn new(key: impl Into<String>, upload_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            upload_id: upload_id.into(),
            parts: Vec::new(),
        }
    }

    /// Number the next part must carry.
    pub fn next_part_number(&self) -> i32 {
        self.parts.last().map(|p| p.part_number + 1).unwrap_or(1)
    }

    /// Record an uploaded part. Part numbers must be strictly increasing from 1.
    pub fn record_part(&mut self, part_number: i32, e_tag: impl Into<String>) -> SirayResult<()> {
        let expected = self.next_part_number();
        if part_number != expected {
            return Err(SirayError::bad_parameter(format!(
                "part {part_number} recorded out of order, expected {expected}"
            )));
        }
        self.parts.push(CompletedPart {
            part_number,
            e_tag: e_tag.into(),
        });
        Ok(())
    }

    pub fn parts(&self) -> &[CompletedPart] {
        &self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plan_threshold() {
        assert_eq!(UploadPlan::for_size(0).strategy, UploadStrategy::Simple);
        assert_eq!(
            UploadPlan::for_size(MULTIPART_THRESHOLD).strategy,
            UploadStrategy::Simple
        );
        let plan = UploadPlan::for_size(MULTIPART_THRESHOLD + 1);
        assert!(plan.is_multipart());
        assert_eq!(plan.part_count(), 2);
    }

    #[test]
    fn test_part_count_rounds_up() {
        assert_eq!(UploadPlan::for_size(3 * CHUNK_SIZE).part_count(), 3);
        assert_eq!(UploadPlan::for_size(3 * CHUNK_SIZE + 7).part_count(), 4);
    }

    #[test]
    fn test_object_key() {
        let path = PathBuf::from("/tmp/photos/img.png");
        assert_eq!(object_key("uploads", &path).unwrap(), "uploads/img.png");
        assert_eq!(object_key("/uploads/", &path).unwrap(), "uploads/img.png");
        assert_eq!(object_key("", &path).unwrap(), "img.png");
        assert_eq!(
            object_key("user\\42", &path).unwrap(),
            "user/42/img.png"
        );
    }

    #[test]
    fn test_object_key_without_file_name() {
        assert!(object_key("uploads", Path::new("/")).is_err());
    }

    #[test]
    fn test_session_order() {
        let mut session = MultipartSession::new("k", "u1");
        session.record_part(1, "e1").unwrap();
        session.record_part(2, "e2").unwrap();
        assert!(session.record_part(2, "again").is_err());
        assert!(session.record_part(4, "skip").is_err());
        assert_eq!(session.next_part_number(), 3);
        assert_eq!(session.parts().len(), 2);
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = UploadCredentials {
            access_key_id: "AKID".into(),
            secret_access_key: "very-secret".into(),
            session_token: "token".into(),
            region: DEFAULT_REGION.into(),
            bucket_name: "bucket".into(),
            upload_path: "uploads".into(),
            upload_endpoint: None,
            access_endpoint: None,
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("AKID"));
    }
}
