//! Temporary upload credentials issued by the API.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use siray_client::Transport;
use siray_models::{SirayError, SirayResult, UploadCredentials, DEFAULT_REGION};

/// Credential issuance endpoint.
pub const STS_TOKEN_PATH: &str = "/api/model-verse/sts-token";

/// Source of single-use upload credentials.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> SirayResult<UploadCredentials>;
}

/// Fetches STS credentials through the API transport.
#[derive(Clone)]
pub struct StsBroker {
    transport: Arc<dyn Transport>,
}

impl StsBroker {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CredentialSource for StsBroker {
    async fn fetch(&self) -> SirayResult<UploadCredentials> {
        let response = self.transport.post(STS_TOKEN_PATH, None).await?;
        let credentials = parse_sts_response(&response)?;

        debug!(
            bucket = %credentials.bucket_name,
            region = %credentials.region,
            upload_path = %credentials.upload_path,
            "Fetched upload credentials"
        );
        Ok(credentials)
    }
}

/// Parse the STS response.
///
/// Both field spellings the API has used are accepted:
/// `access_key_secret`/`secret_access_key`, `security_token`/`session_token`
/// and `upload_endpoint`/`endpoint`.
pub fn parse_sts_response(response: &Value) -> SirayResult<UploadCredentials> {
    let data = non_empty_object(response.get("data"))
        .ok_or_else(|| SirayError::malformed("Invalid STS token response: missing data field"))?;

    let credentials = non_empty_object(data.get("credentials"));
    let bucket_name = first_str(data, &["bucket_name"]);
    let (credentials, bucket_name) = match (credentials, bucket_name) {
        (Some(c), Some(b)) => (c, b),
        _ => {
            return Err(SirayError::malformed(
                "Invalid STS token response: missing credentials or bucket_name",
            ))
        }
    };

    let required = |keys: &[&str]| {
        first_str(credentials, keys).ok_or_else(|| {
            SirayError::malformed(format!("Invalid STS token response: missing credentials.{}", keys[0]))
        })
    };

    Ok(UploadCredentials {
        access_key_id: required(&["access_key_id"])?,
        secret_access_key: required(&["access_key_secret", "secret_access_key"])?,
        session_token: required(&["security_token", "session_token"])?,
        region: first_str(credentials, &["region"]).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        bucket_name,
        upload_path: first_str(data, &["upload_path"]).unwrap_or_default(),
        upload_endpoint: first_str(data, &["upload_endpoint", "endpoint"]),
        access_endpoint: first_str(data, &["access_endpoint"]),
    })
}

fn non_empty_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object).filter(|o| !o.is_empty())
}

fn first_str(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| object.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
