//! Public URL resolution for uploaded objects.

use siray_models::UploadCredentials;

/// Public URL of an uploaded object.
///
/// Precedence: access endpoint, then upload endpoint, then the provider's
/// `{bucket}.{region}` host.
pub fn resolve_object_url(credentials: &UploadCredentials, key: &str) -> String {
    let key = key.trim_start_matches('/');

    match credentials
        .access_endpoint
        .as_deref()
        .or(credentials.upload_endpoint.as_deref())
    {
        Some(endpoint) => format!("{}/{}", normalize_endpoint(endpoint), key),
        None => format!(
            "https://{}.{}.ufileos.com/{}",
            credentials.bucket_name, credentials.region, key
        ),
    }
}

/// Add an `https://` scheme when missing and drop trailing slashes.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(upload: Option<&str>, access: Option<&str>) -> UploadCredentials {
        UploadCredentials {
            access_key_id: "AK".into(),
            secret_access_key: "SK".into(),
            session_token: "T".into(),
            region: "cn-bj".into(),
            bucket_name: "media".into(),
            upload_path: "uploads".into(),
            upload_endpoint: upload.map(String::from),
            access_endpoint: access.map(String::from),
        }
    }

    #[test]
    fn test_access_endpoint_wins() {
        let creds = credentials(Some("s3.cn-bj.ufileos.com"), Some("cdn.example.com"));
        assert_eq!(
            resolve_object_url(&creds, "uploads/img.png"),
            "https://cdn.example.com/uploads/img.png"
        );
    }

    #[test]
    fn test_upload_endpoint_fallback() {
        let creds = credentials(Some("http://s3.local:9000/"), None);
        assert_eq!(
            resolve_object_url(&creds, "uploads/img.png"),
            "http://s3.local:9000/uploads/img.png"
        );
    }

    #[test]
    fn test_bucket_region_fallback() {
        let creds = credentials(None, None);
        assert_eq!(
            resolve_object_url(&creds, "uploads/clip.mp4"),
            "https://media.cn-bj.ufileos.com/uploads/clip.mp4"
        );
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("cdn.example.com/"), "https://cdn.example.com");
        assert_eq!(normalize_endpoint("https://cdn.example.com"), "https://cdn.example.com");
    }
}
