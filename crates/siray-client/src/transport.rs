//! Authenticated HTTP transport.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};

use siray_models::{SirayError, SirayResult};

use crate::config::SirayConfig;
use crate::metrics::record_request;

/// Request/response contract the poller and the credential broker depend on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body (or none) and return the decoded response.
    async fn post(&self, path: &str, body: Option<&Value>) -> SirayResult<Value>;

    /// GET and return the decoded response.
    async fn get(&self, path: &str) -> SirayResult<Value>;
}

/// `reqwest`-backed transport with bearer authentication.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    config: SirayConfig,
}

impl HttpTransport {
    /// Create a new transport. Fails immediately when the API key is missing.
    pub fn new(config: SirayConfig) -> SirayResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("siray-rust/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SirayError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SirayResult<Self> {
        Self::new(SirayConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> SirayResult<Value> {
        let url = self.build_url(path);
        let span = info_span!("siray_request", method = %method, path = %path);

        let start = Instant::now();
        let result = async {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&self.config.api_key)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                SirayError::network(format!("Request failed: {e}"))
            })?;

            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| SirayError::network(format!("Failed to read response body: {e}")))?;

            // Bodies that are not JSON are treated as empty objects.
            let data: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Default::default()));

            if status >= 400 {
                let err = error_from_body(status, &data);
                debug!(status, error = %err, "API returned an error");
                return Err(err);
            }

            debug!(status, "API request succeeded");
            Ok(data)
        }
        .instrument(span)
        .await;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.status_code().unwrap_or(0),
        };
        record_request(method.as_str(), status, start.elapsed().as_millis() as f64);

        result
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: Option<&Value>) -> SirayResult<Value> {
        self.execute(Method::POST, path, body).await
    }

    async fn get(&self, path: &str) -> SirayResult<Value> {
        self.execute(Method::GET, path, None).await
    }
}

/// Map an error status and the body's `error` object to a typed error.
pub fn error_from_body(status: u16, body: &Value) -> SirayError {
    let error = body.get("error");
    let field = |name: &str| -> Option<String> {
        match error.and_then(|e| e.get(name)) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    };

    let message = field("message").unwrap_or_else(|| "Unknown error".to_string());
    SirayError::from_http_status(status, message, field("code"), field("type"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use siray_models::ErrorKind;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> HttpTransport {
        HttpTransport::new(SirayConfig::new("test-key").with_base_url(server.uri())).unwrap()
    }

    #[test]
    fn test_missing_key_fails_at_construction() {
        let err = HttpTransport::new(SirayConfig::new("")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_from_body_defaults_message() {
        let err = error_from_body(502, &json!({}));
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.message(), "Unknown error");
        assert_eq!(err.status_code(), Some(502));
    }

    #[tokio::test]
    async fn test_post_sends_bearer_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations/async"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({"model": "m", "prompt": "p"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let body = json!({"model": "m", "prompt": "p"});
        let response = transport
            .post("/v1/images/generations/async", Some(&body))
            .await
            .unwrap();
        assert_eq!(response["task_id"], "t1");
    }

    #[tokio::test]
    async fn test_401_maps_to_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/images/generations/async/t1"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "Invalid API key"}})),
            )
            .mount(&server)
            .await;

        let err = transport_for(&server)
            .get("/v1/images/generations/async/t1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.message(), "Invalid API key");
    }

    #[tokio::test]
    async fn test_400_carries_code_and_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "prompt is required", "code": "missing_field", "type": "invalid_request"}
            })))
            .mount(&server)
            .await;

        let err = transport_for(&server).post("/anything", None).await.unwrap_err();
        match err {
            SirayError::BadRequest {
                message,
                code,
                error_type,
                ..
            } => {
                assert_eq!(message, "prompt is required");
                assert_eq!(code.as_deref(), Some("missing_field"));
                assert_eq!(error_type.as_deref(), Some("invalid_request"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_500_with_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = transport_for(&server).get("/status").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "Unknown error");
    }

    #[tokio::test]
    async fn test_other_status_is_generic_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({"error": {"message": "slow down"}})),
            )
            .mount(&server)
            .await;

        let err = transport_for(&server).get("/status").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status_code(), Some(429));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let transport =
            HttpTransport::new(SirayConfig::new("k").with_base_url("http://127.0.0.1:1")).unwrap();
        let err = transport.get("/status").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
