//! SDK error types.
//!
//! Every failure surfaced by the SDK is a [`SirayError`]. Callers that only
//! care about the category can match on [`SirayError::kind`].

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type for SDK operations.
pub type SirayResult<T> = Result<T, SirayError>;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    BadRequest,
    Server,
    Api,
    Network,
    Timeout,
    Cancelled,
    FileNotFound,
    MalformedResponse,
    CredentialFetchFailed,
    StoreRequestFailed,
    BadParameter,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Authentication => "authentication",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Server => "server",
            ErrorKind::Api => "api",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::CredentialFetchFailed => "credential_fetch_failed",
            ErrorKind::StoreRequestFailed => "store_request_failed",
            ErrorKind::BadParameter => "bad_parameter",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while talking to the Siray API or the object store.
#[derive(Debug, Error)]
pub enum SirayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Bad request ({status}): {message}")]
    BadRequest {
        status: u16,
        message: String,
        code: Option<String>,
        error_type: Option<String>,
    },

    #[error("Internal server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Task {task_id} still running after {elapsed:?}")]
    Timeout { task_id: String, elapsed: Duration },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Credential fetch failed: {source}")]
    CredentialFetchFailed {
        #[source]
        source: Box<SirayError>,
    },

    #[error("Store request {operation} failed: {message}")]
    StoreRequestFailed { operation: String, message: String },

    #[error("Invalid parameter: {0}")]
    BadParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SirayError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn bad_parameter(msg: impl Into<String>) -> Self {
        Self::BadParameter(msg.into())
    }

    pub fn store_failed(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StoreRequestFailed {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Wrap a broker failure. Malformed credential payloads are surfaced as-is.
    pub fn credential_fetch(source: SirayError) -> Self {
        match source {
            SirayError::MalformedResponse(_) | SirayError::CredentialFetchFailed { .. } => source,
            other => Self::CredentialFetchFailed {
                source: Box::new(other),
            },
        }
    }

    /// Map an HTTP error status plus the `error` object of the body.
    pub fn from_http_status(
        status: u16,
        message: impl Into<String>,
        code: Option<String>,
        error_type: Option<String>,
    ) -> Self {
        let message = message.into();
        match status {
            401 => Self::Authentication { status, message },
            400 => Self::BadRequest {
                status,
                message,
                code,
                error_type,
            },
            500 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SirayError::Configuration(_) => ErrorKind::Configuration,
            SirayError::Authentication { .. } => ErrorKind::Authentication,
            SirayError::BadRequest { .. } => ErrorKind::BadRequest,
            SirayError::Server { .. } => ErrorKind::Server,
            SirayError::Api { .. } => ErrorKind::Api,
            SirayError::Network(_) => ErrorKind::Network,
            SirayError::Timeout { .. } => ErrorKind::Timeout,
            SirayError::Cancelled(_) => ErrorKind::Cancelled,
            SirayError::FileNotFound(_) => ErrorKind::FileNotFound,
            SirayError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            SirayError::CredentialFetchFailed { .. } => ErrorKind::CredentialFetchFailed,
            SirayError::StoreRequestFailed { .. } => ErrorKind::StoreRequestFailed,
            SirayError::BadParameter(_) => ErrorKind::BadParameter,
            SirayError::Io(_) => ErrorKind::Io,
        }
    }

    /// HTTP status of the API response that produced this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SirayError::Authentication { status, .. }
            | SirayError::BadRequest { status, .. }
            | SirayError::Server { status, .. }
            | SirayError::Api { status, .. } => Some(*status),
            SirayError::CredentialFetchFailed { source } => source.status_code(),
            _ => None,
        }
    }

    /// Human-readable message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            SirayError::Authentication { message, .. }
            | SirayError::BadRequest { message, .. }
            | SirayError::Server { message, .. }
            | SirayError::Api { message, .. }
            | SirayError::StoreRequestFailed { message, .. } => message.clone(),
            SirayError::Configuration(msg)
            | SirayError::Network(msg)
            | SirayError::Cancelled(msg)
            | SirayError::FileNotFound(msg)
            | SirayError::MalformedResponse(msg)
            | SirayError::BadParameter(msg) => msg.clone(),
            SirayError::CredentialFetchFailed { source } => source.message(),
            other => other.to_string(),
        }
    }

    /// Whether a caller-side retry is likely to help. The SDK itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SirayError::Server { .. } | SirayError::Network(_))
    }
}

impl From<serde_json::Error> for SirayError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_401() {
        let err = SirayError::from_http_status(401, "Invalid API key", None, None);
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.message(), "Invalid API key");
    }

    #[test]
    fn test_from_http_status_400_keeps_code_and_type() {
        let err = SirayError::from_http_status(
            400,
            "Missing prompt",
            Some("invalid_param".into()),
            Some("invalid_request_error".into()),
        );
        match err {
            SirayError::BadRequest {
                status,
                code,
                error_type,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("invalid_param"));
                assert_eq!(error_type.as_deref(), Some("invalid_request_error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_http_status_500_is_retryable() {
        let err = SirayError::from_http_status(500, "boom", None, None);
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_http_status_other() {
        let err = SirayError::from_http_status(404, "Not found", None, None);
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_retryable());

        let err = SirayError::from_http_status(503, "Unavailable", None, None);
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[test]
    fn test_credential_fetch_wraps_api_errors() {
        let err = SirayError::credential_fetch(SirayError::from_http_status(401, "expired", None, None));
        assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn test_credential_fetch_keeps_malformed() {
        let err = SirayError::credential_fetch(SirayError::malformed("missing credentials"));
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_timeout_display() {
        let err = SirayError::Timeout {
            task_id: "t1".into(),
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("t1"));
    }
}
