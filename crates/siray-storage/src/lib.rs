//! File uploads for the Siray SDK.
//!
//! This crate provides:
//! - STS credential issuance through the API
//! - An S3-compatible store client bound to those credentials
//! - The upload engine choosing single-request or multipart transfers
//! - Public URL resolution for uploaded objects

pub mod credentials;
pub mod s3;
pub mod store;
pub mod upload;
pub mod url;

pub use credentials::{parse_sts_response, CredentialSource, StsBroker, STS_TOKEN_PATH};
pub use s3::{S3Connector, S3Store};
pub use store::{ObjectStore, StoreConnector};
pub use upload::{expand_home, UploadEngine, UploadOptions, UploadReceipt};
pub use url::resolve_object_url;
