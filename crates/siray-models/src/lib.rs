//! Shared data models for the Siray SDK.
//!
//! This crate provides:
//! - Generation requests, extra parameters and task handles
//! - Task status snapshots and the task state machine vocabulary
//! - Upload credentials, upload plans and multipart session bookkeeping
//! - The SDK-wide error type

pub mod error;
pub mod generation;
pub mod task;
pub mod upload;

pub use error::{ErrorKind, SirayError, SirayResult};
pub use generation::{GenerationHandle, GenerationRequest, MediaKind, ParamValue, RESERVED_PARAM_KEYS};
pub use task::{TaskState, TaskStatus};
pub use upload::{
    object_key, CompletedPart, MultipartSession, UploadCredentials, UploadPlan, UploadStrategy,
    CHUNK_SIZE, DEFAULT_REGION, MULTIPART_THRESHOLD,
};
