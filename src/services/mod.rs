//! External collaborators: document extraction and the agent directory
//!
//! Both sit behind async traits so sessions can be driven by the HTTP
//! clients in `http` or by in-memory stand-ins. Neither call is retried
//! automatically; retries are always user-initiated.

pub mod http;
pub mod uploads;

pub use http::{HttpAgentDirectory, HttpExtractionClient};
pub use uploads::{UploadBatch, UploadDocument, UploadError};

use async_trait::async_trait;

use crate::types::{RawFields, Specialist};

/// External service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Turns uploaded documents into a flat field/value map.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, batch: &UploadBatch) -> Result<RawFields, ServiceError>;
}

/// Lists the specialist agents available for workflow assignment.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn list_specialists(&self) -> Result<Vec<Specialist>, ServiceError>;
}
