//! Local payload storage port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::artifact::{ArtifactId, StorageSize};

/// Payload storage errors
#[derive(Debug, Clone, Error)]
pub enum PayloadError {
    #[error("File not found")]
    NotFound,

    #[error("Payload unreadable: {0}")]
    ReadFailed(String),

    #[error("Failed to delete payload: {0}")]
    DeleteFailed(String),

    #[error("Failed to list recordings: {0}")]
    ListFailed(String),
}

/// Port for the recorded payloads the recording subsystem leaves on disk
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Read the full payload of an artifact
    async fn read(&self, id: &ArtifactId) -> Result<Vec<u8>, PayloadError>;

    /// Delete a payload. An already absent payload is not an error.
    async fn delete(&self, id: &ArtifactId) -> Result<(), PayloadError>;

    /// Check whether a payload is present
    async fn exists(&self, id: &ArtifactId) -> bool;

    /// List the artifacts present on disk, oldest first
    async fn list(&self) -> Result<Vec<ArtifactId>, PayloadError>;

    /// Total size of all present payloads
    async fn total_size(&self) -> Result<StorageSize, PayloadError>;
}
