//! Sync metadata store port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::artifact::ArtifactId;
use crate::domain::sync::SyncRecord;

/// Metadata persistence errors
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("Failed to serialize sync metadata: {0}")]
    SerializeFailed(String),

    #[error("Failed to write sync metadata: {0}")]
    WriteFailed(String),
}

/// Port for the durable artifact id -> sync record mapping
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Look up the record of an artifact
    async fn get(&self, id: &ArtifactId) -> Option<SyncRecord>;

    /// Insert or replace a record, keyed by its artifact id.
    ///
    /// The change is durable when this returns `Ok`. A replaced record keeps
    /// its original position in the insertion order.
    async fn put(&self, record: SyncRecord) -> Result<(), MetadataError>;

    /// Remove a record; removing an unknown id is not an error.
    async fn remove(&self, id: &ArtifactId) -> Result<(), MetadataError>;

    /// Snapshot of all records in insertion order
    async fn all_records(&self) -> Vec<SyncRecord>;
}
