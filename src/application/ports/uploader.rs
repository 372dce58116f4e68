//! Upload transport port interface

use async_trait::async_trait;

use crate::domain::artifact::{ArtifactId, AudioFormat};
use crate::domain::sync::UploadOutcome;

/// Everything needed to upload one artifact
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Artifact identifier, sent as the part file name and the `filename` field
    pub artifact_id: ArtifactId,
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Detected container format (MIME type and extension)
    pub format: AudioFormat,
    /// Optional bearer credential
    pub credential: Option<String>,
}

/// Port for uploading a single artifact.
///
/// Implementations make exactly one bounded-time request and never retry;
/// every failure is folded into the returned outcome.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> UploadOutcome;
}
