//! Recorded artifact domain

mod artifact_id;
mod audio_format;
mod storage_size;

pub use artifact_id::ArtifactId;
pub use audio_format::AudioFormat;
pub use storage_size::StorageSize;
