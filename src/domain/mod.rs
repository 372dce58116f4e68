//! Domain layer - Core business logic
//!
//! Contains value objects, entities, the retry policy and domain errors.
//! This layer has no dependencies on external systems.

pub mod artifact;
pub mod config;
pub mod daemon;
pub mod duration;
pub mod error;
pub mod sync;

// Re-export common types
pub use artifact::{ArtifactId, AudioFormat, StorageSize};
pub use config::AppConfig;
pub use daemon::DaemonStatus;
pub use duration::Duration;
pub use error::*;
pub use sync::{PlannedAttempt, RetryPolicy, SyncRecord, SyncStatus, UploadOutcome};
