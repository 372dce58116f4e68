//! Sync record entity

use chrono::{DateTime, Utc};

use super::SyncStatus;
use crate::domain::artifact::ArtifactId;

/// Per-artifact sync bookkeeping.
///
/// Only the sync engine mutates records, through the transition methods
/// below, so `attempt_count` can only grow until an explicit re-registration
/// replaces the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    artifact_id: ArtifactId,
    status: SyncStatus,
    last_attempt_at: Option<DateTime<Utc>>,
    attempt_count: u32,
    last_error: Option<String>,
}

impl SyncRecord {
    /// Create a fresh record for a newly observed artifact
    pub fn new(artifact_id: ArtifactId) -> Self {
        Self {
            artifact_id,
            status: SyncStatus::NotSynced,
            last_attempt_at: None,
            attempt_count: 0,
            last_error: None,
        }
    }

    /// Rebuild a record from persisted fields
    pub fn from_parts(
        artifact_id: ArtifactId,
        status: SyncStatus,
        last_attempt_at: Option<DateTime<Utc>>,
        attempt_count: u32,
        last_error: Option<String>,
    ) -> Self {
        Self {
            artifact_id,
            status,
            last_attempt_at,
            attempt_count,
            last_error,
        }
    }

    pub fn artifact_id(&self) -> &ArtifactId {
        &self.artifact_id
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }

    /// Enter SYNCING for a new attempt: stamp the time and count it
    pub fn begin_attempt(&mut self, now: DateTime<Utc>) {
        self.status = SyncStatus::Syncing;
        self.last_attempt_at = Some(now);
        self.attempt_count = self.attempt_count.saturating_add(1);
    }

    /// Server acknowledged the upload
    pub fn mark_synced(&mut self) {
        self.status = SyncStatus::Synced;
        self.last_error = None;
    }

    /// Attempt failed with the given reason
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = SyncStatus::Failed;
        self.last_error = Some(reason.into());
    }
}
