//! Sync status of a recorded artifact

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidSyncStatusError;

/// Sync state of one artifact.
///
/// State machine:
///   NOT_SYNCED | PENDING | FAILED -> SYNCING (attempt starts)
///   SYNCING -> SYNCED (server acknowledged, payload removed)
///   SYNCING -> FAILED (server rejected or transport failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Never uploaded
    #[default]
    NotSynced,
    /// Queued for upload
    Pending,
    /// Currently uploading
    Syncing,
    /// Successfully uploaded
    Synced,
    /// Upload failed
    Failed,
}

impl SyncStatus {
    /// Get the persisted name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSynced => "not_synced",
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Failed => "failed",
        }
    }

    /// Get the text shown to the user
    pub const fn display_text(&self) -> &'static str {
        match self {
            Self::NotSynced => "Not synced",
            Self::Pending => "Pending",
            Self::Syncing => "Syncing...",
            Self::Synced => "Synced",
            Self::Failed => "Failed",
        }
    }

    /// Statuses the scheduler may pick up for another attempt
    pub const fn is_awaiting_upload(&self) -> bool {
        matches!(self, Self::NotSynced | Self::Pending | Self::Failed)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = InvalidSyncStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not_synced" => Ok(Self::NotSynced),
            "pending" => Ok(Self::Pending),
            "syncing" => Ok(Self::Syncing),
            "synced" => Ok(Self::Synced),
            "failed" => Ok(Self::Failed),
            _ => Err(InvalidSyncStatusError {
                input: s.to_string(),
            }),
        }
    }
}
