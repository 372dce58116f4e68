//! Sync state domain

mod outcome;
mod policy;
mod record;
mod status;

pub use outcome::{UploadOutcome, TIMEOUT_REASON};
pub use policy::{PlannedAttempt, RetryPolicy, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_RETRIES};
pub use record::SyncRecord;
pub use status::SyncStatus;
