//! Retry scheduling: eligibility, backoff and attempt order

use super::SyncRecord;
use crate::domain::artifact::ArtifactId;
use crate::domain::duration::Duration;

/// Default retry ceiling per artifact
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff table, indexed by `attempt_count - 1`
pub const DEFAULT_BACKOFF_SECS: [u64; 3] = [5, 10, 30];

/// One upload the next pass should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAttempt {
    pub artifact_id: ArtifactId,
    /// 1-based number of the attempt about to be made
    pub attempt: u32,
    /// Mandatory wait before the attempt, `None` for a first attempt
    pub delay: Option<Duration>,
}

/// Bounded retry policy with a fixed backoff table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Vec<Duration>) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> &[Duration] {
        &self.backoff
    }

    /// Whether a record may be attempted automatically
    pub fn is_eligible(&self, record: &SyncRecord) -> bool {
        record.status().is_awaiting_upload() && record.attempt_count() < self.max_retries
    }

    /// Whether a record has used up its automatic attempts
    pub fn is_exhausted(&self, record: &SyncRecord) -> bool {
        record.status().is_awaiting_upload() && record.attempt_count() >= self.max_retries
    }

    /// Delay owed before the next attempt of a record with `attempt_count`
    /// previous attempts. The last table entry repeats for later attempts.
    pub fn delay_before(&self, attempt_count: u32) -> Option<Duration> {
        if attempt_count == 0 || self.backoff.is_empty() {
            return None;
        }
        let index = (attempt_count as usize - 1).min(self.backoff.len() - 1);
        Some(self.backoff[index])
    }

    /// Eligible records in the given (insertion) order, with their delays
    pub fn plan<'a, I>(&self, records: I) -> Vec<PlannedAttempt>
    where
        I: IntoIterator<Item = &'a SyncRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.is_eligible(record))
            .map(|record| PlannedAttempt {
                artifact_id: record.artifact_id().clone(),
                attempt: record.attempt_count() + 1,
                delay: self.delay_before(record.attempt_count()),
            })
            .collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            DEFAULT_BACKOFF_SECS.iter().map(|s| Duration::from_secs(*s)).collect(),
        )
    }
}
