//! Sync engine use case
//!
//! Tracks the upload status of every recorded artifact and runs sync passes:
//! eligible artifacts are uploaded one at a time, failures are retried with
//! bounded backoff, and a payload is deleted locally only after the server
//! acknowledged it.
//!
//! Passes are single-flight. Every trigger (registration, network transition,
//! manual request) goes through [`SyncEngine::sync_pending`]; a trigger that
//! arrives while a pass is running is dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::artifact::{ArtifactId, AudioFormat, StorageSize};
use crate::domain::sync::{PlannedAttempt, RetryPolicy, SyncRecord, SyncStatus, UploadOutcome};

use super::ports::{
    Delay, MetadataError, MetadataStore, NetworkSignal, PayloadError, PayloadStore,
    UploadRequest, Uploader,
};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 64;

/// Last error recorded when a targeted sync is refused off the preferred network
pub const WIFI_REQUIRED: &str = "WiFi required for sync";

/// Last error of a record found mid-attempt after a restart
pub const INTERRUPTED: &str = "Interrupted";

/// Configuration for the sync engine
#[derive(Debug, Clone, Default)]
pub struct SyncEngineConfig {
    /// Retry ceiling and backoff table
    pub policy: RetryPolicy,
    /// Bearer credential attached to uploads
    pub credential: Option<String>,
}

/// Why a pass did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another pass holds the single-flight flag
    AlreadyRunning,
    /// The network signal did not report the preferred network at pass start
    NotPreferredNetwork,
}

/// Tally of one completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    pub eligible: usize,
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
}

/// Result of a sync trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Skipped(SkipReason),
    Completed(PassReport),
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }

    /// Number of upload attempts made, zero when skipped
    pub fn attempted(&self) -> usize {
        self.report().map(|r| r.attempted).unwrap_or(0)
    }
}

/// What startup reconciliation changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    /// Payloads found on disk without a record
    pub discovered: usize,
    /// Records left in SYNCING by an interrupted attempt
    pub interrupted: usize,
    /// SYNCED records whose payload was still present
    pub cleaned: usize,
}

/// Change notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    PassStarted {
        eligible: usize,
    },
    StatusChanged {
        artifact_id: ArtifactId,
        status: SyncStatus,
    },
    Removed {
        artifact_id: ArtifactId,
    },
    PassFinished(PassReport),
}

/// Holds the single-flight flag for the lifetime of a pass
struct PassGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

enum AttemptResult {
    Synced,
    Failed,
    /// Record vanished or became ineligible before the attempt started
    Skipped,
}

/// Sync orchestrator
pub struct SyncEngine<U, M, P, N, D>
where
    U: Uploader,
    M: MetadataStore,
    P: PayloadStore,
    N: NetworkSignal,
    D: Delay,
{
    uploader: U,
    metadata: M,
    payloads: P,
    network: N,
    delay: D,
    config: SyncEngineConfig,
    syncing: AtomicBool,
    last_error: Mutex<Option<String>>,
    events: broadcast::Sender<SyncEvent>,
}

impl<U, M, P, N, D> SyncEngine<U, M, P, N, D>
where
    U: Uploader,
    M: MetadataStore,
    P: PayloadStore,
    N: NetworkSignal,
    D: Delay,
{
    /// Create a new sync engine
    pub fn new(
        uploader: U,
        metadata: M,
        payloads: P,
        network: N,
        delay: D,
        config: SyncEngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            uploader,
            metadata,
            payloads,
            network,
            delay,
            config,
            syncing: AtomicBool::new(false),
            last_error: Mutex::new(None),
            events,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.config.policy
    }

    /// Subscribe to status and pass notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Whether a pass is currently running
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Most recent failure message of the current or last pass
    pub fn last_sync_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Sync status of an artifact; unknown artifacts are NOT_SYNCED
    pub async fn status(&self, id: &ArtifactId) -> SyncStatus {
        self.metadata
            .get(id)
            .await
            .map(|r| r.status())
            .unwrap_or_default()
    }

    pub async fn record(&self, id: &ArtifactId) -> Option<SyncRecord> {
        self.metadata.get(id).await
    }

    /// All records in insertion order
    pub async fn records(&self) -> Vec<SyncRecord> {
        self.metadata.all_records().await
    }

    /// Number of records not yet synced
    pub async fn pending_count(&self) -> usize {
        self.metadata
            .all_records()
            .await
            .iter()
            .filter(|r| !r.is_synced())
            .count()
    }

    /// Whether the artifact's payload is on disk
    pub async fn has_payload(&self, id: &ArtifactId) -> bool {
        self.payloads.exists(id).await
    }

    /// Total size of payloads still on disk
    pub async fn storage_used(&self) -> StorageSize {
        self.payloads.total_size().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to compute local storage usage");
            StorageSize::default()
        })
    }

    /// Create a NOT_SYNCED record unless one already exists.
    /// Returns whether a record was created.
    pub async fn register(&self, id: ArtifactId) -> bool {
        if self.metadata.get(&id).await.is_some() {
            debug!(artifact_id = %id, "artifact already registered");
            return false;
        }

        info!(artifact_id = %id, "registering artifact");
        let _ = self.persist(SyncRecord::new(id)).await;
        true
    }

    /// Recording subsystem notification: a new artifact was recorded
    pub async fn on_artifact_created(&self, id: ArtifactId) -> PassOutcome {
        self.register(id).await;
        self.sync_pending().await
    }

    /// Explicit re-registration: start the artifact over with a fresh record
    pub async fn reregister(&self, id: ArtifactId) {
        info!(artifact_id = %id, "re-registering artifact");
        let _ = self.persist(SyncRecord::new(id)).await;
    }

    /// Recording subsystem notification: the user deleted an artifact
    pub async fn on_artifact_deleted_by_user(&self, id: &ArtifactId) {
        if let Err(e) = self.metadata.remove(id).await {
            error!(artifact_id = %id, error = %e, "failed to remove sync record");
        }
        info!(artifact_id = %id, "removed sync record");
        self.emit(SyncEvent::Removed {
            artifact_id: id.clone(),
        });
    }

    /// Delete an artifact's payload and its record
    pub async fn delete_artifact(&self, id: &ArtifactId) -> Result<(), PayloadError> {
        self.payloads.delete(id).await?;
        self.on_artifact_deleted_by_user(id).await;
        Ok(())
    }

    /// Register every payload on disk that has no record yet.
    /// Returns the newly registered artifacts.
    pub async fn discover(&self) -> Vec<ArtifactId> {
        let ids = match self.payloads.list().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "failed to scan recordings");
                return Vec::new();
            }
        };

        let mut registered = Vec::new();
        for id in ids {
            if self.register(id.clone()).await {
                registered.push(id);
            }
        }
        registered
    }

    /// Startup consistency pass: repair records a crash may have left behind
    /// and pick up payloads that have no record.
    pub async fn reconcile(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // A running pass owns SYNCING records; only repair them when idle.
        if let Some(_guard) = PassGuard::acquire(&self.syncing) {
            for mut record in self.metadata.all_records().await {
                match record.status() {
                    SyncStatus::Syncing => {
                        warn!(artifact_id = %record.artifact_id(), "attempt was interrupted");
                        record.mark_failed(INTERRUPTED);
                        let _ = self.persist(record).await;
                        report.interrupted += 1;
                    }
                    SyncStatus::Synced if self.payloads.exists(record.artifact_id()).await => {
                        self.remove_payload(record.artifact_id()).await;
                        report.cleaned += 1;
                    }
                    _ => {}
                }
            }
        }

        report.discovered = self.discover().await.len();
        info!(
            discovered = report.discovered,
            interrupted = report.interrupted,
            cleaned = report.cleaned,
            "reconciled sync metadata"
        );
        report
    }

    /// Presentation layer request to sync now
    pub async fn trigger_manual_sync(&self) -> PassOutcome {
        info!("manual sync triggered");
        self.sync_pending().await
    }

    /// Run a pass over every eligible artifact
    pub async fn sync_pending(&self) -> PassOutcome {
        self.run_pass(None).await
    }

    /// Run a pass restricted to one artifact
    pub async fn sync_artifact(&self, id: &ArtifactId) -> PassOutcome {
        self.run_pass(Some(id)).await
    }

    async fn run_pass(&self, only: Option<&ArtifactId>) -> PassOutcome {
        let Some(_guard) = PassGuard::acquire(&self.syncing) else {
            debug!("sync pass already running, skipping");
            return PassOutcome::Skipped(SkipReason::AlreadyRunning);
        };

        if !self.network.is_preferred() {
            debug!("not on preferred network, skipping sync pass");
            if only.is_some() {
                self.set_last_error(Some(WIFI_REQUIRED.to_string()));
            }
            return PassOutcome::Skipped(SkipReason::NotPreferredNetwork);
        }

        self.set_last_error(None);

        let records = self.metadata.all_records().await;
        let plan = self.config.policy.plan(
            records
                .iter()
                .filter(|r| only.map_or(true, |id| r.artifact_id() == id)),
        );

        for record in records.iter().filter(|r| self.config.policy.is_exhausted(r)) {
            debug!(artifact_id = %record.artifact_id(), attempts = record.attempt_count(), "retry ceiling reached");
        }

        let mut report = PassReport {
            eligible: plan.len(),
            ..Default::default()
        };

        info!(eligible = report.eligible, "starting sync pass");
        self.emit(SyncEvent::PassStarted {
            eligible: report.eligible,
        });

        for planned in &plan {
            if let Some(delay) = planned.delay {
                info!(
                    artifact_id = %planned.artifact_id,
                    attempt = planned.attempt,
                    delay = %delay,
                    "waiting before retry"
                );
                self.delay.sleep(delay).await;
            }

            match self.attempt(planned).await {
                AttemptResult::Synced => {
                    report.attempted += 1;
                    report.synced += 1;
                }
                AttemptResult::Failed => {
                    report.attempted += 1;
                    report.failed += 1;
                }
                AttemptResult::Skipped => {}
            }
        }

        info!(
            attempted = report.attempted,
            synced = report.synced,
            failed = report.failed,
            "sync pass finished"
        );
        self.emit(SyncEvent::PassFinished(report));

        PassOutcome::Completed(report)
    }

    async fn attempt(&self, planned: &PlannedAttempt) -> AttemptResult {
        let id = &planned.artifact_id;

        // Re-read: the record may have been deleted or re-registered meanwhile
        let Some(mut record) = self
            .metadata
            .get(id)
            .await
            .filter(|r| self.config.policy.is_eligible(r))
        else {
            debug!(artifact_id = %id, "artifact no longer eligible, skipping");
            return AttemptResult::Skipped;
        };

        record.begin_attempt(Utc::now());
        // An attempt only counts once it is on disk; never upload an unrecorded one
        if let Err(e) = self.persist(record.clone()).await {
            return self.fail(record, e.to_string()).await;
        }

        info!(
            artifact_id = %id,
            attempt = record.attempt_count(),
            max_retries = self.config.policy.max_retries(),
            "uploading"
        );

        let payload = match self.payloads.read(id).await {
            Ok(payload) => payload,
            Err(e) => return self.fail(record, e.to_string()).await,
        };

        let request = UploadRequest {
            artifact_id: id.clone(),
            payload,
            format: AudioFormat::of(id),
            credential: self.config.credential.clone(),
        };

        match self.uploader.upload(request).await {
            UploadOutcome::Success => {
                record.mark_synced();
                let recorded = self.persist(record).await;
                info!(artifact_id = %id, "upload succeeded");
                match recorded {
                    Ok(()) => self.remove_payload(id).await,
                    Err(_) => warn!(artifact_id = %id, "sync not recorded, keeping local payload"),
                }
                AttemptResult::Synced
            }
            outcome => {
                if let UploadOutcome::ServerRejected { status, body } = &outcome {
                    debug!(artifact_id = %id, status, body = %body, "server rejected upload");
                }
                let message = outcome.failure_message().unwrap_or_default();
                self.fail(record, message).await
            }
        }
    }

    async fn fail(&self, mut record: SyncRecord, message: String) -> AttemptResult {
        warn!(
            artifact_id = %record.artifact_id(),
            attempt = record.attempt_count(),
            error = %message,
            "upload failed"
        );
        record.mark_failed(message.clone());
        let _ = self.persist(record).await;
        self.set_last_error(Some(message));
        AttemptResult::Failed
    }

    /// Write a record through to the store and announce its status
    async fn persist(&self, record: SyncRecord) -> Result<(), MetadataError> {
        let artifact_id = record.artifact_id().clone();
        let status = record.status();

        let result = self.metadata.put(record).await;
        if let Err(e) = &result {
            error!(artifact_id = %artifact_id, error = %e, "failed to persist sync record");
        }

        self.emit(SyncEvent::StatusChanged {
            artifact_id,
            status,
        });
        result
    }

    /// Post-sync cleanup; failures are logged, never retried
    async fn remove_payload(&self, id: &ArtifactId) {
        match self.payloads.delete(id).await {
            Ok(()) => debug!(artifact_id = %id, "deleted local payload after sync"),
            Err(e) => warn!(artifact_id = %id, error = %e, "failed to delete local payload after sync"),
        }
    }

    fn set_last_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = message;
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl<U, M, P, N, D> SyncEngine<U, M, P, N, D>
where
    U: Uploader + 'static,
    M: MetadataStore + 'static,
    P: PayloadStore + 'static,
    N: NetworkSignal + 'static,
    D: Delay + 'static,
{
    /// Start a pass whenever the network signal switches to preferred.
    ///
    /// The value observed when this is called never triggers a pass.
    pub fn spawn_network_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut changes = engine.network.subscribe();
        let mut was_preferred = *changes.borrow_and_update();

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let preferred = *changes.borrow_and_update();
                if preferred && !was_preferred {
                    info!("preferred network available, starting sync");
                    let engine = Arc::clone(&engine);
                    tokio::spawn(async move {
                        engine.sync_pending().await;
                    });
                } else if !preferred && was_preferred {
                    info!("left preferred network");
                }
                was_preferred = preferred;
            }
            debug!("network signal closed, watcher exiting");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duration::Duration;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{watch, Notify};

    #[derive(Clone, Default)]
    struct MockUploader {
        calls: Arc<AtomicUsize>,
        reject: bool,
    }

    #[async_trait]
    impl Uploader for MockUploader {
        async fn upload(&self, _request: UploadRequest) -> UploadOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                UploadOutcome::ServerRejected {
                    status: 503,
                    body: String::new(),
                }
            } else {
                UploadOutcome::Success
            }
        }
    }

    /// Blocks inside the upload until released
    #[derive(Clone, Default)]
    struct GatedUploader {
        calls: Arc<AtomicUsize>,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Uploader for GatedUploader {
        async fn upload(&self, _request: UploadRequest) -> UploadOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            UploadOutcome::Success
        }
    }

    #[derive(Clone, Default)]
    struct MockMetadata {
        records: Arc<Mutex<Vec<SyncRecord>>>,
        writes: Arc<AtomicUsize>,
        /// Writes of this status update the table but report a failure
        fail_on: Option<SyncStatus>,
    }

    #[async_trait]
    impl MetadataStore for MockMetadata {
        async fn get(&self, id: &ArtifactId) -> Option<SyncRecord> {
            let records = self.records.lock().unwrap();
            records.iter().find(|r| r.artifact_id() == id).cloned()
        }

        async fn put(&self, record: SyncRecord) -> Result<(), MetadataError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let status = record.status();
            let mut records = self.records.lock().unwrap();
            match records
                .iter_mut()
                .find(|r| r.artifact_id() == record.artifact_id())
            {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
            if self.fail_on == Some(status) {
                return Err(MetadataError::WriteFailed("read-only".to_string()));
            }
            Ok(())
        }

        async fn remove(&self, id: &ArtifactId) -> Result<(), MetadataError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().retain(|r| r.artifact_id() != id);
            Ok(())
        }

        async fn all_records(&self) -> Vec<SyncRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[derive(Clone, Default)]
    struct MockPayloads {
        files: Arc<Mutex<HashMap<ArtifactId, Vec<u8>>>>,
    }

    impl MockPayloads {
        fn with(ids: &[&str]) -> Self {
            let payloads = Self::default();
            for name in ids {
                payloads
                    .files
                    .lock()
                    .unwrap()
                    .insert(ArtifactId::new(*name).unwrap(), vec![1, 2, 3]);
            }
            payloads
        }

        fn contains(&self, name: &str) -> bool {
            self.files
                .lock()
                .unwrap()
                .contains_key(&ArtifactId::new(name).unwrap())
        }
    }

    #[async_trait]
    impl PayloadStore for MockPayloads {
        async fn read(&self, id: &ArtifactId) -> Result<Vec<u8>, PayloadError> {
            self.files
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or(PayloadError::NotFound)
        }

        async fn delete(&self, id: &ArtifactId) -> Result<(), PayloadError> {
            self.files.lock().unwrap().remove(id);
            Ok(())
        }

        async fn exists(&self, id: &ArtifactId) -> bool {
            self.files.lock().unwrap().contains_key(id)
        }

        async fn list(&self) -> Result<Vec<ArtifactId>, PayloadError> {
            let mut ids: Vec<ArtifactId> = self.files.lock().unwrap().keys().cloned().collect();
            ids.sort();
            Ok(ids)
        }

        async fn total_size(&self) -> Result<StorageSize, PayloadError> {
            let files = self.files.lock().unwrap();
            Ok(StorageSize::from_bytes(
                files.values().map(|f| f.len() as u64).sum(),
            ))
        }
    }

    struct MockNetwork {
        tx: watch::Sender<bool>,
    }

    impl MockNetwork {
        fn new(preferred: bool) -> Self {
            Self {
                tx: watch::channel(preferred).0,
            }
        }
    }

    impl NetworkSignal for MockNetwork {
        fn is_preferred(&self) -> bool {
            *self.tx.borrow()
        }

        fn subscribe(&self) -> watch::Receiver<bool> {
            self.tx.subscribe()
        }
    }

    struct NoDelay;

    #[async_trait]
    impl Delay for NoDelay {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn id(name: &str) -> ArtifactId {
        ArtifactId::new(name).unwrap()
    }

    fn engine<U: Uploader>(
        uploader: U,
        metadata: MockMetadata,
        payloads: MockPayloads,
        preferred: bool,
    ) -> SyncEngine<U, MockMetadata, MockPayloads, MockNetwork, NoDelay> {
        SyncEngine::new(
            uploader,
            metadata,
            payloads,
            MockNetwork::new(preferred),
            NoDelay,
            SyncEngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let metadata = MockMetadata::default();
        let engine = engine(
            MockUploader {
                reject: true,
                ..Default::default()
            },
            metadata.clone(),
            MockPayloads::with(&["a.m4a"]),
            true,
        );

        assert!(engine.register(id("a.m4a")).await);
        engine.sync_pending().await;
        assert!(!engine.register(id("a.m4a")).await);

        let records = metadata.all_records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attempt_count(), 1);
    }

    #[tokio::test]
    async fn unknown_artifact_reports_not_synced() {
        let engine = engine(
            MockUploader::default(),
            MockMetadata::default(),
            MockPayloads::default(),
            true,
        );
        assert_eq!(engine.status(&id("nope.m4a")).await, SyncStatus::NotSynced);
    }

    #[tokio::test]
    async fn gate_blocks_pass_without_mutation() {
        let metadata = MockMetadata::default();
        let uploader = MockUploader::default();
        let engine = engine(
            uploader.clone(),
            metadata.clone(),
            MockPayloads::with(&["a.m4a"]),
            false,
        );
        engine.register(id("a.m4a")).await;
        let writes_before = metadata.writes.load(Ordering::SeqCst);

        let outcome = engine.sync_pending().await;

        assert_eq!(
            outcome,
            PassOutcome::Skipped(SkipReason::NotPreferredNetwork)
        );
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
        assert_eq!(metadata.writes.load(Ordering::SeqCst), writes_before);
        assert!(!engine.is_syncing());
    }

    #[tokio::test]
    async fn second_trigger_during_pass_is_dropped() {
        let uploader = GatedUploader::default();
        let engine = Arc::new(engine(
            uploader.clone(),
            MockMetadata::default(),
            MockPayloads::with(&["a.m4a"]),
            true,
        ));
        engine.register(id("a.m4a")).await;

        let first = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.trigger_manual_sync().await }
        });
        uploader.started.notified().await;
        assert!(engine.is_syncing());

        let second = engine.trigger_manual_sync().await;
        assert_eq!(second, PassOutcome::Skipped(SkipReason::AlreadyRunning));

        uploader.release.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first.attempted(), 1);
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert!(!engine.is_syncing());
    }

    #[tokio::test]
    async fn success_marks_synced_and_deletes_payload() {
        let payloads = MockPayloads::with(&["a.m4a"]);
        let engine = engine(
            MockUploader::default(),
            MockMetadata::default(),
            payloads.clone(),
            true,
        );

        let outcome = engine.on_artifact_created(id("a.m4a")).await;

        assert_eq!(outcome.report().map(|r| r.synced), Some(1));
        assert_eq!(engine.status(&id("a.m4a")).await, SyncStatus::Synced);
        assert!(!payloads.contains("a.m4a"));
        assert_eq!(engine.pending_count().await, 0);
    }

    #[tokio::test]
    async fn failure_keeps_payload_and_records_error() {
        let payloads = MockPayloads::with(&["a.m4a"]);
        let engine = engine(
            MockUploader {
                reject: true,
                ..Default::default()
            },
            MockMetadata::default(),
            payloads.clone(),
            true,
        );

        engine.on_artifact_created(id("a.m4a")).await;

        let record = engine.record(&id("a.m4a")).await.unwrap();
        assert_eq!(record.status(), SyncStatus::Failed);
        assert_eq!(record.last_error(), Some("Server error: 503"));
        assert!(payloads.contains("a.m4a"));
        assert_eq!(engine.last_sync_error().as_deref(), Some("Server error: 503"));
        assert_eq!(engine.pending_count().await, 1);
    }

    #[tokio::test]
    async fn unrecorded_attempt_is_not_uploaded() {
        let uploader = MockUploader::default();
        let payloads = MockPayloads::with(&["a.m4a"]);
        let metadata = MockMetadata {
            fail_on: Some(SyncStatus::Syncing),
            ..Default::default()
        };
        let engine = engine(uploader.clone(), metadata, payloads.clone(), true);
        engine.register(id("a.m4a")).await;

        let outcome = engine.sync_pending().await;

        assert_eq!(outcome.report().map(|r| r.failed), Some(1));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
        let record = engine.record(&id("a.m4a")).await.unwrap();
        assert_eq!(record.status(), SyncStatus::Failed);
        assert_eq!(record.attempt_count(), 1);
        assert_eq!(
            record.last_error(),
            Some("Failed to write sync metadata: read-only")
        );
        assert!(payloads.contains("a.m4a"));
    }

    #[tokio::test]
    async fn payload_kept_when_sync_is_not_recorded() {
        let uploader = MockUploader::default();
        let payloads = MockPayloads::with(&["a.m4a"]);
        let metadata = MockMetadata {
            fail_on: Some(SyncStatus::Synced),
            ..Default::default()
        };
        let engine = engine(uploader.clone(), metadata, payloads.clone(), true);

        let outcome = engine.on_artifact_created(id("a.m4a")).await;

        assert_eq!(outcome.report().map(|r| r.synced), Some(1));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert!(payloads.contains("a.m4a"));
    }

    #[tokio::test]
    async fn missing_payload_fails_attempt_and_pass_continues() {
        let payloads = MockPayloads::with(&["b.m4a"]);
        let engine = engine(
            MockUploader::default(),
            MockMetadata::default(),
            payloads,
            true,
        );
        engine.register(id("a.m4a")).await;
        engine.register(id("b.m4a")).await;

        let outcome = engine.sync_pending().await;

        let report = outcome.report().copied().unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.synced, 1);
        let record = engine.record(&id("a.m4a")).await.unwrap();
        assert_eq!(record.last_error(), Some("File not found"));
        assert_eq!(engine.status(&id("b.m4a")).await, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn targeted_sync_off_network_sets_wifi_error() {
        let engine = engine(
            MockUploader::default(),
            MockMetadata::default(),
            MockPayloads::with(&["a.m4a"]),
            false,
        );
        engine.register(id("a.m4a")).await;

        let outcome = engine.sync_artifact(&id("a.m4a")).await;

        assert_eq!(
            outcome,
            PassOutcome::Skipped(SkipReason::NotPreferredNetwork)
        );
        assert_eq!(engine.last_sync_error().as_deref(), Some(WIFI_REQUIRED));
    }

    #[tokio::test]
    async fn targeted_sync_only_touches_one_artifact() {
        let uploader = MockUploader::default();
        let engine = engine(
            uploader.clone(),
            MockMetadata::default(),
            MockPayloads::with(&["a.m4a", "b.m4a"]),
            true,
        );
        engine.register(id("a.m4a")).await;
        engine.register(id("b.m4a")).await;

        engine.sync_artifact(&id("b.m4a")).await;

        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.status(&id("a.m4a")).await, SyncStatus::NotSynced);
        assert_eq!(engine.status(&id("b.m4a")).await, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn reregister_resets_attempts() {
        let engine = engine(
            MockUploader {
                reject: true,
                ..Default::default()
            },
            MockMetadata::default(),
            MockPayloads::with(&["a.m4a"]),
            true,
        );
        engine.register(id("a.m4a")).await;
        engine.sync_pending().await;
        engine.sync_pending().await;

        engine.reregister(id("a.m4a")).await;

        let record = engine.record(&id("a.m4a")).await.unwrap();
        assert_eq!(record.status(), SyncStatus::NotSynced);
        assert_eq!(record.attempt_count(), 0);
    }

    #[tokio::test]
    async fn delete_removes_payload_and_record() {
        let payloads = MockPayloads::with(&["a.m4a"]);
        let engine = engine(
            MockUploader::default(),
            MockMetadata::default(),
            payloads.clone(),
            false,
        );
        engine.register(id("a.m4a")).await;

        engine.delete_artifact(&id("a.m4a")).await.unwrap();

        assert!(engine.record(&id("a.m4a")).await.is_none());
        assert!(!payloads.contains("a.m4a"));
    }

    #[tokio::test]
    async fn reconcile_repairs_interrupted_and_synced_records() {
        let metadata = MockMetadata::default();
        let payloads = MockPayloads::with(&["done.m4a", "new.wav"]);
        metadata
            .put(SyncRecord::from_parts(
                id("stuck.m4a"),
                SyncStatus::Syncing,
                None,
                1,
                None,
            ))
            .await
            .unwrap();
        metadata
            .put(SyncRecord::from_parts(
                id("done.m4a"),
                SyncStatus::Synced,
                None,
                1,
                None,
            ))
            .await
            .unwrap();
        let engine = engine(MockUploader::default(), metadata, payloads.clone(), false);

        let report = engine.reconcile().await;

        assert_eq!(
            report,
            ReconcileReport {
                discovered: 1,
                interrupted: 1,
                cleaned: 1,
            }
        );
        let stuck = engine.record(&id("stuck.m4a")).await.unwrap();
        assert_eq!(stuck.status(), SyncStatus::Failed);
        assert_eq!(stuck.attempt_count(), 1);
        assert_eq!(stuck.last_error(), Some(INTERRUPTED));
        assert!(!payloads.contains("done.m4a"));
        assert_eq!(engine.status(&id("new.wav")).await, SyncStatus::NotSynced);
    }

    #[tokio::test]
    async fn events_announce_pass_and_status_changes() {
        let engine = engine(
            MockUploader::default(),
            MockMetadata::default(),
            MockPayloads::with(&["a.m4a"]),
            true,
        );
        engine.register(id("a.m4a")).await;
        let mut events = engine.subscribe();

        engine.sync_pending().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.first(), Some(&SyncEvent::PassStarted { eligible: 1 }));
        assert!(seen.contains(&SyncEvent::StatusChanged {
            artifact_id: id("a.m4a"),
            status: SyncStatus::Syncing,
        }));
        assert!(seen.contains(&SyncEvent::StatusChanged {
            artifact_id: id("a.m4a"),
            status: SyncStatus::Synced,
        }));
        assert!(matches!(
            seen.last(),
            Some(SyncEvent::PassFinished(PassReport { synced: 1, .. }))
        ));
    }
}
