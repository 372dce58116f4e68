//! JSON file metadata store adapter
//!
//! The whole table lives in memory and is rewritten to disk on every
//! mutation. Writes go to a sibling temp file that is fsynced and renamed
//! over the real one, so a crash leaves either the old or the new table.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::ports::{MetadataError, MetadataStore};
use crate::domain::artifact::ArtifactId;
use crate::domain::sync::{SyncRecord, SyncStatus};

/// On-disk shape of one record; the artifact id is the map key
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
}

impl From<&SyncRecord> for StoredRecord {
    fn from(record: &SyncRecord) -> Self {
        Self {
            status: record.status(),
            last_attempt_at: record.last_attempt_at(),
            attempt_count: record.attempt_count(),
            last_error: record.last_error().map(str::to_string),
        }
    }
}

/// Serializes records as a JSON object keyed by artifact id, in table order
struct Table<'a>(&'a [SyncRecord]);

impl Serialize for Table<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|r| (r.artifact_id().as_str(), StoredRecord::from(r))),
        )
    }
}

/// Object entries in file order
struct Entries(Vec<(String, StoredRecord)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of artifact ids to sync records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, StoredRecord>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Metadata store backed by a single JSON file
pub struct JsonMetadataStore {
    path: PathBuf,
    records: Mutex<Vec<SyncRecord>>,
}

impl JsonMetadataStore {
    /// Open the store, loading the file if present.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and treated as empty; it is replaced on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match fs::read_to_string(&path).await {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "sync metadata is corrupt, starting empty");
                Vec::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read sync metadata, starting empty");
                Vec::new()
            }
        };

        debug!(path = %path.display(), records = records.len(), "opened sync metadata");

        Self {
            path,
            records: Mutex::new(records),
        }
    }

    fn parse(content: &str) -> Result<Vec<SyncRecord>, serde_json::Error> {
        let Entries(entries) = serde_json::from_str(content)?;
        let mut records: Vec<SyncRecord> = Vec::with_capacity(entries.len());

        for (key, stored) in entries {
            let id = match ArtifactId::new(&key) {
                Ok(id) => id,
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping sync record with invalid id");
                    continue;
                }
            };

            let record = SyncRecord::from_parts(
                id,
                stored.status,
                stored.last_attempt_at,
                stored.attempt_count,
                stored.last_error,
            );

            // Duplicate keys: last one wins, first position kept
            match records
                .iter_mut()
                .find(|r| r.artifact_id() == record.artifact_id())
            {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }

        Ok(records)
    }

    fn render(records: &[SyncRecord]) -> Result<String, MetadataError> {
        serde_json::to_string_pretty(&Table(records))
            .map_err(|e| MetadataError::SerializeFailed(e.to_string()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replace the file with the given table
    async fn write(&self, records: &[SyncRecord]) -> Result<(), MetadataError> {
        let content = Self::render(records)?;
        let write_err = |e: std::io::Error| MetadataError::WriteFailed(e.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let temp_path = self.temp_path();
        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(write_err(e));
        }

        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn get(&self, id: &ArtifactId) -> Option<SyncRecord> {
        let records = self.records.lock().await;
        records.iter().find(|r| r.artifact_id() == id).cloned()
    }

    async fn put(&self, record: SyncRecord) -> Result<(), MetadataError> {
        let mut records = self.records.lock().await;
        match records
            .iter_mut()
            .find(|r| r.artifact_id() == record.artifact_id())
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write(&records).await
    }

    async fn remove(&self, id: &ArtifactId) -> Result<(), MetadataError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.artifact_id() != id);
        if records.len() == before {
            return Ok(());
        }
        self.write(&records).await
    }

    async fn all_records(&self) -> Vec<SyncRecord> {
        self.records.lock().await.clone()
    }
}
