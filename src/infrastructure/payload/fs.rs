//! Recordings directory payload store adapter

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{PayloadError, PayloadStore};
use crate::domain::artifact::{ArtifactId, AudioFormat, StorageSize};

/// Payload store over a flat directory of recordings.
///
/// The artifact id is the file name; only `.wav` and `.m4a` files count.
pub struct FsPayloadStore {
    dir: PathBuf,
}

impl FsPayloadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_of(&self, id: &ArtifactId) -> PathBuf {
        self.dir.join(id.as_str())
    }

    /// Recordings in the directory with their modification time and size
    async fn scan(&self) -> Result<Vec<(ArtifactId, SystemTime, u64)>, PayloadError> {
        let list_err = |e: std::io::Error| PayloadError::ListFailed(e.to_string());

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_err(e)),
        };

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let path = entry.path();
            if !AudioFormat::is_recording(&path) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };

            let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| ArtifactId::new(n).ok())
            else {
                debug!(path = %path.display(), "skipping recording with unusable name");
                continue;
            };

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((id, modified, metadata.len()));
        }

        Ok(found)
    }
}

#[async_trait]
impl PayloadStore for FsPayloadStore {
    async fn read(&self, id: &ArtifactId) -> Result<Vec<u8>, PayloadError> {
        fs::read(self.path_of(id)).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => PayloadError::NotFound,
            _ => PayloadError::ReadFailed(e.to_string()),
        })
    }

    async fn delete(&self, id: &ArtifactId) -> Result<(), PayloadError> {
        match fs::remove_file(self.path_of(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PayloadError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, id: &ArtifactId) -> bool {
        fs::try_exists(self.path_of(id)).await.unwrap_or(false)
    }

    async fn list(&self) -> Result<Vec<ArtifactId>, PayloadError> {
        let mut found = self.scan().await?;
        found.sort_by(|(a_id, a_time, _), (b_id, b_time, _)| {
            a_time.cmp(b_time).then_with(|| a_id.cmp(b_id))
        });
        Ok(found.into_iter().map(|(id, _, _)| id).collect())
    }

    async fn total_size(&self) -> Result<StorageSize, PayloadError> {
        let found = self.scan().await?;
        Ok(found
            .into_iter()
            .map(|(_, _, len)| StorageSize::from_bytes(len))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(name: &str) -> ArtifactId {
        ArtifactId::new(name).unwrap()
    }

    #[tokio::test]
    async fn reads_payload_bytes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.m4a"), b"audio").unwrap();
        let store = FsPayloadStore::new(dir.path());

        assert_eq!(store.read(&id("a.m4a")).await.unwrap(), b"audio");
    }

    #[tokio::test]
    async fn missing_payload_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsPayloadStore::new(dir.path());

        let err = store.read(&id("gone.m4a")).await.unwrap_err();
        assert!(matches!(err, PayloadError::NotFound));
        assert_eq!(err.to_string(), "File not found");
    }

    #[tokio::test]
    async fn delete_tolerates_absent_payload() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.m4a"), b"audio").unwrap();
        let store = FsPayloadStore::new(dir.path());

        store.delete(&id("a.m4a")).await.unwrap();
        assert!(!store.exists(&id("a.m4a")).await);
        store.delete(&id("a.m4a")).await.unwrap();
    }

    #[tokio::test]
    async fn lists_only_recordings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.m4a"), b"1").unwrap();
        std::fs::write(dir.path().join("b.wav"), b"22").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"333").unwrap();
        std::fs::create_dir(dir.path().join("nested.m4a")).unwrap();
        let store = FsPayloadStore::new(dir.path());

        let mut listed = store.list().await.unwrap();
        listed.sort();
        assert_eq!(listed, vec![id("a.m4a"), id("b.wav")]);
        assert_eq!(store.total_size().await.unwrap().bytes(), 3);
    }

    #[tokio::test]
    async fn missing_directory_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FsPayloadStore::new(dir.path().join("not-yet"));

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.total_size().await.unwrap(), StorageSize::default());
    }
}
