//! JSON-file snapshot store: the local-storage analogue.
//!
//! One JSON document per scope, rewritten whole on every save. Writes go
//! through a temp file and a rename so a crash mid-write leaves the previous
//! snapshot intact.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use crate::repository::{ProgressMap, ProgressRecord, ProgressStore, StorageError, StoreScope};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted in `dir`, namespaced by `scope`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, scope: &StoreScope) -> Self {
        let file_name = match scope {
            StoreScope::Device => "progress.json".to_string(),
            StoreScope::User(_) => format!("progress-{}.json", scope.storage_key()),
        };
        Self {
            path: dir.as_ref().join(file_name),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn load(&self) -> Result<ProgressMap, StorageError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no progress snapshot yet");
            return Ok(ProgressMap::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| StorageError::Io(e.to_string()))?;
        let records: Vec<ProgressRecord> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut map = ProgressMap::new();
        for record in records {
            let progress = record.into_progress()?;
            map.insert(progress.test_id().clone(), progress);
        }
        Ok(map)
    }

    async fn save(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let mut records: Vec<ProgressRecord> =
            progress.values().map(ProgressRecord::from_progress).collect();
        // Stable on-disk order keeps snapshots diffable.
        records.sort_by(|a, b| a.test_id.cmp(&b.test_id));

        let raw = serde_json::to_string_pretty(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), entries = progress.len(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{TestId, TestProgress};
    use quiz_core::time::fixed_now;

    fn completed(id: &str, score: u8) -> (TestId, TestProgress) {
        let mut progress = TestProgress::not_started(TestId::new(id));
        progress.record_attempt(score, fixed_now());
        (TestId::new(id), progress)
    }

    #[tokio::test]
    async fn round_trips_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), &StoreScope::Device);

        let map: ProgressMap = [completed("html-basics", 70), completed("css-styling", 100)]
            .into_iter()
            .collect();
        store.save(&map).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, map);
    }

    #[tokio::test]
    async fn absent_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), &StoreScope::Device);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), &StoreScope::Device);
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(
            store.load().await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn scopes_write_disjoint_files() {
        let dir = tempfile::tempdir().unwrap();
        let device = JsonFileStore::new(dir.path(), &StoreScope::Device);
        let user = JsonFileStore::new(dir.path(), &StoreScope::User("jane".into()));
        assert_ne!(device.path(), user.path());

        let map: ProgressMap = [completed("html-basics", 60)].into_iter().collect();
        device.save(&map).await.unwrap();

        assert!(user.load().await.unwrap().is_empty());
        assert_eq!(device.load().await.unwrap(), map);
    }
}
