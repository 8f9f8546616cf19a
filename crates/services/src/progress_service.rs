//! Load-once progress state with full-snapshot persistence.

use std::sync::{Arc, Mutex};

use quiz_core::QuestionBank;
use quiz_core::model::{TestAttempt, TestId, TestProgress};
use quiz_storage::{ProgressMap, ProgressStore};

/// Owns the in-memory progress mapping for every known test id.
///
/// The snapshot is read once at startup; a failed or absent read degrades to
/// `not-started` defaults for every test in the bank. Every mutation rewrites
/// the full snapshot through the [`ProgressStore`] port; a failed write is
/// logged and otherwise accepted (that submission's statistics survive only
/// in memory).
pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
    progress: Mutex<ProgressMap>,
}

impl ProgressService {
    /// Reads the stored snapshot and fills in defaults for every test in the
    /// bank that has no record yet. Never fails.
    pub async fn load(store: Arc<dyn ProgressStore>, bank: &QuestionBank) -> Self {
        let mut map = match store.load().await {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(%err, "progress snapshot unreadable, starting fresh");
                ProgressMap::new()
            }
        };

        for id in bank.ids() {
            map.entry(id.clone())
                .or_insert_with(|| TestProgress::not_started(id.clone()));
        }

        Self {
            store,
            progress: Mutex::new(map),
        }
    }

    /// Returns the progress for a test, or the `not-started` default when the
    /// id has never been seen. Never fails.
    #[must_use]
    pub fn get(&self, test_id: &TestId) -> TestProgress {
        let map = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        map.get(test_id)
            .cloned()
            .unwrap_or_else(|| TestProgress::not_started(test_id.clone()))
    }

    /// A copy of the full mapping, for dashboards and listings.
    #[must_use]
    pub fn all(&self) -> ProgressMap {
        let map = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        map.clone()
    }

    /// Records the `not-started → in-progress` transition when a session
    /// starts, and persists it. Any other status is left untouched.
    pub async fn mark_started(&self, test_id: &TestId) {
        let (changed, snapshot) = {
            let mut map = self.progress.lock().unwrap_or_else(|e| e.into_inner());
            let entry = map
                .entry(test_id.clone())
                .or_insert_with(|| TestProgress::not_started(test_id.clone()));
            (entry.mark_started(), map.clone())
        };

        if changed {
            tracing::debug!(test_id = %test_id, "test marked in progress");
            self.persist(&snapshot).await;
        }
    }

    /// Merges a completed attempt into the mapping and persists the result.
    ///
    /// Returns the updated record.
    pub async fn record_attempt(&self, attempt: &TestAttempt) -> TestProgress {
        let (updated, snapshot) = {
            let mut map = self.progress.lock().unwrap_or_else(|e| e.into_inner());
            let entry = map
                .entry(attempt.test_id().clone())
                .or_insert_with(|| TestProgress::not_started(attempt.test_id().clone()));
            entry.record_attempt(attempt.score(), attempt.completed_at());
            (entry.clone(), map.clone())
        };

        self.persist(&snapshot).await;
        updated
    }

    async fn persist(&self, snapshot: &ProgressMap) {
        if let Err(err) = self.store.save(snapshot).await {
            // Accepted data-loss window: the in-memory state stays correct,
            // the write is not retried.
            tracing::warn!(%err, "progress snapshot write failed");
        }
    }
}
