use sqlx::Row;
use std::str::FromStr;

use quiz_core::model::{TestId, TestProgress, TestStatus};

use super::SqliteRepository;
use crate::repository::{ProgressMap, ProgressStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<TestProgress, StorageError> {
    let test_id: String = row.try_get("test_id").map_err(ser)?;
    let attempts = u32_from_i64("attempts", row.try_get::<i64, _>("attempts").map_err(ser)?)?;
    let best_score_raw: i64 = row.try_get("best_score").map_err(ser)?;
    let best_score = u8::try_from(best_score_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid best_score: {best_score_raw}")))?;
    let last_attempt_date = row.try_get("last_attempt_date").map_err(ser)?;
    let status_raw: String = row.try_get("status").map_err(ser)?;
    let status = TestStatus::from_str(&status_raw).map_err(ser)?;

    TestProgress::from_persisted(
        TestId::new(test_id),
        attempts,
        best_score,
        last_attempt_date,
        status,
    )
    .map_err(ser)
}

#[async_trait::async_trait]
impl ProgressStore for SqliteRepository {
    async fn load(&self) -> Result<ProgressMap, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT test_id, attempts, best_score, last_attempt_date, status
                FROM test_progress
                WHERE scope = ?1
            ",
        )
        .bind(self.scope().storage_key())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut map = ProgressMap::new();
        for row in &rows {
            let progress = map_progress_row(row)?;
            map.insert(progress.test_id().clone(), progress);
        }
        Ok(map)
    }

    async fn save(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let scope = self.scope().storage_key();
        let mut tx = self.pool().begin().await.map_err(conn)?;

        // Snapshot semantics: replace everything under this scope as one unit.
        sqlx::query("DELETE FROM test_progress WHERE scope = ?1")
            .bind(&scope)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for record in progress.values() {
            sqlx::query(
                r"
                    INSERT INTO test_progress (
                        scope, test_id, attempts, best_score, last_attempt_date, status
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(&scope)
            .bind(record.test_id().as_str())
            .bind(i64::from(record.attempts()))
            .bind(i64::from(record.best_score()))
            .bind(record.last_attempt_date())
            .bind(record.status().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        tracing::debug!(%scope, entries = progress.len(), "snapshot written");
        Ok(())
    }
}
