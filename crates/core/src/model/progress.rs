use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::TestId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("best score must be within 0–100, got {score}")]
    ScoreOutOfRange { score: u8 },

    #[error("completed progress must have at least one attempt")]
    CompletedWithoutAttempts,

    #[error("best score {score} recorded with zero attempts")]
    ScoreWithoutAttempts { score: u8 },

    #[error("unknown test status: {raw}")]
    UnknownStatus { raw: String },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a test from the learner's point of view.
///
/// `Completed` never regresses: re-attempts keep the status as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TestStatus {
    /// Stable string form used by persistence adapters.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::NotStarted => "not-started",
            TestStatus::InProgress => "in-progress",
            TestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(TestStatus::NotStarted),
            "in-progress" => Ok(TestStatus::InProgress),
            "completed" => Ok(TestStatus::Completed),
            other => Err(ProgressError::UnknownStatus {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── TEST PROGRESS ─────────────────────────────────────────────────────────────
//

/// Per-test statistics accumulated across attempts.
///
/// Created lazily as `not-started` the first time a test id is seen, and
/// mutated only through [`TestProgress::record_attempt`] and
/// [`TestProgress::mark_started`]. `best_score` is monotone: it never
/// decreases across attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestProgress {
    test_id: TestId,
    attempts: u32,
    best_score: u8,
    last_attempt_date: Option<DateTime<Utc>>,
    status: TestStatus,
}

impl TestProgress {
    /// Default record for a test that has never been attempted.
    #[must_use]
    pub fn not_started(test_id: TestId) -> Self {
        Self {
            test_id,
            attempts: 0,
            best_score: 0,
            last_attempt_date: None,
            status: TestStatus::NotStarted,
        }
    }

    /// Rehydrate progress from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the score is out of range or the fields are
    /// mutually inconsistent (a completed record without attempts, or a
    /// nonzero score with zero attempts).
    pub fn from_persisted(
        test_id: TestId,
        attempts: u32,
        best_score: u8,
        last_attempt_date: Option<DateTime<Utc>>,
        status: TestStatus,
    ) -> Result<Self, ProgressError> {
        if best_score > 100 {
            return Err(ProgressError::ScoreOutOfRange { score: best_score });
        }
        if status == TestStatus::Completed && attempts == 0 {
            return Err(ProgressError::CompletedWithoutAttempts);
        }
        if attempts == 0 && best_score > 0 {
            return Err(ProgressError::ScoreWithoutAttempts { score: best_score });
        }

        Ok(Self {
            test_id,
            attempts,
            best_score,
            last_attempt_date,
            status,
        })
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Best percentage score over all attempts, 0–100.
    #[must_use]
    pub fn best_score(&self) -> u8 {
        self.best_score
    }

    #[must_use]
    pub fn last_attempt_date(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_date
    }

    #[must_use]
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Merges one completed submission into the record.
    ///
    /// Increments the attempt count, keeps the maximum score, forces the
    /// status to completed and stamps the attempt date.
    pub fn record_attempt(&mut self, score: u8, completed_at: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.best_score = self.best_score.max(score.min(100));
        self.last_attempt_date = Some(completed_at);
        self.status = TestStatus::Completed;
    }

    /// Marks a fresh test as in progress when a session starts.
    ///
    /// Only the `not-started → in-progress` transition exists; a completed
    /// test stays completed. Returns true when the status changed.
    pub fn mark_started(&mut self) -> bool {
        if self.status == TestStatus::NotStarted {
            self.status = TestStatus::InProgress;
            true
        } else {
            false
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
