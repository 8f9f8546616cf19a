use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::ids::{QuestionId, TestId};

//
// ─── ANSWER MAP ────────────────────────────────────────────────────────────────
//

/// Answers recorded during a session, keyed by question id.
///
/// Inserting for an already answered question overwrites the previous choice.
/// Option indices are stored as given; an out-of-range index is kept and
/// simply scores as incorrect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap {
    selected: HashMap<QuestionId, u32>,
}

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or overwrites) the selected option for a question.
    pub fn record(&mut self, question_id: QuestionId, option_index: u32) {
        self.selected.insert(question_id, option_index);
    }

    /// Returns the recorded option index for a question, if any.
    #[must_use]
    pub fn selected(&self, question_id: &QuestionId) -> Option<u32> {
        self.selected.get(question_id).copied()
    }

    /// Number of questions answered so far.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drops all recorded answers.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, u32)> {
        self.selected.iter().map(|(id, idx)| (id, *idx))
    }
}

//
// ─── TEST ATTEMPT ──────────────────────────────────────────────────────────────
//

/// The outcome of one submission: score, answer snapshot, completion time.
///
/// Created once per submission and immutable thereafter. Attempts are handed
/// to the results consumer transiently and never persisted; retaking a test
/// produces a fresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestAttempt {
    attempt_id: Uuid,
    test_id: TestId,
    score: u8,
    total_questions: u32,
    answers: AnswerMap,
    completed_at: DateTime<Utc>,
}

impl TestAttempt {
    pub(crate) fn new(
        test_id: TestId,
        score: u8,
        total_questions: u32,
        answers: AnswerMap,
        completed_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(score <= 100);
        Self {
            attempt_id: Uuid::new_v4(),
            test_id,
            score,
            total_questions,
            answers,
            completed_at,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    /// Percentage score, 0–100.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_overwrites_previous_choice() {
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new("q1"), 2);
        answers.record(QuestionId::new("q1"), 3);

        assert_eq!(answers.answered_count(), 1);
        assert_eq!(answers.selected(&QuestionId::new("q1")), Some(3));
    }

    #[test]
    fn clear_drops_everything() {
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new("q1"), 0);
        answers.record(QuestionId::new("q2"), 1);
        answers.clear();

        assert!(answers.is_empty());
        assert_eq!(answers.selected(&QuestionId::new("q1")), None);
    }

    #[test]
    fn out_of_range_indices_are_kept_as_recorded() {
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new("q1"), 99);
        assert_eq!(answers.selected(&QuestionId::new("q1")), Some(99));
    }
}
