use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::sync::Arc;

use quiz_core::model::{AnswerMap, Question, QuestionId, Test, TestAttempt, TestId, TestProgress};
use quiz_core::{Clock, Countdown, QuestionBank, TimerTick, scorer};

use crate::progress_service::ProgressService;

//
// ─── SESSION OPTIONS ───────────────────────────────────────────────────────────
//

/// Knobs for a session start. Defaults reproduce the plain test-taking flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Shuffle the presentation order of questions (practice runs). Answers
    /// stay keyed by question id, so shuffling never affects scoring.
    pub shuffle_questions: bool,
}

//
// ─── TEST SESSION ──────────────────────────────────────────────────────────────
//

/// One active test attempt: the test, the answers so far, and the countdown.
///
/// Created when a test starts and destroyed on reset; nothing outside the
/// owning [`SessionService`] holds session state.
#[derive(Debug, Clone)]
pub struct TestSession {
    test: Test,
    order: Vec<usize>,
    answers: AnswerMap,
    countdown: Countdown,
    started_at: DateTime<Utc>,
}

impl TestSession {
    fn start(test: Test, started_at: DateTime<Utc>, options: SessionOptions) -> Self {
        let countdown = Countdown::from_secs(test.time_limit_secs());
        let mut order: Vec<usize> = (0..test.questions().len()).collect();
        if options.shuffle_questions {
            order.shuffle(&mut rand::rng());
        }
        Self {
            test,
            order,
            answers: AnswerMap::new(),
            countdown,
            started_at,
        }
    }

    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        self.test.id()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.test.total_questions()
    }

    /// Question at the given presentation position.
    #[must_use]
    pub fn question_at(&self, position: usize) -> Option<&Question> {
        let index = *self.order.get(position)?;
        self.test.questions().get(index)
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.countdown.is_expired()
    }
}

//
// ─── SESSION SERVICE ───────────────────────────────────────────────────────────
//

/// Tracks at most one active test attempt and serializes every mutation.
///
/// All answer and timer state lives behind this single owner; starting a new
/// test or resetting discards the previous session (including its countdown)
/// with no rollback of answers already recorded.
pub struct SessionService {
    bank: Arc<QuestionBank>,
    progress: Arc<ProgressService>,
    clock: Clock,
    options: SessionOptions,
    current: Option<TestSession>,
}

impl SessionService {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, progress: Arc<ProgressService>, clock: Clock) -> Self {
        Self {
            bank,
            progress,
            clock,
            options: SessionOptions::default(),
            current: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn current(&self) -> Option<&TestSession> {
        self.current.as_ref()
    }

    /// Starts a session for the given test id.
    ///
    /// An unknown id is a no-op that returns `None`, leaving any existing
    /// session untouched; the caller detects the absence and redirects. On
    /// success any previous session is discarded, a fresh countdown starts,
    /// and the test's progress moves `not-started → in-progress` (persisted).
    pub async fn start_test(&mut self, test_id: &TestId) -> Option<&TestSession> {
        let Some(test) = self.bank.get(test_id) else {
            tracing::debug!(test_id = %test_id, "start requested for unknown test");
            return None;
        };

        self.progress.mark_started(test_id).await;
        let session = TestSession::start(test.clone(), self.clock.now(), self.options);
        tracing::debug!(
            test_id = %test_id,
            time_limit_secs = session.remaining_secs(),
            "session started"
        );
        self.current = Some(session);
        self.current.as_ref()
    }

    /// Records (or overwrites) an answer on the active session.
    ///
    /// Ignored when no session is active. The option index is stored as
    /// given; an out-of-range value participates in scoring as incorrect.
    pub fn record_answer(&mut self, question_id: QuestionId, option_index: u32) {
        match &mut self.current {
            Some(session) => session.answers.record(question_id, option_index),
            None => {
                tracing::debug!(question_id = %question_id, "answer dropped, no active session");
            }
        }
    }

    /// Advances the active countdown by one second.
    ///
    /// Returns `None` when no session is active. [`TimerTick::Expired`] is
    /// reported exactly once per session; the caller reacts by submitting.
    pub fn tick(&mut self) -> Option<TimerTick> {
        self.current.as_mut().map(|s| s.countdown.tick())
    }

    /// Submits the active session: grades it, merges progress, persists.
    ///
    /// Returns `None` when no session is active. The session itself is kept
    /// (the results view still needs it); callers reset explicitly when
    /// leaving the test flow.
    pub async fn submit_test(&mut self) -> Option<TestAttempt> {
        let session = self.current.as_ref()?;
        let attempt = scorer::grade(&session.test, &session.answers, self.clock.now());
        let updated = self.progress.record_attempt(&attempt).await;
        tracing::debug!(
            test_id = %attempt.test_id(),
            score = attempt.score(),
            attempts = updated.attempts(),
            "test submitted"
        );
        Some(attempt)
    }

    /// Drops the active session and its countdown.
    ///
    /// Must run when the test-taking flow is left so stale answers cannot
    /// bleed into the next session.
    pub fn reset_current_test(&mut self) {
        self.current = None;
    }

    /// Stored progress for a test, or the `not-started` default. Never fails.
    #[must_use]
    pub fn get_test_progress(&self, test_id: &TestId) -> TestProgress {
        self.progress.get(test_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
