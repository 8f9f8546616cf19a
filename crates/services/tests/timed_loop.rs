use std::sync::Arc;

use quiz_core::QuestionBank;
use quiz_core::model::{Question, QuestionId, Subject, Test, TestId, TestStatus};
use quiz_core::time::fixed_clock;
use quiz_services::{CountdownOutcome, ProgressService, SessionService, drive_countdown};
use quiz_storage::InMemoryProgressStore;

fn bank(time_limit_minutes: u32) -> Arc<QuestionBank> {
    let questions = (1..=5)
        .map(|i| {
            Question::new(
                QuestionId::new(format!("q{i}")),
                format!("prompt {i}"),
                vec!["a".into(), "b".into(), "c".into(), "d".into()],
                1,
                None,
            )
            .unwrap()
        })
        .collect();
    let test = Test::new(
        TestId::new("html-basics"),
        "HTML Fundamentals",
        Subject::Html,
        "",
        questions,
        time_limit_minutes,
    )
    .unwrap();
    Arc::new(QuestionBank::new(vec![test]).unwrap())
}

async fn service(time_limit_minutes: u32) -> SessionService {
    let bank = bank(time_limit_minutes);
    let progress = ProgressService::load(Arc::new(InMemoryProgressStore::new()), &bank).await;
    SessionService::new(bank, Arc::new(progress), fixed_clock())
}

#[tokio::test(start_paused = true)]
async fn fifteen_minute_limit_auto_submits_after_900_ticks() {
    let mut service = service(15).await;
    let id = TestId::new("html-basics");

    service.start_test(&id).await.unwrap();
    assert_eq!(service.current().unwrap().remaining_secs(), 900);

    // Answer two of five, then let the clock run out.
    service.record_answer(QuestionId::new("q1"), 1);
    service.record_answer(QuestionId::new("q2"), 1);

    let outcome = drive_countdown(&mut service).await;
    let CountdownOutcome::Expired(attempt) = outcome else {
        panic!("countdown should expire, got {outcome:?}");
    };
    assert_eq!(attempt.score(), 40);
    assert_eq!(service.current().unwrap().remaining_secs(), 0);
    assert!(service.current().unwrap().is_expired());

    let progress = service.get_test_progress(&id);
    assert_eq!(progress.status(), TestStatus::Completed);
    assert_eq!(progress.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn expiry_submits_exactly_once() {
    let mut service = service(1).await;
    service.start_test(&TestId::new("html-basics")).await.unwrap();

    let first = drive_countdown(&mut service).await;
    assert!(matches!(first, CountdownOutcome::Expired(_)));

    // Driving the already-expired session again must not submit a second
    // attempt; the countdown only goes idle.
    let second = drive_countdown(&mut service).await;
    assert_eq!(second, CountdownOutcome::Stopped);

    let progress = service.get_test_progress(&TestId::new("html-basics"));
    assert_eq!(progress.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_without_a_session_stops_immediately() {
    let mut service = service(1).await;
    assert_eq!(drive_countdown(&mut service).await, CountdownOutcome::Stopped);
}

#[tokio::test(start_paused = true)]
async fn starting_a_new_test_restarts_the_countdown() {
    let mut service = service(1).await;
    let id = TestId::new("html-basics");

    service.start_test(&id).await.unwrap();
    let _ = drive_countdown(&mut service).await;
    assert!(service.current().unwrap().is_expired());

    // A fresh start gets a fresh countdown; the old one is gone.
    service.start_test(&id).await.unwrap();
    assert_eq!(service.current().unwrap().remaining_secs(), 60);
    assert!(!service.current().unwrap().is_expired());
}
