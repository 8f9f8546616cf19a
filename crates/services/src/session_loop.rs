//! Async driver for the session countdown.

use std::time::Duration;

use quiz_core::TimerTick;
use quiz_core::model::TestAttempt;

use crate::session_service::SessionService;

/// How a countdown run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownOutcome {
    /// The time limit ran out and the session was auto-submitted.
    Expired(TestAttempt),
    /// There was no active session (left the flow, or already reset).
    Stopped,
}

/// Ticks the active session once per second until it expires, then submits.
///
/// Auto-submission fires exactly once: the countdown reports
/// [`TimerTick::Expired`] on a single tick and goes idle afterwards. The
/// whole loop is torn down by dropping the future, which is how a manual
/// submission or navigation away cancels the countdown.
pub async fn drive_countdown(service: &mut SessionService) -> CountdownOutcome {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first interval tick completes immediately; consume it so the
    // countdown decrements once per elapsed second.
    interval.tick().await;

    loop {
        interval.tick().await;
        match service.tick() {
            Some(TimerTick::Running { .. }) => {}
            Some(TimerTick::Expired) => {
                tracing::info!("time limit reached, auto-submitting");
                match service.submit_test().await {
                    Some(attempt) => return CountdownOutcome::Expired(attempt),
                    None => return CountdownOutcome::Stopped,
                }
            }
            // Idle means an earlier tick already expired this session; with
            // the session gone there is nothing left to drive.
            Some(TimerTick::Idle) | None => return CountdownOutcome::Stopped,
        }
    }
}
