#![forbid(unsafe_code)]

//! Domain model for the quiz engine: tests, answers, scoring, countdowns and
//! per-test progress. No I/O lives here; persistence and orchestration sit in
//! the `quiz-storage` and `quiz-services` crates.

pub mod bank;
pub mod error;
pub mod model;
pub mod scorer;
pub mod time;
pub mod timer;

pub use bank::{BankError, QuestionBank};
pub use error::Error;
pub use time::Clock;
pub use timer::{ClockDisplay, Countdown, TimerTick};
