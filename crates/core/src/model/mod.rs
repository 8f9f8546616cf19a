mod attempt;
mod ids;
mod progress;
mod question;

pub use attempt::{AnswerMap, TestAttempt};
pub use ids::{QuestionId, TestId};
pub use progress::{ProgressError, TestProgress, TestStatus};
pub use question::{OPTION_COUNT, Question, QuestionError};
pub use test::{ParseSubjectError, Subject, Test, TestError};
