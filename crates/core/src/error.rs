use thiserror::Error;

use crate::bank::BankError;
use crate::model::{ProgressError, QuestionError, TestError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Test(#[from] TestError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
