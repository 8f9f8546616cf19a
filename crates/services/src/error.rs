//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::BankError;
use quiz_core::model::{QuestionError, TestError};

/// Errors raised while parsing the embedded test catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported catalog version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Test(#[from] TestError),
    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Errors emitted by the auth collaborator.
///
/// A rejected credential is not an error; backends signal it with
/// `Ok(None)` so the caller's state is never left inconsistent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("auth backend returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("auth backend failure: {0}")]
    Backend(String),
}
