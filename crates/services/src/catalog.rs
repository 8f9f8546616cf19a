//! The built-in test catalog, embedded at build time as versioned JSON and
//! validated through the core constructors on load.

use serde::Deserialize;

use quiz_core::QuestionBank;
use quiz_core::model::{Question, QuestionId, Subject, Test, TestId};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");
const SUPPORTED_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    version: u32,
    tests: Vec<TestRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestRecord {
    id: String,
    title: String,
    subject: Subject,
    description: String,
    time_limit: u32,
    questions: Vec<QuestionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: String,
    question: String,
    options: Vec<String>,
    correct_answer: u32,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parses a catalog document into a validated [`QuestionBank`].
///
/// # Errors
///
/// Returns `CatalogError` for malformed JSON, an unsupported version, or any
/// test/question that fails domain validation.
pub fn parse_catalog(raw: &str) -> Result<QuestionBank, CatalogError> {
    let doc: CatalogDoc = serde_json::from_str(raw)?;
    if doc.version != SUPPORTED_VERSION {
        return Err(CatalogError::UnsupportedVersion(doc.version));
    }

    let mut tests = Vec::with_capacity(doc.tests.len());
    for record in doc.tests {
        let mut questions = Vec::with_capacity(record.questions.len());
        for q in record.questions {
            questions.push(Question::new(
                QuestionId::new(q.id),
                q.question,
                q.options,
                q.correct_answer,
                q.explanation,
            )?);
        }
        tests.push(Test::new(
            TestId::new(record.id),
            record.title,
            record.subject,
            record.description,
            questions,
            record.time_limit,
        )?);
    }

    Ok(QuestionBank::new(tests)?)
}

/// The catalog shipped with the application.
///
/// # Errors
///
/// Returns `CatalogError` if the embedded document fails validation; that
/// only happens when the shipped asset itself is broken.
pub fn builtin_bank() -> Result<QuestionBank, CatalogError> {
    parse_catalog(BUILTIN_CATALOG)
}
