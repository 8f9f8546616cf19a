//! Static catalog of tests, read-only for the process lifetime.

use std::collections::HashSet;
use thiserror::Error;

use crate::model::{Test, TestId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("duplicate test id in bank: {0}")]
    DuplicateTestId(TestId),
}

/// Ordered collection of tests with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    tests: Vec<Test>,
}

impl QuestionBank {
    /// Builds a bank from an ordered list of tests.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateTestId` if two tests share an id.
    pub fn new(tests: Vec<Test>) -> Result<Self, BankError> {
        let mut seen = HashSet::new();
        for test in &tests {
            if !seen.insert(test.id().clone()) {
                return Err(BankError::DuplicateTestId(test.id().clone()));
            }
        }
        Ok(Self { tests })
    }

    /// Looks up a test by id.
    #[must_use]
    pub fn get(&self, id: &TestId) -> Option<&Test> {
        self.tests.iter().find(|t| t.id() == id)
    }

    /// All tests, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Test] {
        &self.tests
    }

    pub fn ids(&self) -> impl Iterator<Item = &TestId> {
        self.tests.iter().map(Test::id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionId, Subject};

    fn test(id: &str) -> Test {
        let question = Question::new(
            QuestionId::new("q1"),
            "prompt",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            0,
            None,
        )
        .unwrap();
        Test::new(TestId::new(id), "Title", Subject::Html, "", vec![question], 10).unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let bank = QuestionBank::new(vec![test("a"), test("b")]).unwrap();
        assert_eq!(bank.len(), 2);
        assert!(bank.get(&TestId::new("b")).is_some());
        assert!(bank.get(&TestId::new("missing")).is_none());
    }

    #[test]
    fn rejects_duplicate_test_ids() {
        let err = QuestionBank::new(vec![test("a"), test("a")]).unwrap_err();
        assert_eq!(err, BankError::DuplicateTestId(TestId::new("a")));
    }

    #[test]
    fn preserves_catalog_order() {
        let bank = QuestionBank::new(vec![test("z"), test("a"), test("m")]).unwrap();
        let ids: Vec<&str> = bank.ids().map(TestId::as_str).collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }
}
