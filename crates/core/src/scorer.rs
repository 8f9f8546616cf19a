//! Pure scoring: answers + test → attempt, with no side effects.

use chrono::{DateTime, Utc};

use crate::model::{AnswerMap, Test, TestAttempt};

/// Number of questions whose recorded answer equals the correct option.
///
/// Unanswered questions and out-of-range indices both count as incorrect.
#[must_use]
pub fn correct_count(test: &Test, answers: &AnswerMap) -> u32 {
    test.questions()
        .iter()
        .filter(|q| answers.selected(q.id()).is_some_and(|idx| q.is_correct(idx)))
        .count() as u32
}

/// Percentage score `round(100 * correct / total)`, always within 0–100.
#[must_use]
pub fn percent_score(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (f64::from(correct.min(total)) * 100.0 / f64::from(total)).round();
    percent as u8
}

/// Grades a finished session into an immutable [`TestAttempt`].
#[must_use]
pub fn grade(test: &Test, answers: &AnswerMap, completed_at: DateTime<Utc>) -> TestAttempt {
    let correct = correct_count(test, answers);
    let score = percent_score(correct, test.total_questions());
    TestAttempt::new(
        test.id().clone(),
        score,
        test.total_questions(),
        answers.clone(),
        completed_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionId, Subject, TestId};
    use crate::time::fixed_now;

    fn question(id: &str, correct: u32) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("prompt {id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            None,
        )
        .unwrap()
    }

    /// Ten questions, all with option 1 as the correct answer.
    fn ten_question_test() -> Test {
        let questions = (1..=10).map(|i| question(&format!("q{i}"), 1)).collect();
        Test::new(
            TestId::new("html-basics"),
            "HTML Fundamentals",
            Subject::Html,
            "Ten questions.",
            questions,
            15,
        )
        .unwrap()
    }

    fn answer_first_n_correctly(test: &Test, n: usize) -> AnswerMap {
        let mut answers = AnswerMap::new();
        for q in test.questions().iter().take(n) {
            answers.record(q.id().clone(), q.correct_option());
        }
        answers
    }

    #[test]
    fn all_correct_scores_one_hundred() {
        let test = ten_question_test();
        let answers = answer_first_n_correctly(&test, 10);
        let attempt = grade(&test, &answers, fixed_now());

        assert_eq!(attempt.score(), 100);
        assert_eq!(attempt.total_questions(), 10);
        assert_eq!(attempt.test_id(), test.id());
        assert_eq!(attempt.completed_at(), fixed_now());
    }

    #[test]
    fn seven_of_ten_scores_seventy() {
        let test = ten_question_test();
        let mut answers = answer_first_n_correctly(&test, 7);
        // Three wrong rather than unanswered; the score is the same either way.
        for q in test.questions().iter().skip(7) {
            answers.record(q.id().clone(), q.correct_option() + 1);
        }

        assert_eq!(correct_count(&test, &answers), 7);
        assert_eq!(grade(&test, &answers, fixed_now()).score(), 70);
    }

    #[test]
    fn empty_submission_scores_zero() {
        let test = ten_question_test();
        let attempt = grade(&test, &AnswerMap::new(), fixed_now());
        assert_eq!(attempt.score(), 0);
        assert!(attempt.answers().is_empty());
    }

    #[test]
    fn out_of_range_answer_scores_incorrect() {
        let test = ten_question_test();
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new("q1"), 99);

        assert_eq!(correct_count(&test, &answers), 0);
        assert_eq!(grade(&test, &answers, fixed_now()).score(), 0);
    }

    #[test]
    fn score_matches_formula_for_every_subset_size() {
        let test = ten_question_test();
        for n in 0..=10_usize {
            let answers = answer_first_n_correctly(&test, n);
            let expected = (n as f64 * 100.0 / 10.0).round() as u8;
            let score = grade(&test, &answers, fixed_now()).score();
            assert_eq!(score, expected);
            assert!(score <= 100);
        }
    }

    #[test]
    fn rounding_is_half_up() {
        // 1 of 3 correct: 33.33 → 33; 2 of 3: 66.67 → 67.
        assert_eq!(percent_score(1, 3), 33);
        assert_eq!(percent_score(2, 3), 67);
        // 1 of 8: 12.5 rounds away from zero to 13.
        assert_eq!(percent_score(1, 8), 13);
    }

    #[test]
    fn percent_score_clamps_degenerate_inputs() {
        assert_eq!(percent_score(0, 0), 0);
        assert_eq!(percent_score(5, 3), 100);
    }
}
