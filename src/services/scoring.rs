// src/services/scoring.rs

//! Pure grading and scoring helpers for quiz attempts.

use std::collections::{HashMap, HashSet};

use crate::models::attempt::{AnswerSubmission, ScoreResult};

/// One accepted answer, ready to be stored as a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Grades submitted answers against the quiz's answer key
/// (question id -> correct option text).
///
/// * Answers for question ids missing from the key are skipped.
/// * Only the first answer per question id counts; repeats are dropped.
/// * Comparison is exact and case-sensitive.
pub fn grade_answers(
    answer_key: &HashMap<i64, String>,
    submitted: &[AnswerSubmission],
) -> Vec<GradedAnswer> {
    let mut seen = HashSet::new();

    submitted
        .iter()
        .filter_map(|answer| {
            let correct = answer_key.get(&answer.question_id)?;
            if !seen.insert(answer.question_id) {
                return None;
            }
            Some(GradedAnswer {
                question_id: answer.question_id,
                selected_answer: answer.selected_answer.clone(),
                is_correct: answer.selected_answer == *correct,
            })
        })
        .collect()
}

/// Marks awarded per correct answer. Zero when the snapshot has no questions.
pub fn marks_per_question(total_marks: i64, total_questions: i64) -> f64 {
    if total_questions <= 0 {
        return 0.0;
    }
    total_marks as f64 / total_questions as f64
}

/// Rounds to the two decimal places marks are stored with.
pub fn round_marks(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the stored result of an attempt.
///
/// The correct count is capped at the snapshot, so questions added after the
/// attempt opened can never push the score above the quiz total.
pub fn score(total_marks: i64, total_questions: i64, correct: i64) -> ScoreResult {
    let counted = correct.clamp(0, total_questions.max(0));
    let obtained = counted as f64 * marks_per_question(total_marks, total_questions);

    ScoreResult {
        total_questions,
        correct_answers: counted,
        obtained_marks: round_marks(obtained),
        total_marks,
    }
}

/// Percentage of the total, 0 when the total is not positive.
pub fn percentage(obtained_marks: f64, total_marks: i64) -> f64 {
    if total_marks <= 0 {
        return 0.0;
    }
    round_marks(obtained_marks / total_marks as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs.iter().map(|(id, ans)| (*id, ans.to_string())).collect()
    }

    fn answer(question_id: i64, selected: &str) -> AnswerSubmission {
        AnswerSubmission {
            question_id,
            selected_answer: selected.to_string(),
        }
    }

    #[test]
    fn test_intro_quiz_three_of_four() {
        let answer_key = key(&[(1, "A"), (2, "B"), (3, "C"), (4, "D")]);
        let graded = grade_answers(
            &answer_key,
            &[answer(1, "A"), answer(2, "B"), answer(3, "C"), answer(4, "A")],
        );
        let correct = graded.iter().filter(|g| g.is_correct).count() as i64;

        let result = score(10, 4, correct);
        assert_eq!(
            result,
            ScoreResult {
                total_questions: 4,
                correct_answers: 3,
                obtained_marks: 7.5,
                total_marks: 10,
            }
        );
    }

    #[test]
    fn test_obtained_is_k_times_share() {
        for k in 0..=4 {
            assert_eq!(score(10, 4, k).obtained_marks, k as f64 * 2.5);
        }
        for k in 0..=3 {
            assert_eq!(score(9, 3, k).obtained_marks, k as f64 * 3.0);
        }
    }

    #[test]
    fn test_zero_question_snapshot_scores_zero() {
        assert_eq!(marks_per_question(10, 0), 0.0);
        let result = score(10, 0, 0);
        assert_eq!(result.obtained_marks, 0.0);
        assert_eq!(result.correct_answers, 0);
    }

    #[test]
    fn test_marks_rounded_to_two_places() {
        // 10 / 3 = 3.333...
        assert_eq!(score(10, 3, 1).obtained_marks, 3.33);
        assert_eq!(score(10, 3, 2).obtained_marks, 6.67);
        assert_eq!(score(10, 3, 3).obtained_marks, 10.0);
    }

    #[test]
    fn test_correct_count_capped_at_snapshot() {
        let result = score(10, 2, 3);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.obtained_marks, 10.0);
    }

    #[test]
    fn test_unknown_questions_are_skipped() {
        let answer_key = key(&[(1, "A")]);
        let graded = grade_answers(&answer_key, &[answer(1, "A"), answer(99, "A")]);
        assert_eq!(graded.len(), 1);
        assert_eq!(graded[0].question_id, 1);
    }

    #[test]
    fn test_first_answer_per_question_wins() {
        let answer_key = key(&[(1, "A")]);
        let graded = grade_answers(&answer_key, &[answer(1, "B"), answer(1, "A"), answer(1, "A")]);
        assert_eq!(graded.len(), 1);
        assert_eq!(graded[0].selected_answer, "B");
        assert!(!graded[0].is_correct);
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let answer_key = key(&[(1, "Paris")]);
        let graded = grade_answers(&answer_key, &[answer(1, "paris")]);
        assert!(!graded[0].is_correct);
    }

    #[test]
    fn test_percentage_guards_zero_total() {
        assert_eq!(percentage(7.5, 10), 75.0);
        assert_eq!(percentage(5.0, 0), 0.0);
    }
}
