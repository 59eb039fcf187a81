// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::quiz::PublicQuestion;

/// Represents the 'quiz_attempts' table, joined with the quiz fields the
/// engine needs to score and notify.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub learner_id: i64,
    pub quiz_id: i64,
    pub course_id: i64,

    /// Question count captured when the attempt was opened.
    pub total_questions: i64,
    pub correct_answers: i64,
    pub obtained_marks: f64,
    pub is_completed: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    pub quiz_title: String,
    pub total_marks: i64,
    pub instructor_id: i64,
}

/// One answer inside a submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selected_answer: String,
}

/// DTO for submitting an attempt. A missing `answers` key counts as empty.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
}

/// Quiz metadata returned when an attempt is started.
#[derive(Debug, Serialize)]
pub struct QuizMeta {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub total_marks: i64,
    pub total_questions: i64,
}

/// Response for starting (or resuming) an attempt.
#[derive(Debug, Serialize)]
pub struct StartedAttempt {
    pub quiz: QuizMeta,
    pub questions: Vec<PublicQuestion>,
    pub attempt_id: i64,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub total_questions: i64,
    pub correct_answers: i64,
    pub obtained_marks: f64,
    pub total_marks: i64,
}

/// Completed attempt as listed in a learner's history.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptSummary {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub course_id: i64,
    pub course_title: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub obtained_marks: f64,
    pub total_marks: i64,
    #[sqlx(skip)]
    pub percentage: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Completed attempt as listed for an instructor reviewing one quiz in one course.
#[derive(Debug, Serialize, FromRow)]
pub struct LearnerResult {
    pub attempt_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub obtained_marks: f64,
    pub total_marks: i64,
    #[sqlx(skip)]
    pub percentage: f64,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A stored response paired with its question for review.
#[derive(Debug, Serialize, FromRow)]
pub struct ResponseReview {
    pub question_id: i64,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub selected_answer: String,
    pub right_answer: String,
    pub is_correct: bool,
}

/// Attempt header shown above the response review.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptDetail {
    pub attempt_id: i64,
    pub quiz_title: String,
    pub course_title: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub obtained_marks: f64,
    pub total_marks: i64,
    pub is_completed: bool,
    #[sqlx(skip)]
    pub percentage: f64,
    pub started_at: DateTime<Utc>,
}
