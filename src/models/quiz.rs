// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub instructor_id: i64,
    pub title: String,
    pub description: String,

    /// Fixed when the quiz is defined; split evenly across the questions
    /// that exist when an attempt starts.
    pub total_marks: i64,

    pub created_at: DateTime<Utc>,
}

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,

    /// The text content of the question.
    pub prompt: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// The literal text of the correct option.
    pub correct_option: String,

    pub created_at: DateTime<Utc>,
}

/// DTO for sending a question to a learner (excludes the correct option).
#[derive(Debug, Serialize, FromRow)]
pub struct PublicQuestion {
    pub id: i64,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

/// DTO for creating a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "Total marks must be positive."))]
    pub total_marks: i64,
}

/// DTO for adding a question to a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(length(min = 1, max = 200))]
    pub option_a: String,
    #[validate(length(min = 1, max = 200))]
    pub option_b: String,
    #[validate(length(min = 1, max = 200))]
    pub option_c: String,
    #[validate(length(min = 1, max = 200))]
    pub option_d: String,
    #[validate(length(min = 1, max = 200))]
    pub correct_option: String,
}

impl CreateQuestionRequest {
    /// The correct option must be the exact text of one of the four options.
    pub fn correct_option_is_listed(&self) -> bool {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
            .iter()
            .any(|opt| **opt == self.correct_option)
    }
}

/// DTO for assigning a quiz to a course.
#[derive(Debug, Deserialize)]
pub struct AssignQuizRequest {
    pub quiz_id: i64,
    pub course_id: i64,
}

/// Represents the 'course_quizzes' table, joined with the quiz title.
#[derive(Debug, Serialize, FromRow)]
pub struct CourseQuiz {
    pub id: i64,
    pub course_id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub total_marks: i64,
    pub assigned_at: DateTime<Utc>,
}

/// A quiz the learner can still attempt in one of their enrolled courses.
#[derive(Debug, Serialize, FromRow)]
pub struct AvailableQuiz {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub total_questions: i64,
    pub total_marks: i64,
    pub assigned_at: DateTime<Utc>,
}
