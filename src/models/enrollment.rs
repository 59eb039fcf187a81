// src/models/enrollment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'enrollments' table.
/// `completed_at` is set once by the completion gate and never cleared.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// DTO for enrolling a learner in a course.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_id: i64,
    pub course_id: i64,
}

/// A course the learner is enrolled in, joined with its title.
#[derive(Debug, Serialize, FromRow)]
pub struct EnrolledCourse {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
