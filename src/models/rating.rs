// src/models/rating.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// DTO for rating a course.
#[derive(Debug, Deserialize, Validate)]
pub struct RateCourseRequest {
    pub student_id: i64,
    pub course_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i64,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub review: String,
}

/// Aggregate stored on the course row.
#[derive(Debug, Serialize, FromRow)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: i64,
}
