// src/handlers/enrollment.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{error::AppError, models::enrollment::EnrollRequest, services::enrollment};

/// Enrolls a learner in a course.
///
/// Returns 201 Created with the enrollment row, 400 if already enrolled.
pub async fn enroll(
    State(pool): State<SqlitePool>,
    Json(req): Json<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let enrollment = enrollment::enroll(&mut conn, req.student_id, req.course_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Successfully enrolled in the course",
            "data": enrollment,
        })),
    ))
}

pub async fn check_enrollment(
    State(pool): State<SqlitePool>,
    Path((learner_id, course_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let found = enrollment::find(&mut conn, learner_id, course_id).await?;

    Ok(Json(json!({
        "status": "success",
        "is_enrolled": found.is_some(),
        "completed_at": found.and_then(|e| e.completed_at),
    })))
}

/// Lists the courses a learner is enrolled in, newest first.
pub async fn enrolled_courses(
    State(pool): State<SqlitePool>,
    Path(learner_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let courses = enrollment::enrolled_courses(&mut conn, learner_id).await?;

    Ok(Json(json!({ "status": "success", "data": courses })))
}
