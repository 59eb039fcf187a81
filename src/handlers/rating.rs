// src/handlers/rating.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{config::Config, error::AppError, models::rating::RateCourseRequest, services::rating};

/// Records (or replaces) a learner's rating of a course they are enrolled in.
///
/// Returns the course's recomputed average and count.
pub async fn rate_course(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(req): Json<RateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let summary = rating::rate_course(&pool, &config.storage_retry, &req).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Rating submitted successfully",
        "average_rating": summary.average_rating,
        "total_ratings": summary.total_ratings,
    })))
}
