// src/handlers/progress.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::progress::MarkChapterCompleteRequest,
    services::progress,
};

/// Marks a chapter as completed by a learner.
///
/// Repeating the call is a no-op. Missing learner, course or chapter
/// answers 400; a learner who is not enrolled gets 403.
pub async fn mark_chapter_complete(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(req): Json<MarkChapterCompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course_completed = progress::mark_chapter_complete(
        &pool,
        &config.storage_retry,
        req.student_id,
        req.course_id,
        req.chapter_id,
    )
    .await
    .map_err(AppError::not_found_as_bad_request)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Chapter marked as complete",
        "course_completed": course_completed,
    })))
}

/// Lists the chapter ids a learner has completed in a course.
pub async fn get_completed_chapters(
    State(pool): State<SqlitePool>,
    Path((learner_id, course_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let chapters = progress::completed_chapters(&mut conn, learner_id, course_id)
        .await
        .map_err(AppError::not_found_as_bad_request)?;

    Ok(Json(json!({
        "status": "success",
        "completed_chapters": chapters,
    })))
}

/// Reports whether a certificate may be issued. Never changes state.
///
/// In a course without chapters an enrolled learner is eligible while
/// `completed_at` is null; the certificate renderer must use `enrolled_at`
/// as the completion date in that case.
pub async fn certificate_eligibility(
    State(pool): State<SqlitePool>,
    Path((learner_id, course_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let verdict = progress::certificate_eligibility(&mut conn, learner_id, course_id).await?;

    Ok(Json(verdict))
}
