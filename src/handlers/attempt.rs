// src/handlers/attempt.rs

use std::sync::Arc;

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
    models::attempt::SubmitAttemptRequest,
    services::{attempts, notifier::Notifier},
};

/// Starts (or resumes) a learner's attempt at a quiz within a course.
///
/// * 403 if the learner is not enrolled in the course.
/// * 404 if the quiz does not exist.
/// * 400 if the quiz is not assigned to the course or was already completed there.
/// Questions are returned without their correct option.
pub async fn start_attempt(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Path((quiz_id, learner_id, course_id)): Path<(i64, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let started =
        attempts::start_attempt(&pool, &config.storage_retry, learner_id, quiz_id, course_id).await?;

    Ok(Json(json!({
        "status": "success",
        "quiz": started.quiz,
        "questions": started.questions,
        "attempt_id": started.attempt_id,
    })))
}

/// Submits the answers of an open attempt and returns the score.
///
/// A second submission of the same attempt is rejected with 400,
/// whatever its payload.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    State(notifier): State<Arc<dyn Notifier>>,
    Path(attempt_id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let score = attempts::submit_attempt(
        &pool,
        &config.storage_retry,
        notifier.as_ref(),
        attempt_id,
        &req.answers,
    )
    .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Quiz submitted successfully",
        "total_questions": score.total_questions,
        "correct_answers": score.correct_answers,
        "obtained_marks": score.obtained_marks,
        "total_marks": score.total_marks,
    })))
}

/// Retrieves one attempt with each response next to the correct answer.
pub async fn get_attempt_detail(
    State(pool): State<SqlitePool>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let (attempt, responses) = attempts::attempt_detail(&mut conn, attempt_id).await?;

    Ok(Json(json!({
        "status": "success",
        "attempt": attempt,
        "responses": responses,
    })))
}

/// Lists quizzes the learner can still take in their enrolled courses.
pub async fn available_quizzes(
    State(pool): State<SqlitePool>,
    Path(learner_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let quizzes = attempts::available_quizzes(&mut conn, learner_id).await?;

    Ok(Json(json!({ "status": "success", "data": quizzes })))
}

/// Lists the learner's completed attempts with percentages.
pub async fn quiz_results(
    State(pool): State<SqlitePool>,
    Path(learner_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let results = attempts::quiz_results(&mut conn, learner_id).await?;

    Ok(Json(json!({ "status": "success", "data": results })))
}

/// Lists every completed attempt for one quiz in one course.
pub async fn course_quiz_results(
    State(pool): State<SqlitePool>,
    Path((course_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let (quiz_title, course_title, results) =
        attempts::course_quiz_results(&mut conn, course_id, quiz_id).await?;

    Ok(Json(json!({
        "status": "success",
        "quiz_title": quiz_title,
        "course_title": course_title,
        "total_students": results.len(),
        "results": results,
    })))
}
