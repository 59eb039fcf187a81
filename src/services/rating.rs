// src/services/rating.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::rating::{RateCourseRequest, RatingSummary},
    services::{catalog, enrollment},
    utils::retry::{RetryPolicy, with_retry},
};

/// Records (or replaces) a learner's rating and recomputes the course
/// aggregate in the same transaction.
pub async fn rate_course(
    pool: &SqlitePool,
    policy: &RetryPolicy,
    req: &RateCourseRequest,
) -> Result<RatingSummary, AppError> {
    with_retry(policy, || rate_once(pool, req)).await
}

async fn rate_once(pool: &SqlitePool, req: &RateCourseRequest) -> Result<RatingSummary, AppError> {
    let now = Utc::now();
    let mut tx = db::begin_write(pool).await?;

    catalog::require_learner(&mut tx, req.student_id).await?;
    catalog::require_course(&mut tx, req.course_id).await?;

    if !enrollment::is_enrolled(&mut tx, req.student_id, req.course_id).await? {
        return Err(AppError::NotEnrolled(
            "Only enrolled students can rate this course".to_string(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO course_ratings (course_id, learner_id, rating, review, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (course_id, learner_id)
        DO UPDATE SET rating = excluded.rating,
                      review = excluded.review,
                      updated_at = excluded.updated_at
        "#,
    )
    .bind(req.course_id)
    .bind(req.student_id)
    .bind(req.rating)
    .bind(&req.review)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let summary = sqlx::query_as::<_, RatingSummary>(
        r#"
        UPDATE courses
        SET average_rating = (SELECT ROUND(AVG(rating), 2) FROM course_ratings WHERE course_id = ?),
            total_ratings = (SELECT COUNT(*) FROM course_ratings WHERE course_id = ?)
        WHERE id = ?
        RETURNING average_rating, total_ratings
        "#,
    )
    .bind(req.course_id)
    .bind(req.course_id)
    .bind(req.course_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        "Course {} rated {} by learner {}",
        req.course_id,
        req.rating,
        req.student_id
    );

    Ok(summary)
}
