// src/services/progress.rs

//! Chapter progress tracking and the course completion gate.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    db,
    error::AppError,
    models::{enrollment::Enrollment, progress::Eligibility},
    services::{catalog, enrollment},
    utils::retry::{RetryPolicy, with_retry},
};

/// A course counts as finished once the learner has as many distinct
/// completed chapters as the course has chapters. Which chapters, and in
/// what order, does not matter.
pub fn is_complete(completed_chapters: i64, total_chapters: i64) -> bool {
    completed_chapters >= total_chapters
}

/// The completion gate verdict. Never mutates anything.
pub fn eligibility(
    enrollment: Option<&Enrollment>,
    completed_chapters: i64,
    total_chapters: i64,
) -> Eligibility {
    let eligible = match enrollment {
        None => false,
        Some(e) => {
            e.completed_at.is_some()
                || total_chapters == 0
                || is_complete(completed_chapters, total_chapters)
        }
    };

    Eligibility {
        eligible,
        completed_at: enrollment.and_then(|e| e.completed_at),
        enrolled_at: enrollment.map(|e| e.enrolled_at),
        completed_chapters,
        total_chapters,
    }
}

/// Returns (completed, total) chapter counts for a learner in a course.
/// Only chapters that still belong to the course are counted.
async fn chapter_counts(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
) -> Result<(i64, i64), AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&mut *conn)
        .await?;

    let completed: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT p.chapter_id)
        FROM chapter_progress p
        JOIN chapters ch ON ch.id = p.chapter_id
        WHERE p.learner_id = ? AND ch.course_id = ?
        "#,
    )
    .bind(learner_id)
    .bind(course_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok((completed, total))
}

/// Records a finished chapter and stamps the enrollment complete on the
/// transition. Returns true only for the call that stamped it.
pub async fn mark_chapter_complete(
    pool: &SqlitePool,
    policy: &RetryPolicy,
    learner_id: i64,
    course_id: i64,
    chapter_id: i64,
) -> Result<bool, AppError> {
    with_retry(policy, || mark_once(pool, learner_id, course_id, chapter_id)).await
}

async fn mark_once(
    pool: &SqlitePool,
    learner_id: i64,
    course_id: i64,
    chapter_id: i64,
) -> Result<bool, AppError> {
    let mut tx = db::begin_write(pool).await?;

    catalog::require_learner(&mut tx, learner_id).await?;
    catalog::require_course(&mut tx, course_id).await?;
    catalog::require_chapter_in_course(&mut tx, chapter_id, course_id).await?;

    if !enrollment::is_enrolled(&mut tx, learner_id, course_id).await? {
        return Err(AppError::NotEnrolled(
            "Student is not enrolled in this course".to_string(),
        ));
    }

    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO chapter_progress (learner_id, course_id, chapter_id, completed_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (learner_id, chapter_id) DO NOTHING
        "#,
    )
    .bind(learner_id)
    .bind(course_id)
    .bind(chapter_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let (completed, total) = chapter_counts(&mut tx, learner_id, course_id).await?;

    let stamped = if is_complete(completed, total) {
        enrollment::mark_completed(&mut tx, learner_id, course_id, now).await?
    } else {
        false
    };

    tx.commit().await?;

    if stamped {
        tracing::info!(
            "Learner {} completed course {} ({} chapters)",
            learner_id,
            course_id,
            total
        );
    }

    Ok(stamped)
}

pub async fn completed_chapters(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
) -> Result<Vec<i64>, AppError> {
    catalog::require_learner(conn, learner_id).await?;
    catalog::require_course(conn, course_id).await?;

    let chapters: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT chapter_id FROM chapter_progress
        WHERE learner_id = ? AND course_id = ?
        ORDER BY chapter_id
        "#,
    )
    .bind(learner_id)
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(chapters)
}

/// Read-only eligibility check for the certificate collaborator.
pub async fn certificate_eligibility(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
) -> Result<Eligibility, AppError> {
    let enrollment = enrollment::find(conn, learner_id, course_id).await?;
    let (completed, total) = chapter_counts(conn, learner_id, course_id).await?;
    Ok(eligibility(enrollment.as_ref(), completed, total))
}
