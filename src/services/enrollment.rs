// src/services/enrollment.rs

//! Enrollment ledger: who is registered in which course, and when they finished it.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::enrollment::{EnrolledCourse, Enrollment},
    services::catalog,
};

pub async fn find(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
) -> Result<Option<Enrollment>, AppError> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, learner_id, course_id, enrolled_at, completed_at
        FROM enrollments
        WHERE learner_id = ? AND course_id = ?
        "#,
    )
    .bind(learner_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(enrollment)
}

pub async fn is_enrolled(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
) -> Result<bool, AppError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM enrollments WHERE learner_id = ? AND course_id = ?")
            .bind(learner_id)
            .bind(course_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

/// Stamps `completed_at` if it is still unset. Returns true only for the call
/// that actually set it.
pub async fn mark_completed(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
    at: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE enrollments
        SET completed_at = ?
        WHERE learner_id = ? AND course_id = ? AND completed_at IS NULL
        "#,
    )
    .bind(at)
    .bind(learner_id)
    .bind(course_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Registers a learner in a course.
pub async fn enroll(
    conn: &mut SqliteConnection,
    learner_id: i64,
    course_id: i64,
) -> Result<Enrollment, AppError> {
    catalog::require_learner(conn, learner_id).await?;
    catalog::require_course(conn, course_id).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO enrollments (learner_id, course_id, enrolled_at)
        VALUES (?, ?, ?)
        ON CONFLICT (learner_id, course_id) DO NOTHING
        "#,
    )
    .bind(learner_id)
    .bind(course_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::InvalidState(
            "Student is already enrolled in this course".to_string(),
        ));
    }

    tracing::info!("Learner {} enrolled in course {}", learner_id, course_id);

    find(conn, learner_id, course_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Enrollment vanished after insert".to_string()))
}

pub async fn enrolled_courses(
    conn: &mut SqliteConnection,
    learner_id: i64,
) -> Result<Vec<EnrolledCourse>, AppError> {
    catalog::require_learner(conn, learner_id).await?;

    let courses = sqlx::query_as::<_, EnrolledCourse>(
        r#"
        SELECT c.id AS course_id, c.title, c.description, e.enrolled_at, e.completed_at
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.learner_id = ?
        ORDER BY e.enrolled_at DESC, e.id DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(courses)
}
