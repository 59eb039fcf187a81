// src/services/catalog.rs

//! Lookups against rows owned by the account and catalog services.

use sqlx::{FromRow, SqliteConnection};

use crate::{
    error::AppError,
    models::{actor::Role, quiz::Quiz, user::Account},
};

#[derive(Debug, Clone, FromRow)]
pub struct CourseRef {
    pub id: i64,
    pub instructor_id: i64,
    pub title: String,
}

fn account_table(role: Role) -> &'static str {
    match role {
        Role::Instructor => "instructors",
        Role::Learner => "learners",
    }
}

pub async fn find_account_by_email(
    conn: &mut SqliteConnection,
    role: Role,
    email: &str,
) -> Result<Option<Account>, AppError> {
    let sql = format!(
        "SELECT id, full_name, email, password FROM {} WHERE email = ?",
        account_table(role)
    );
    let account = sqlx::query_as::<_, Account>(&sql)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(account)
}

pub async fn require_learner(conn: &mut SqliteConnection, learner_id: i64) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>("SELECT id, full_name, email, password FROM learners WHERE id = ?")
        .bind(learner_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
}

pub async fn require_course(conn: &mut SqliteConnection, course_id: i64) -> Result<CourseRef, AppError> {
    sqlx::query_as::<_, CourseRef>("SELECT id, instructor_id, title FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

/// Resolves a chapter and checks that it belongs to the given course.
pub async fn require_chapter_in_course(
    conn: &mut SqliteConnection,
    chapter_id: i64,
    course_id: i64,
) -> Result<(), AppError> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT course_id FROM chapters WHERE id = ?")
        .bind(chapter_id)
        .fetch_optional(&mut *conn)
        .await?;

    match owner {
        Some(owner) if owner == course_id => Ok(()),
        Some(_) => Err(AppError::NotFound(
            "Chapter does not belong to this course".to_string(),
        )),
        None => Err(AppError::NotFound("Chapter not found".to_string())),
    }
}

pub async fn require_quiz(conn: &mut SqliteConnection, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        "SELECT id, instructor_id, title, description, total_marks, created_at FROM quizzes WHERE id = ?",
    )
    .bind(quiz_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
}
