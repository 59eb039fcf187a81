// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        actor::Actor,
        quiz::{AssignQuizRequest, CourseQuiz, CreateQuestionRequest, CreateQuizRequest, Quiz, QuizQuestion},
    },
    services::{
        catalog,
        notifier::{NotificationEvent, Notifier},
    },
};

/// Creates a new quiz owned by the calling instructor.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let instructor_id = actor.instructor_id()?;
    req.validate()?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (instructor_id, title, description, total_marks, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, instructor_id, title, description, total_marks, created_at
        "#,
    )
    .bind(instructor_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.total_marks)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    tracing::info!("Instructor {} created quiz {}", instructor_id, quiz.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "quiz": quiz })),
    ))
}

/// Adds a multiple-choice question to a quiz the caller owns.
///
/// Attempts that already started keep their question count; the new
/// question only counts for attempts started afterwards.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    Extension(actor): Extension<Actor>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let instructor_id = actor.instructor_id()?;
    req.validate()?;

    if !req.correct_option_is_listed() {
        return Err(AppError::BadRequest(
            "Correct option must match one of the four options".to_string(),
        ));
    }

    let mut conn = pool.acquire().await?;
    let quiz = catalog::require_quiz(&mut conn, quiz_id).await?;
    if quiz.instructor_id != instructor_id {
        return Err(AppError::Forbidden(
            "You can only edit your own quizzes".to_string(),
        ));
    }

    let question = sqlx::query_as::<_, QuizQuestion>(
        r#"
        INSERT INTO quiz_questions
            (quiz_id, prompt, option_a, option_b, option_c, option_d, correct_option, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, quiz_id, prompt, option_a, option_b, option_c, option_d, correct_option, created_at
        "#,
    )
    .bind(quiz_id)
    .bind(&req.prompt)
    .bind(&req.option_a)
    .bind(&req.option_b)
    .bind(&req.option_c)
    .bind(&req.option_d)
    .bind(&req.correct_option)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "question": question })),
    ))
}

/// Assigns a quiz to a course and notifies every learner enrolled in it.
///
/// The caller must own both the quiz and the course. Assigning the same
/// pair twice answers 409.
pub async fn assign_quiz(
    State(pool): State<SqlitePool>,
    State(notifier): State<Arc<dyn Notifier>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<AssignQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let instructor_id = actor.instructor_id()?;

    let (quiz, course, learners) = {
        let mut conn = pool.acquire().await?;
        let quiz = catalog::require_quiz(&mut conn, req.quiz_id).await?;
        let course = catalog::require_course(&mut conn, req.course_id).await?;

        if quiz.instructor_id != instructor_id || course.instructor_id != instructor_id {
            return Err(AppError::Forbidden(
                "You can only assign your own quizzes to your own courses".to_string(),
            ));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO course_quizzes (course_id, quiz_id, assigned_at)
            VALUES (?, ?, ?)
            ON CONFLICT (course_id, quiz_id) DO NOTHING
            "#,
        )
        .bind(course.id)
        .bind(quiz.id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Quiz is already assigned to this course".to_string(),
            ));
        }

        let learners: Vec<i64> =
            sqlx::query_scalar("SELECT learner_id FROM enrollments WHERE course_id = ? ORDER BY learner_id")
                .bind(course.id)
                .fetch_all(&mut *conn)
                .await?;

        (quiz, course, learners)
    };

    for learner_id in &learners {
        notifier
            .emit(NotificationEvent::QuizAssigned {
                learner_id: *learner_id,
                quiz_id: quiz.id,
                quiz_title: quiz.title.clone(),
                course_id: course.id,
                course_title: course.title.clone(),
            })
            .await;
    }

    tracing::info!(
        "Quiz {} assigned to course {} ({} learners notified)",
        quiz.id,
        course.id,
        learners.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Quiz assigned to course successfully",
            "data": { "quiz_id": quiz.id, "course_id": course.id },
            "notified": learners.len(),
        })),
    ))
}

/// Lists the quizzes assigned to a course, oldest assignment first.
pub async fn course_assigned_quizzes(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    catalog::require_course(&mut conn, course_id).await?;

    let quizzes = sqlx::query_as::<_, CourseQuiz>(
        r#"
        SELECT cq.id, cq.course_id, cq.quiz_id, q.title AS quiz_title, q.total_marks, cq.assigned_at
        FROM course_quizzes cq
        JOIN quizzes q ON q.id = cq.quiz_id
        WHERE cq.course_id = ?
        ORDER BY cq.assigned_at, cq.id
        "#,
    )
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Json(json!({ "status": "success", "data": quizzes })))
}
