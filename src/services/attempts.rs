// src/services/attempts.rs

//! Quiz attempt lifecycle: Open -> Completed (terminal).

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    db,
    error::AppError,
    models::{
        attempt::{
            AnswerSubmission, AttemptDetail, AttemptSummary, LearnerResult, QuizAttempt, QuizMeta,
            ResponseReview, ScoreResult, StartedAttempt,
        },
        quiz::{AvailableQuiz, PublicQuestion},
    },
    services::{
        catalog, enrollment,
        notifier::{NotificationEvent, Notifier},
        scoring,
    },
    utils::retry::{RetryPolicy, with_retry},
};

const ATTEMPT_WITH_QUIZ: &str = r#"
    SELECT
        a.id, a.learner_id, a.quiz_id, a.course_id,
        a.total_questions, a.correct_answers, a.obtained_marks,
        a.is_completed, a.started_at, a.completed_at,
        q.title AS quiz_title, q.total_marks, q.instructor_id
    FROM quiz_attempts a
    JOIN quizzes q ON q.id = a.quiz_id
"#;

async fn is_assigned(conn: &mut SqliteConnection, quiz_id: i64, course_id: i64) -> Result<bool, AppError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM course_quizzes WHERE quiz_id = ? AND course_id = ?")
            .bind(quiz_id)
            .bind(course_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

async fn has_completed_attempt(
    conn: &mut SqliteConnection,
    learner_id: i64,
    quiz_id: i64,
    course_id: i64,
) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT 1 FROM quiz_attempts
        WHERE learner_id = ? AND quiz_id = ? AND course_id = ? AND is_completed = 1
        "#,
    )
    .bind(learner_id)
    .bind(quiz_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found.is_some())
}

fn already_completed() -> AppError {
    AppError::InvalidState("You have already completed this quiz".to_string())
}

/// Opens an attempt for the (learner, quiz, course) triple, or returns the
/// one that is already open.
pub async fn start_attempt(
    pool: &SqlitePool,
    policy: &RetryPolicy,
    learner_id: i64,
    quiz_id: i64,
    course_id: i64,
) -> Result<StartedAttempt, AppError> {
    with_retry(policy, || start_once(pool, learner_id, quiz_id, course_id)).await
}

async fn start_once(
    pool: &SqlitePool,
    learner_id: i64,
    quiz_id: i64,
    course_id: i64,
) -> Result<StartedAttempt, AppError> {
    let mut conn = pool.acquire().await?;

    if !enrollment::is_enrolled(&mut conn, learner_id, course_id).await? {
        return Err(AppError::NotEnrolled(
            "Student is not enrolled in this course".to_string(),
        ));
    }

    let quiz = catalog::require_quiz(&mut conn, quiz_id).await?;

    if !is_assigned(&mut conn, quiz_id, course_id).await? {
        return Err(AppError::InvalidState(
            "This quiz is not assigned to the course".to_string(),
        ));
    }

    if has_completed_attempt(&mut conn, learner_id, quiz_id, course_id).await? {
        return Err(already_completed());
    }

    let questions = sqlx::query_as::<_, PublicQuestion>(
        r#"
        SELECT id, prompt, option_a, option_b, option_c, option_d
        FROM quiz_questions
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    // Single statement: the unique (learner, quiz, course, is_completed) key
    // makes concurrent starts converge on one open row, and the NOT EXISTS
    // guard refuses to open a new one next to a completed attempt.
    let inserted = sqlx::query(
        r#"
        INSERT INTO quiz_attempts (learner_id, quiz_id, course_id, total_questions, started_at)
        SELECT ?, ?, ?, ?, ?
        WHERE NOT EXISTS (
            SELECT 1 FROM quiz_attempts
            WHERE learner_id = ? AND quiz_id = ? AND course_id = ? AND is_completed = 1
        )
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(learner_id)
    .bind(quiz_id)
    .bind(course_id)
    .bind(questions.len() as i64)
    .bind(Utc::now())
    .bind(learner_id)
    .bind(quiz_id)
    .bind(course_id)
    .execute(&mut *conn)
    .await?;

    let open: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT id, total_questions FROM quiz_attempts
        WHERE learner_id = ? AND quiz_id = ? AND course_id = ? AND is_completed = 0
        "#,
    )
    .bind(learner_id)
    .bind(quiz_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await?;

    // Nothing open means a submission completed the triple in between.
    let (attempt_id, snapshot) = open.ok_or_else(already_completed)?;

    if inserted.rows_affected() == 1 {
        tracing::info!(
            "Opened attempt {} for learner {} on quiz {} in course {} ({} questions)",
            attempt_id,
            learner_id,
            quiz_id,
            course_id,
            snapshot
        );
    } else {
        tracing::debug!("Resumed open attempt {} for learner {}", attempt_id, learner_id);
    }

    Ok(StartedAttempt {
        quiz: QuizMeta {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            total_marks: quiz.total_marks,
            total_questions: snapshot,
        },
        questions,
        attempt_id,
    })
}

/// Scores and completes an open attempt exactly once, then notifies the
/// quiz's instructor.
pub async fn submit_attempt(
    pool: &SqlitePool,
    policy: &RetryPolicy,
    notifier: &dyn Notifier,
    attempt_id: i64,
    answers: &[AnswerSubmission],
) -> Result<ScoreResult, AppError> {
    let (score, event) = with_retry(policy, || submit_once(pool, attempt_id, answers)).await?;

    // Committed already; a failed notification must not undo the submission.
    notifier.emit(event).await;

    Ok(score)
}

async fn submit_once(
    pool: &SqlitePool,
    attempt_id: i64,
    answers: &[AnswerSubmission],
) -> Result<(ScoreResult, NotificationEvent), AppError> {
    let mut tx = db::begin_write(pool).await?;

    let attempt = sqlx::query_as::<_, QuizAttempt>(&format!("{} WHERE a.id = ?", ATTEMPT_WITH_QUIZ))
        .bind(attempt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz attempt not found".to_string()))?;

    if attempt.is_completed {
        return Err(already_submitted());
    }

    if answers.is_empty() {
        return Err(AppError::InvalidState("No answers submitted".to_string()));
    }

    let answer_key: HashMap<i64, String> =
        sqlx::query_as::<_, (i64, String)>("SELECT id, correct_option FROM quiz_questions WHERE quiz_id = ?")
            .bind(attempt.quiz_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

    let graded = scoring::grade_answers(&answer_key, answers);
    let correct = graded.iter().filter(|g| g.is_correct).count() as i64;
    let score = scoring::score(attempt.total_marks, attempt.total_questions, correct);
    let now = Utc::now();

    // Compare-and-set: only the caller that still sees the attempt open wins.
    let flipped = sqlx::query(
        r#"
        UPDATE quiz_attempts
        SET is_completed = 1, correct_answers = ?, obtained_marks = ?, completed_at = ?
        WHERE id = ? AND is_completed = 0
        "#,
    )
    .bind(score.correct_answers)
    .bind(score.obtained_marks)
    .bind(now)
    .bind(attempt.id)
    .execute(&mut *tx)
    .await?;

    if flipped.rows_affected() == 0 {
        return Err(already_submitted());
    }

    for answer in &graded {
        sqlx::query(
            r#"
            INSERT INTO quiz_responses (attempt_id, question_id, selected_answer, is_correct, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(attempt.id)
        .bind(answer.question_id)
        .bind(&answer.selected_answer)
        .bind(answer.is_correct)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    let learner_name: Option<String> = sqlx::query_scalar("SELECT full_name FROM learners WHERE id = ?")
        .bind(attempt.learner_id)
        .fetch_optional(&mut *tx)
        .await?;

    tx.commit().await?;

    if graded.len() < answers.len() {
        tracing::debug!(
            "Attempt {}: ignored {} unknown or repeated answers",
            attempt.id,
            answers.len() - graded.len()
        );
    }
    tracing::info!(
        "Attempt {} submitted: {}/{} correct, {} of {} marks",
        attempt.id,
        score.correct_answers,
        score.total_questions,
        score.obtained_marks,
        score.total_marks
    );

    let event = NotificationEvent::QuizCompleted {
        instructor_id: attempt.instructor_id,
        learner_id: attempt.learner_id,
        learner_name: learner_name.unwrap_or_else(|| format!("#{}", attempt.learner_id)),
        quiz_id: attempt.quiz_id,
        course_id: attempt.course_id,
        quiz_title: attempt.quiz_title,
        obtained_marks: score.obtained_marks,
        total_marks: score.total_marks,
    };

    Ok((score, event))
}

fn already_submitted() -> AppError {
    AppError::InvalidState("This quiz attempt has already been submitted".to_string())
}

/// Quizzes assigned to the learner's courses that they have not completed there yet.
pub async fn available_quizzes(
    conn: &mut SqliteConnection,
    learner_id: i64,
) -> Result<Vec<AvailableQuiz>, AppError> {
    let quizzes = sqlx::query_as::<_, AvailableQuiz>(
        r#"
        SELECT
            cq.id,
            cq.course_id,
            c.title AS course_title,
            cq.quiz_id,
            q.title AS quiz_title,
            (SELECT COUNT(*) FROM quiz_questions qq WHERE qq.quiz_id = q.id) AS total_questions,
            q.total_marks,
            cq.assigned_at
        FROM enrollments e
        JOIN course_quizzes cq ON cq.course_id = e.course_id
        JOIN courses c ON c.id = cq.course_id
        JOIN quizzes q ON q.id = cq.quiz_id
        WHERE e.learner_id = ?
          AND NOT EXISTS (
            SELECT 1 FROM quiz_attempts a
            WHERE a.learner_id = e.learner_id
              AND a.quiz_id = cq.quiz_id
              AND a.course_id = cq.course_id
              AND a.is_completed = 1
          )
        ORDER BY cq.assigned_at DESC, cq.id DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(quizzes)
}

/// Completed attempts of a learner, newest first.
pub async fn quiz_results(
    conn: &mut SqliteConnection,
    learner_id: i64,
) -> Result<Vec<AttemptSummary>, AppError> {
    let mut results = sqlx::query_as::<_, AttemptSummary>(
        r#"
        SELECT
            a.id AS attempt_id,
            a.quiz_id,
            q.title AS quiz_title,
            a.course_id,
            c.title AS course_title,
            a.total_questions,
            a.correct_answers,
            a.obtained_marks,
            q.total_marks,
            a.started_at,
            a.completed_at
        FROM quiz_attempts a
        JOIN quizzes q ON q.id = a.quiz_id
        JOIN courses c ON c.id = a.course_id
        WHERE a.learner_id = ? AND a.is_completed = 1
        ORDER BY a.completed_at DESC, a.id DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(&mut *conn)
    .await?;

    for r in &mut results {
        r.percentage = scoring::percentage(r.obtained_marks, r.total_marks);
    }

    Ok(results)
}

/// One attempt with every stored response next to the right answer.
pub async fn attempt_detail(
    conn: &mut SqliteConnection,
    attempt_id: i64,
) -> Result<(AttemptDetail, Vec<ResponseReview>), AppError> {
    let mut detail = sqlx::query_as::<_, AttemptDetail>(
        r#"
        SELECT
            a.id AS attempt_id,
            q.title AS quiz_title,
            c.title AS course_title,
            a.total_questions,
            a.correct_answers,
            a.obtained_marks,
            q.total_marks,
            a.is_completed,
            a.started_at
        FROM quiz_attempts a
        JOIN quizzes q ON q.id = a.quiz_id
        JOIN courses c ON c.id = a.course_id
        WHERE a.id = ?
        "#,
    )
    .bind(attempt_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Quiz attempt not found".to_string()))?;

    detail.percentage = scoring::percentage(detail.obtained_marks, detail.total_marks);

    let responses = sqlx::query_as::<_, ResponseReview>(
        r#"
        SELECT
            r.question_id,
            qq.prompt,
            qq.option_a, qq.option_b, qq.option_c, qq.option_d,
            r.selected_answer,
            qq.correct_option AS right_answer,
            r.is_correct
        FROM quiz_responses r
        JOIN quiz_questions qq ON qq.id = r.question_id
        WHERE r.attempt_id = ?
        ORDER BY r.id
        "#,
    )
    .bind(attempt_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok((detail, responses))
}

/// Completed attempts for one quiz in one course, for the instructor's view.
pub async fn course_quiz_results(
    conn: &mut SqliteConnection,
    course_id: i64,
    quiz_id: i64,
) -> Result<(String, String, Vec<LearnerResult>), AppError> {
    let course = catalog::require_course(conn, course_id).await?;
    let quiz = catalog::require_quiz(conn, quiz_id).await?;

    let mut results = sqlx::query_as::<_, LearnerResult>(
        r#"
        SELECT
            a.id AS attempt_id,
            l.id AS student_id,
            l.full_name AS student_name,
            a.total_questions,
            a.correct_answers,
            a.obtained_marks,
            q.total_marks,
            a.completed_at
        FROM quiz_attempts a
        JOIN learners l ON l.id = a.learner_id
        JOIN quizzes q ON q.id = a.quiz_id
        WHERE a.course_id = ? AND a.quiz_id = ? AND a.is_completed = 1
        ORDER BY a.obtained_marks DESC, a.id
        "#,
    )
    .bind(course_id)
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    for r in &mut results {
        r.percentage = scoring::percentage(r.obtained_marks, r.total_marks);
    }

    Ok((quiz.title, course.title, results))
}
