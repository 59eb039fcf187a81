// src/services/notifier.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{actor::Actor, notification::NotificationKind},
};

/// Events the core hands to the notification collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A learner finished a quiz; goes to the quiz's instructor.
    QuizCompleted {
        instructor_id: i64,
        learner_id: i64,
        learner_name: String,
        quiz_id: i64,
        course_id: i64,
        quiz_title: String,
        obtained_marks: f64,
        total_marks: i64,
    },
    /// A quiz became available in a course the learner is enrolled in.
    QuizAssigned {
        learner_id: i64,
        quiz_id: i64,
        quiz_title: String,
        course_id: i64,
        course_title: String,
    },
}

impl NotificationEvent {
    pub fn recipient(&self) -> Actor {
        match self {
            NotificationEvent::QuizCompleted { instructor_id, .. } => Actor::Instructor(*instructor_id),
            NotificationEvent::QuizAssigned { learner_id, .. } => Actor::Learner(*learner_id),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::QuizCompleted { .. } => NotificationKind::QuizCompleted,
            NotificationEvent::QuizAssigned { .. } => NotificationKind::QuizAssigned,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationEvent::QuizCompleted { .. } => "Quiz Completed",
            NotificationEvent::QuizAssigned { .. } => "New Quiz Available",
        }
    }

    pub fn message(&self) -> String {
        match self {
            NotificationEvent::QuizCompleted {
                learner_name,
                quiz_title,
                obtained_marks,
                total_marks,
                ..
            } => format!(
                "Student {} has completed the quiz \"{}\" with score {}/{}",
                learner_name, quiz_title, obtained_marks, total_marks
            ),
            NotificationEvent::QuizAssigned {
                quiz_title,
                course_title,
                ..
            } => format!(
                "A new quiz \"{}\" has been assigned to the course \"{}\"",
                quiz_title, course_title
            ),
        }
    }

    fn related(&self) -> (i64, i64) {
        match self {
            NotificationEvent::QuizCompleted { quiz_id, course_id, .. }
            | NotificationEvent::QuizAssigned { quiz_id, course_id, .. } => (*quiz_id, *course_id),
        }
    }
}

/// Fire-and-forget sink for notification events.
///
/// Implementations handle their own failures; callers never see them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn emit(&self, event: NotificationEvent);
}

/// Stores events as rows in the 'notifications' table.
pub struct DbNotifier {
    pool: SqlitePool,
}

impl DbNotifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn store(&self, event: &NotificationEvent) -> Result<(), AppError> {
        let recipient = event.recipient();
        let (quiz_id, course_id) = event.related();

        sqlx::query(
            r#"
            INSERT INTO notifications
                (recipient_kind, recipient_id, kind, title, message, quiz_id, course_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(recipient.role().as_str())
        .bind(recipient.id())
        .bind(event.kind().as_str())
        .bind(event.title())
        .bind(event.message())
        .bind(quiz_id)
        .bind(course_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for DbNotifier {
    async fn emit(&self, event: NotificationEvent) {
        if let Err(e) = self.store(&event).await {
            tracing::warn!("Failed to store {:?} notification: {}", event.kind(), e);
        }
    }
}
