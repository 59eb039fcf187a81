// src/handlers/notification.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{error::AppError, models::{actor::Actor, notification::Notification}};

/// Lists the caller's notifications, newest first.
pub async fn list_notifications(
    State(pool): State<SqlitePool>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, kind, title, message, quiz_id, course_id, is_read, created_at
        FROM notifications
        WHERE recipient_kind = ? AND recipient_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT 100
        "#,
    )
    .bind(actor.role().as_str())
    .bind(actor.id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "status": "success", "data": notifications })))
}

pub async fn unread_count(
    State(pool): State<SqlitePool>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_kind = ? AND recipient_id = ? AND is_read = 0",
    )
    .bind(actor.role().as_str())
    .bind(actor.id())
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "status": "success", "count": count })))
}

/// Marks one of the caller's notifications as read.
///
/// Notifications addressed to someone else answer 404.
pub async fn mark_read(
    State(pool): State<SqlitePool>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE notifications SET is_read = 1
        WHERE id = ? AND recipient_kind = ? AND recipient_id = ?
        "#,
    )
    .bind(notification_id)
    .bind(actor.role().as_str())
    .bind(actor.id())
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({ "status": "success", "message": "Notification marked as read" })))
}
