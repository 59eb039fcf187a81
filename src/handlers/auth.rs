// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{actor::Actor, user::LoginRequest},
    services::catalog,
    utils::{hash::verify_password, jwt::sign_jwt},
};

/// Authenticates an instructor or learner and returns a JWT token.
///
/// The `role` in the payload selects the account table. Unknown email and
/// wrong password both answer 401 with the same message.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = pool.acquire().await?;
    let account = catalog::find_account_by_email(&mut conn, payload.role, &payload.email)
        .await?
        .filter(|account| verify_password(&payload.password, &account.password))
        .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    let actor = Actor::new(payload.role, account.id);
    let token = sign_jwt(actor, &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!("{} {} logged in", payload.role.as_str(), account.id);

    Ok(Json(json!({
        "status": "success",
        "token": token,
        "type": "Bearer",
        "role": payload.role,
        "id": account.id,
        "full_name": account.full_name,
    })))
}
