// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;
use lms_backend::config::Config;
use lms_backend::db;
use lms_backend::error::AppError;
use lms_backend::routes;
use lms_backend::services::notifier::DbNotifier;
use lms_backend::state::AppState;
use lms_backend::utils::hash::hash_password;
use sqlx::SqlitePool;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "lms.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match db::connect(&config).await {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to open database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database opened: {}", config.database_url);

    tracing::info!("Running migrations...");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    if let Err(e) = seed_instructor(&pool, &config).await {
        tracing::error!("Failed to seed instructor account: {:?}", e);
    }

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        notifier: Arc::new(DbNotifier::new(pool.clone())),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}

async fn seed_instructor(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.instructor_email, &config.instructor_password)
    else {
        return Ok(());
    };

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM instructors WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if exists.is_none() {
        tracing::info!("Seeding instructor account: {}", email);
        let hashed_password = hash_password(password)?;
        let full_name = config.instructor_name.as_deref().unwrap_or("Instructor");

        sqlx::query(
            "INSERT INTO instructors (full_name, email, password, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(full_name)
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        tracing::info!("Instructor account created successfully.");
    }
    Ok(())
}
