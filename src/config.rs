// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::utils::retry::RetryPolicy;

/// Default token lifetime: one day.
const DEFAULT_JWT_EXPIRATION_SECS: u64 = 60 * 60 * 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,

    /// Seed instructor account, created on startup when both are present.
    pub instructor_email: Option<String>,
    pub instructor_password: Option<String>,
    pub instructor_name: Option<String>,

    pub storage_retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://lms.db".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = parse_or("JWT_EXPIRATION", DEFAULT_JWT_EXPIRATION_SECS);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let defaults = RetryPolicy::default();
        let storage_retry = RetryPolicy {
            max_attempts: parse_or("STORAGE_RETRY_ATTEMPTS", defaults.max_attempts),
            base_delay: Duration::from_millis(parse_or(
                "STORAGE_RETRY_BASE_MS",
                defaults.base_delay.as_millis() as u64,
            )),
            max_delay: Duration::from_millis(parse_or(
                "STORAGE_RETRY_MAX_MS",
                defaults.max_delay.as_millis() as u64,
            )),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            instructor_email: env::var("INSTRUCTOR_EMAIL").ok(),
            instructor_password: env::var("INSTRUCTOR_PASSWORD").ok(),
            instructor_name: env::var("INSTRUCTOR_NAME").ok(),
            storage_retry,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
