use std::sync::Arc;

use crate::config::Config;
use crate::services::notifier::Notifier;
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub notifier: Arc<dyn Notifier>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Notifier> {
    fn from_ref(state: &AppState) -> Self {
        state.notifier.clone()
    }
}
