// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lms_backend::{
    config::Config,
    db,
    models::actor::Actor,
    routes,
    services::notifier::DbNotifier,
    state::AppState,
    utils::{hash::hash_password, jwt::sign_jwt, retry::RetryPolicy},
};
use serde_json::Value;
use sqlx::SqlitePool;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
    // Keeps a file-backed database alive for the length of the test
    _dir: Option<tempfile::TempDir>,
}

fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        instructor_email: None,
        instructor_password: None,
        instructor_name: None,
        storage_retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        },
    }
}

/// Spawns the app on a random port, backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let pool = db::memory_pool()
        .await
        .expect("Failed to open in-memory database");

    serve(pool, test_config("sqlite::memory:"), None).await
}

/// Spawns the app over a WAL database file with the production pool, so
/// requests really run on separate connections.
pub async fn spawn_file_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("lms.db").display());
    let config = test_config(&url);

    let pool = db::connect(&config)
        .await
        .expect("Failed to open database file");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    serve(pool, config, Some(dir)).await
}

async fn serve(pool: SqlitePool, config: Config, dir: Option<tempfile::TempDir>) -> TestApp {
    let state = AppState {
        pool: pool.clone(),
        config,
        notifier: Arc::new(DbNotifier::new(pool.clone())),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
        _dir: dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request");
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn get_as(&self, path: &str, token: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request");
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn post_as(&self, path: &str, token: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn instructor(&self, email: &str, password: &str) -> i64 {
        let hashed = hash_password(password).unwrap();
        sqlx::query_scalar(
            "INSERT INTO instructors (full_name, email, password) VALUES (?, ?, ?) RETURNING id",
        )
        .bind("Grace Hopper")
        .bind(email)
        .bind(hashed)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn learner(&self, name: &str, email: &str, password: &str) -> i64 {
        let hashed = hash_password(password).unwrap();
        sqlx::query_scalar(
            "INSERT INTO learners (full_name, email, password) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(hashed)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn course(&self, instructor_id: i64, title: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO courses (instructor_id, title) VALUES (?, ?) RETURNING id")
            .bind(instructor_id)
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn chapter(&self, course_id: i64, title: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO chapters (course_id, title) VALUES (?, ?) RETURNING id")
            .bind(course_id)
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn enroll(&self, learner_id: i64, course_id: i64) {
        sqlx::query("INSERT INTO enrollments (learner_id, course_id, enrolled_at) VALUES (?, ?, ?)")
            .bind(learner_id)
            .bind(course_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn quiz(&self, instructor_id: i64, title: &str, total_marks: i64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO quizzes (instructor_id, title, total_marks, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(instructor_id)
        .bind(title)
        .bind(total_marks)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    /// Adds a question whose options are A..D; `correct` is one of them.
    pub async fn question(&self, quiz_id: i64, prompt: &str, correct: &str) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO quiz_questions
                (quiz_id, prompt, option_a, option_b, option_c, option_d, correct_option, created_at)
            VALUES (?, ?, 'A', 'B', 'C', 'D', ?, ?)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(prompt)
        .bind(correct)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn assign(&self, quiz_id: i64, course_id: i64) {
        sqlx::query("INSERT INTO course_quizzes (course_id, quiz_id, assigned_at) VALUES (?, ?, ?)")
            .bind(course_id)
            .bind(quiz_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn notification_count(&self, recipient_kind: &str, recipient_id: i64) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_kind = ? AND recipient_id = ?",
        )
        .bind(recipient_kind)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }
}

pub fn token_for(actor: Actor) -> String {
    sign_jwt(actor, JWT_SECRET, 600).unwrap()
}

/// Learner enrolled in a course with a four-question quiz (10 marks) assigned.
pub struct QuizFixture {
    pub instructor_id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    pub quiz_id: i64,
    pub questions: Vec<i64>,
}

pub async fn quiz_fixture(app: &TestApp) -> QuizFixture {
    let instructor_id = app.instructor("grace@example.com", "password123").await;
    let learner_id = app.learner("Ada", "ada@example.com", "password123").await;
    let course_id = app.course(instructor_id, "Rust 101").await;
    app.enroll(learner_id, course_id).await;

    let quiz_id = app.quiz(instructor_id, "Intro Quiz", 10).await;
    let mut questions = Vec::new();
    for (i, correct) in ["A", "B", "C", "D"].iter().enumerate() {
        questions.push(app.question(quiz_id, &format!("Question {}", i + 1), correct).await);
    }
    app.assign(quiz_id, course_id).await;

    QuizFixture {
        instructor_id,
        learner_id,
        course_id,
        quiz_id,
        questions,
    }
}
