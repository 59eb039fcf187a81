// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{attempt, auth, enrollment, notification, progress, quiz, rating},
    state::AppState,
    utils::jwt::{auth_middleware, instructor_middleware},
};

/// Assembles the main application router.
///
/// * Learner-facing routes take the learner id from the path.
/// * Instructor authoring and the notification inbox require a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let learner_routes = Router::new()
        .route("/course-enroll", post(enrollment::enroll))
        .route(
            "/check-enrollment/{learner_id}/{course_id}",
            get(enrollment::check_enrollment),
        )
        .route(
            "/enrolled-courses/{learner_id}",
            get(enrollment::enrolled_courses),
        )
        .route(
            "/quiz/{quiz_id}/attempt/{learner_id}/{course_id}",
            get(attempt::start_attempt),
        )
        .route(
            "/quiz-attempt/{attempt_id}/submit",
            post(attempt::submit_attempt),
        )
        .route("/quiz-attempt/{attempt_id}", get(attempt::get_attempt_detail))
        .route(
            "/student-available-quizzes/{learner_id}",
            get(attempt::available_quizzes),
        )
        .route(
            "/student-quiz-results/{learner_id}",
            get(attempt::quiz_results),
        )
        .route(
            "/course-quiz-results/{course_id}/{quiz_id}",
            get(attempt::course_quiz_results),
        )
        .route(
            "/course-assigned-quizzes/{course_id}",
            get(quiz::course_assigned_quizzes),
        )
        .route("/mark-chapter-complete", post(progress::mark_chapter_complete))
        .route(
            "/completed-chapters/{learner_id}/{course_id}",
            get(progress::get_completed_chapters),
        )
        .route(
            "/certificate-eligibility/{learner_id}/{course_id}",
            get(progress::certificate_eligibility),
        )
        .route("/rate-course", post(rating::rate_course));

    // Auth runs first, then the instructor check
    let instructor_routes = Router::new()
        .route("/quizzes", post(quiz::create_quiz))
        .route("/quizzes/{quiz_id}/questions", post(quiz::add_question))
        .route("/assign-quiz", post(quiz::assign_quiz))
        .layer(middleware::from_fn(instructor_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let notification_routes = Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-count", get(notification::unread_count))
        .route("/{notification_id}/read", post(notification::mark_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/instructor", instructor_routes)
        .nest("/notifications", notification_routes)
        .merge(learner_routes);

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
