// tests/quiz_flow_tests.rs

mod common;

use common::{quiz_fixture, spawn_app};
use serde_json::json;

fn start_path(quiz_id: i64, learner_id: i64, course_id: i64) -> String {
    format!("/quiz/{}/attempt/{}/{}", quiz_id, learner_id, course_id)
}

#[tokio::test]
async fn start_returns_questions_without_answers() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;

    let (status, body) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;

    assert_eq!(status, 200);
    assert_eq!(body["quiz"]["title"], "Intro Quiz");
    assert_eq!(body["quiz"]["total_questions"], 4);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 4);
    assert!(questions.iter().all(|q| q.get("correct_option").is_none()));
    assert!(body["attempt_id"].as_i64().is_some());
}

#[tokio::test]
async fn start_twice_resumes_the_same_attempt() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let path = start_path(fx.quiz_id, fx.learner_id, fx.course_id);

    let (_, first) = app.get(&path).await;
    let (status, second) = app.get(&path).await;

    assert_eq!(status, 200);
    assert_eq!(first["attempt_id"], second["attempt_id"]);

    let open: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE is_completed = 0")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(open, 1);
}

#[tokio::test]
async fn start_rejects_learner_not_enrolled() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let outsider = app.learner("Bob", "bob@example.com", "password123").await;

    let (status, body) = app.get(&start_path(fx.quiz_id, outsider, fx.course_id)).await;

    assert_eq!(status, 403);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn start_rejects_unassigned_and_unknown_quiz() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let unassigned = app.quiz(fx.instructor_id, "Loose Quiz", 5).await;

    let (status, _) = app.get(&start_path(unassigned, fx.learner_id, fx.course_id)).await;
    assert_eq!(status, 400);

    let (status, body) = app.get(&start_path(9999, fx.learner_id, fx.course_id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Quiz not found");
}

#[tokio::test]
async fn submit_scores_three_of_four_as_seven_and_a_half() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();

    let answers = json!({
        "answers": [
            { "question_id": fx.questions[0], "selected_answer": "A" },
            { "question_id": fx.questions[1], "selected_answer": "B" },
            { "question_id": fx.questions[2], "selected_answer": "C" },
            { "question_id": fx.questions[3], "selected_answer": "A" },
        ]
    });
    let (status, body) = app
        .post(&format!("/quiz-attempt/{}/submit", attempt_id), answers)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["total_questions"], 4);
    assert_eq!(body["correct_answers"], 3);
    assert_eq!(body["obtained_marks"], 7.5);
    assert_eq!(body["total_marks"], 10);

    // The instructor hears about it once
    assert_eq!(app.notification_count("instructor", fx.instructor_id).await, 1);

    // No longer available, and listed in the results
    let (_, available) = app
        .get(&format!("/student-available-quizzes/{}", fx.learner_id))
        .await;
    assert!(available["data"].as_array().unwrap().is_empty());

    let (_, results) = app
        .get(&format!("/student-quiz-results/{}", fx.learner_id))
        .await;
    assert_eq!(results["data"][0]["percentage"], 75.0);
}

#[tokio::test]
async fn second_submit_is_rejected_and_score_kept() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();
    let path = format!("/quiz-attempt/{}/submit", attempt_id);

    let first = json!({ "answers": [{ "question_id": fx.questions[0], "selected_answer": "A" }] });
    let (status, _) = app.post(&path, first).await;
    assert_eq!(status, 200);

    let all_right = json!({
        "answers": fx.questions.iter().zip(["A", "B", "C", "D"])
            .map(|(id, a)| json!({ "question_id": id, "selected_answer": a }))
            .collect::<Vec<_>>()
    });
    let (status, body) = app.post(&path, all_right).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "This quiz attempt has already been submitted");

    let marks: f64 = sqlx::query_scalar("SELECT obtained_marks FROM quiz_attempts WHERE id = ?")
        .bind(attempt_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(marks, 2.5);

    // Starting again after completion is refused
    let (status, body) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "You have already completed this quiz");
}

#[tokio::test]
async fn overlapping_submits_on_one_connection_complete_once() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();
    let path = format!("/quiz-attempt/{}/submit", attempt_id);
    let body = json!({ "answers": [{ "question_id": fx.questions[1], "selected_answer": "B" }] });

    let (a, b) = tokio::join!(app.post(&path, body.clone()), app.post(&path, body.clone()));
    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [200, 400]);

    let responses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_responses WHERE attempt_id = ?")
        .bind(attempt_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(responses, 1);
    assert_eq!(app.notification_count("instructor", fx.instructor_id).await, 1);
}

#[tokio::test]
async fn submit_with_no_answers_leaves_attempt_open() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();

    let (status, body) = app
        .post(&format!("/quiz-attempt/{}/submit", attempt_id), json!({ "answers": [] }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "No answers submitted");

    let completed: bool = sqlx::query_scalar("SELECT is_completed FROM quiz_attempts WHERE id = ?")
        .bind(attempt_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(!completed);
}

#[tokio::test]
async fn repeated_and_unknown_answers_do_not_inflate_score() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();

    let answers = json!({
        "answers": [
            { "question_id": fx.questions[0], "selected_answer": "A" },
            { "question_id": fx.questions[0], "selected_answer": "A" },
            { "question_id": fx.questions[0], "selected_answer": "A" },
            { "question_id": 424242, "selected_answer": "A" },
        ]
    });
    let (status, body) = app
        .post(&format!("/quiz-attempt/{}/submit", attempt_id), answers)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["correct_answers"], 1);
    assert_eq!(body["obtained_marks"], 2.5);

    let (status, detail) = app.get(&format!("/quiz-attempt/{}", attempt_id)).await;
    assert_eq!(status, 200);
    let responses = detail["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["right_answer"], "A");
}

#[tokio::test]
async fn question_added_after_start_does_not_change_the_divisor() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();

    let late = app.question(fx.quiz_id, "Late question", "A").await;

    let answers = json!({
        "answers": [
            { "question_id": fx.questions[0], "selected_answer": "A" },
            { "question_id": late, "selected_answer": "A" },
        ]
    });
    let (status, body) = app
        .post(&format!("/quiz-attempt/{}/submit", attempt_id), answers)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["total_questions"], 4);
    assert_eq!(body["correct_answers"], 2);
    assert_eq!(body["obtained_marks"], 5.0);
}

#[tokio::test]
async fn unknown_attempt_is_not_found() {
    let app = spawn_app().await;

    let (status, _) = app
        .post("/quiz-attempt/777/submit", json!({ "answers": [{ "question_id": 1, "selected_answer": "A" }] }))
        .await;
    assert_eq!(status, 404);

    let (status, _) = app.get("/quiz-attempt/777").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn course_quiz_results_lists_completed_learners() {
    let app = spawn_app().await;
    let fx = quiz_fixture(&app).await;
    let (_, started) = app.get(&start_path(fx.quiz_id, fx.learner_id, fx.course_id)).await;
    let attempt_id = started["attempt_id"].as_i64().unwrap();
    app.post(
        &format!("/quiz-attempt/{}/submit", attempt_id),
        json!({ "answers": [{ "question_id": fx.questions[0], "selected_answer": "A" }] }),
    )
    .await;

    let (status, body) = app
        .get(&format!("/course-quiz-results/{}/{}", fx.course_id, fx.quiz_id))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["quiz_title"], "Intro Quiz");
    assert_eq!(body["course_title"], "Rust 101");
    assert_eq!(body["total_students"], 1);
    assert_eq!(body["results"][0]["student_name"], "Ada");
}
