use actix_web::{App, test};
use life_manager_api::data::memory::InMemoryKeyValueStore;
use life_manager_api::data::uploads::InMemoryUploadStore;
use life_manager_api::infrastructure::config::Config;
use life_manager_api::presentation::handlers::AppContext;
use life_manager_api::presentation::routes::configure;
use serde_json::json;
use std::sync::Arc;

macro_rules! setup_test_app {
    () => {{
        let ctx = AppContext::new(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(InMemoryUploadStore::new()),
            &Config::default(),
        );

        test::init_service(App::new().configure(|cfg| configure(cfg, &ctx))).await
    }};
}

/// Signs a user up and returns `(user_id, bearer header value)`.
macro_rules! signup {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "email": $email, "password": "secret1", "name": "Tester" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            format!("Bearer {}", body["accessToken"].as_str().unwrap()),
        )
    }};
}

#[actix_web::test]
async fn test_requires_authentication() {
    let app = setup_test_app!();

    for uri in [
        "/api/me/tasks",
        "/api/me/health-entries",
        "/api/me/finance-entries",
        "/api/me/goals",
        "/api/me/dashboard",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401, "{} should need a token", uri);
    }
}

#[actix_web::test]
async fn test_tasks_are_scoped_by_user() {
    let app = setup_test_app!();
    let (u1, auth1) = signup!(app, "u1@x.io");
    let (_u2, auth2) = signup!(app, "u2@x.io");

    let req = test::TestRequest::post()
        .uri("/api/me/tasks")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "title": "Pay bills", "userId": "someone-else" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let task: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(task["userId"], u1.as_str());
    assert_eq!(task["completed"], false);
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["category"], "personal");

    let req = test::TestRequest::get()
        .uri("/api/me/tasks")
        .insert_header(("Authorization", auth1.clone()))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Pay bills");

    let req = test::TestRequest::get()
        .uri("/api/me/tasks")
        .insert_header(("Authorization", auth2))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks, json!([]));
}

#[actix_web::test]
async fn test_update_and_delete_task() {
    let app = setup_test_app!();
    let (_u1, auth1) = signup!(app, "u1@x.io");
    let (_u2, auth2) = signup!(app, "u2@x.io");

    let req = test::TestRequest::post()
        .uri("/api/me/tasks")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "title": "Pay bills", "priority": "high" }))
        .to_request();
    let task: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/me/tasks/{}", task_id))
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Pay bills");
    assert_eq!(updated["priority"], "high");

    // Another user cannot touch it
    let req = test::TestRequest::patch()
        .uri(&format!("/api/me/tasks/{}", task_id))
        .insert_header(("Authorization", auth2.clone()))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/me/tasks/{}", task_id))
        .insert_header(("Authorization", auth2))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let req = test::TestRequest::patch()
        .uri("/api/me/tasks/missing")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/me/tasks/{}", task_id))
        .insert_header(("Authorization", auth1.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    let req = test::TestRequest::get()
        .uri("/api/me/tasks")
        .insert_header(("Authorization", auth1))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks, json!([]));
}

#[actix_web::test]
async fn test_health_entries() {
    let app = setup_test_app!();
    let (u1, auth1) = signup!(app, "u1@x.io");

    let req = test::TestRequest::post()
        .uri("/api/me/health-entries")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "date": "2024-05-01", "steps": 8000, "mood": 4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let entry: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(entry["userId"], u1.as_str());
    assert_eq!(entry["steps"], 8000);

    let req = test::TestRequest::post()
        .uri("/api/me/health-entries")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "date": "2024-05-02", "mood": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let req = test::TestRequest::get()
        .uri("/api/me/health-entries")
        .insert_header(("Authorization", auth1))
        .to_request();
    let entries: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_finance_summary() {
    let app = setup_test_app!();
    let (_u1, auth1) = signup!(app, "u1@x.io");

    let entries = [
        json!({ "amount": 3000.0, "category": "salary", "type": "income", "date": "2024-05-01" }),
        json!({ "amount": 50.0, "category": "food", "type": "expense", "date": "2024-05-03" }),
        json!({ "amount": 25.0, "category": "food", "type": "expense", "date": "2024-05-10" }),
        json!({ "amount": 900.0, "category": "rent", "type": "expense", "date": "2024-05-02" }),
        json!({ "amount": 70.0, "category": "food", "type": "expense", "date": "2024-04-28" }),
    ];
    for entry in entries {
        let req = test::TestRequest::post()
            .uri("/api/me/finance-entries")
            .insert_header(("Authorization", auth1.clone()))
            .set_json(entry)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
    }

    let req = test::TestRequest::get()
        .uri("/api/me/finance-entries/summary?month=2024-05")
        .insert_header(("Authorization", auth1.clone()))
        .to_request();
    let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["month"], "2024-05");
    assert_eq!(summary["income"], 3000.0);
    assert_eq!(summary["expenses"], 975.0);
    assert_eq!(summary["balance"], 2025.0);
    assert_eq!(summary["topCategories"][0]["category"], "rent");
    assert_eq!(summary["topCategories"][1]["category"], "food");
    assert_eq!(summary["topCategories"][1]["total"], 75.0);

    let req = test::TestRequest::get()
        .uri("/api/me/finance-entries/summary?month=May-2024")
        .insert_header(("Authorization", auth1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_goals_progress_is_clamped() {
    let app = setup_test_app!();
    let (_u1, auth1) = signup!(app, "u1@x.io");

    let req = test::TestRequest::post()
        .uri("/api/me/goals")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({
            "title": "Run a marathon",
            "targetDate": "2024-10-01",
            "milestones": ["5k", "", "  ", "half"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let goal: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(goal["progress"], 0);
    assert_eq!(goal["milestones"], json!(["5k", "half"]));
    let goal_id = goal["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/me/goals/{}", goal_id))
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "progress": 1000 }))
        .to_request();
    let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["progress"], 100);
    assert_eq!(updated["title"], "Run a marathon");

    let req = test::TestRequest::post()
        .uri("/api/me/goals")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "title": "Overachiever", "progress": 1000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let goal: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(goal["progress"], 100);

    let req = test::TestRequest::post()
        .uri("/api/me/goals")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "title": "Backwards", "progress": -20 }))
        .to_request();
    let goal: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(goal["progress"], 0);

    let req = test::TestRequest::patch()
        .uri("/api/me/goals/missing")
        .insert_header(("Authorization", auth1))
        .set_json(json!({ "progress": 10 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn test_dashboard() {
    let app = setup_test_app!();
    let (_u1, auth1) = signup!(app, "u1@x.io");

    for (title, completed) in [("Pay bills", true), ("Call mom", false)] {
        let req = test::TestRequest::post()
            .uri("/api/me/tasks")
            .insert_header(("Authorization", auth1.clone()))
            .set_json(json!({ "title": title, "completed": completed }))
            .to_request();
        test::call_service(&app, req).await;
    }
    for progress in [40, 80] {
        let req = test::TestRequest::post()
            .uri("/api/me/goals")
            .insert_header(("Authorization", auth1.clone()))
            .set_json(json!({ "title": "Goal", "progress": progress }))
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::post()
        .uri("/api/me/finance-entries")
        .insert_header(("Authorization", auth1.clone()))
        .set_json(json!({ "amount": 20.0, "category": "food", "type": "expense", "date": "2024-06-02" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/me/dashboard?month=2024-06")
        .insert_header(("Authorization", auth1))
        .to_request();
    let dashboard: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dashboard["tasks"]["total"], 2);
    assert_eq!(dashboard["tasks"]["completed"], 1);
    assert_eq!(dashboard["goals"]["total"], 2);
    assert_eq!(dashboard["goals"]["averageProgress"], 60.0);
    assert_eq!(dashboard["healthEntries"], 0);
    assert_eq!(dashboard["finances"]["expenses"], 20.0);
    assert_eq!(dashboard["finances"]["balance"], -20.0);
}
