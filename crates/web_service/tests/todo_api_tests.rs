use actix_http::Request;
use actix_web::{
    dev::{Service, ServiceResponse},
    test, App, Error,
};
use serde_json::{json, Value};
use std::sync::Arc;

use copilot_bridge::DEFAULT_INSTRUCTIONS;
use openai_adapter::{Config, OpenAIAdapter};
use web_service::server::{app_config, AppState};
use web_service::services::session_manager::SessionManager;

async fn setup_test_app() -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    let adapter = OpenAIAdapter::new(Config::empty()).unwrap();
    let sessions = SessionManager::new(DEFAULT_INSTRUCTIONS).unwrap();

    let app_state = actix_web::web::Data::new(AppState {
        adapter: Arc::new(adapter),
        sessions,
    });

    test::init_service(App::new().app_data(app_state.clone()).configure(app_config)).await
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let app = setup_test_app().await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn add_toggle_assign_delete_flow_on_the_default_list() {
    let app = setup_test_app().await;

    // Add
    let req = test::TestRequest::post()
        .uri("/api/todos")
        .set_json(json!({ "text": "  Buy milk  " }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "Buy milk");
    assert_eq!(items[0]["isCompleted"], false);
    assert!(items[0].get("assignedTo").is_none());
    let todo_id = items[0]["id"].as_str().unwrap().to_string();
    assert!(!todo_id.is_empty());

    // Toggle
    let req = test::TestRequest::post()
        .uri(&format!("/api/todos/{}/toggle", todo_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"][0]["isCompleted"], true);

    // Assign
    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}/assignee", todo_id))
        .set_json(json!({ "assignedTo": "Ana" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"][0]["assignedTo"], "Ana");

    // Clearing with null removes the assignee entirely.
    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}/assignee", todo_id))
        .set_json(json!({ "assignedTo": null }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"][0].get("assignedTo").is_none());

    // An empty string clears it too, never stored as "".
    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}/assignee", todo_id))
        .set_json(json!({ "assignedTo": "Bo" }))
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}/assignee", todo_id))
        .set_json(json!({ "assignedTo": "" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"][0].get("assignedTo").is_none());

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/todos/{}", todo_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn adding_blank_text_leaves_the_list_unchanged() {
    let app = setup_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .set_json(json!({ "text": "   " }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn insertion_order_is_display_order() {
    let app = setup_test_app().await;

    for text in ["first", "second", "third"] {
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .set_json(json!({ "text": text }))
            .to_request();
        let _: Value = test::call_and_read_body_json(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/api/todos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let texts: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[actix_web::test]
async fn mutating_an_unknown_todo_is_a_quiet_no_op() {
    let app = setup_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .set_json(json!({ "text": "Buy milk" }))
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/todos/no-such-id/toggle")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::delete()
        .uri("/api/todos/no-such-id")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/api/todos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "Buy milk");
    assert_eq!(items[0]["isCompleted"], false);
}

#[actix_web::test]
async fn sessions_isolate_their_lists() {
    let app = setup_test_app().await;

    let req = test::TestRequest::post().uri("/api/sessions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    assert!(body["createdAt"].as_str().is_some());

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/todos", session_id))
        .set_json(json!({ "text": "Session task" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get().uri("/api/todos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn deleting_a_session_destroys_its_list() {
    let app = setup_test_app().await;

    let req = test::TestRequest::post().uri("/api/sessions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/todos", session_id))
        .set_json(json!({ "text": "doomed" }))
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/sessions/{}", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}/todos", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn deleting_an_unknown_session_is_a_404() {
    let app = setup_test_app().await;

    let req = test::TestRequest::delete()
        .uri("/api/sessions/00000000-0000-0000-0000-000000000001")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "api_error");
}
