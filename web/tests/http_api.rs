//! Handler tests driving the router with `oneshot` over the in-memory repository.

#![allow(clippy::expect_used)] // Test code uses expect for clear failure messages
#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use composable_todo_testing::InMemoryTodoRepository;
use composable_todo_web::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (InMemoryTodoRepository, Router) {
    let repo = InMemoryTodoRepository::new();
    let router = build_router(AppState::new(Arc::new(repo.clone())));
    (repo, router)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        },
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("request builds"))
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, json)
}

async fn raw(app: &Router, method: Method, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_error(body: &Value, status: StatusCode, message: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], status.as_u16());
    assert_eq!(body["error"], message);
}

#[tokio::test]
async fn health_reports_ok() {
    let (_repo, app) = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let (_repo, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": [], "count": 0}));
}

#[tokio::test]
async fn create_returns_201_with_record() {
    let (repo, app) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/todos",
        Some(json!({"title": "Test Todo", "description": "Test Description"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Todo created successfully");
    assert_eq!(body["data"]["title"], "Test Todo");
    assert_eq!(body["data"]["description"], "Test Description");
    assert_eq!(body["data"]["completed"], false);
    assert!(body["data"]["id"].is_i64());
    assert!(body["data"]["created_at"].is_string());
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn create_without_description_serializes_null() {
    let (_repo, app) = app();
    let (_, body) = call(&app, Method::POST, "/todos", Some(json!({"title": "Bare"}))).await;
    assert_eq!(body["data"]["description"], Value::Null);
}

#[tokio::test]
async fn create_trims_whitespace() {
    let (_repo, app) = app();
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/todos",
        Some(json!({"title": "  Trimmed Title  ", "description": "  Trimmed Description  "})),
    )
    .await;
    assert_eq!(body["data"]["title"], "Trimmed Title");
    assert_eq!(body["data"]["description"], "Trimmed Description");
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let (repo, app) = app();

    for body in [json!({"title": ""}), json!({"title": "   "}), json!({"description": "no title"})] {
        let (status, response) = call(&app, Method::POST, "/api/todos", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&response, status, "Title is required and cannot be empty");
    }

    let (status, response) = call(&app, Method::POST, "/api/todos", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&response, status, "No data provided");

    assert!(repo.is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (_repo, app) = app();
    let (status, body) = raw(&app, Method::POST, "/api/todos", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));

    let (status, body) = raw(&app, Method::POST, "/api/todos", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "No data provided");
}

#[tokio::test]
async fn list_is_newest_first_with_count() {
    let (_repo, app) = app();
    call(&app, Method::POST, "/api/todos", Some(json!({"title": "First Todo"}))).await;
    call(&app, Method::POST, "/api/todos", Some(json!({"title": "Second Todo"}))).await;

    let (_, body) = call(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["title"], "Second Todo");
    assert_eq!(body["data"][1]["title"], "First Todo");
}

#[tokio::test]
async fn get_by_id_and_missing_id() {
    let (_repo, app) = app();
    let (_, created) = call(&app, Method::POST, "/api/todos", Some(json!({"title": "Find me"}))).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = call(&app, Method::GET, &format!("/api/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created["data"]);
    assert!(body.get("message").is_none());

    let (status, body) = call(&app, Method::GET, "/api/todos/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, status, "Todo with id 999 not found");
}

#[tokio::test]
async fn non_integer_id_is_bad_request() {
    let (_repo, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/todos/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "Invalid todo id: abc");
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let (_repo, app) = app();
    let (_, created) = call(
        &app,
        Method::POST,
        "/api/todos",
        Some(json!({"title": "Original Title", "description": "Original Description"})),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/api/todos/{id}"),
        Some(json!({"completed": true})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Todo updated successfully");
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["title"], "Original Title");
    assert_eq!(body["data"]["description"], "Original Description");
    assert_eq!(body["data"]["created_at"], created["data"]["created_at"]);
    assert_ne!(body["data"]["updated_at"], created["data"]["updated_at"]);
}

#[tokio::test]
async fn update_validation_errors() {
    let (_repo, app) = app();
    let (_, created) = call(&app, Method::POST, "/api/todos", Some(json!({"title": "T"}))).await;
    let uri = format!("/api/todos/{}", created["data"]["id"]);

    let (status, body) = call(&app, Method::PUT, &uri, Some(json!({"title": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "Title cannot be empty");

    let (status, body) = call(&app, Method::PUT, &uri, Some(json!({"title": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "Title cannot be empty");

    let (status, body) = call(&app, Method::PUT, &uri, Some(json!({"completed": "yes"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("boolean"));
}

#[tokio::test]
async fn update_missing_todo_is_404() {
    let (_repo, app) = app();
    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/todos/999",
        Some(json!({"title": "Updated"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, status, "Todo with id 999 not found");
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let (repo, app) = app();
    let (_, created) = call(&app, Method::POST, "/api/todos", Some(json!({"title": "Doomed"}))).await;
    let uri = format!("/api/todos/{}", created["data"]["id"]);

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Todo deleted successfully"}));
    assert!(repo.is_empty());

    let (status, _) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn routes_are_served_at_root_and_under_api() {
    let (_repo, app) = app();
    call(&app, Method::POST, "/todos", Some(json!({"title": "Rooted"}))).await;

    let (_, root) = call(&app, Method::GET, "/todos", None).await;
    let (_, api) = call(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(root, api);
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let (_repo, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, status, "Resource not found");
}

#[tokio::test]
async fn wrong_method_on_known_path_is_405_envelope() {
    let (_repo, app) = app();
    for (method, uri) in [
        (Method::PATCH, "/todos/1"),
        (Method::PATCH, "/api/todos/1"),
        (Method::DELETE, "/api/todos"),
        (Method::POST, "/health"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_error(&body, status, "Method not allowed");
    }
}

#[tokio::test]
async fn storage_failure_is_opaque_500() {
    let (repo, app) = app();
    repo.set_failing(true);

    let (status, body) = call(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, status, "Internal server error");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (_repo, app) = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/todos")
                .header(header::ORIGIN, "http://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
