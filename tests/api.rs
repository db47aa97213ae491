use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use restaurant_api::{app, config::Config, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_state(store_uri: &str) -> Arc<AppState> {
    AppState::with_config(Config {
        port: 0,
        store_uri: store_uri.to_string(),
        secret_key: "test-secret".to_string(),
        lazy_init: true,
    })
}

async fn ready_app() -> Router {
    let state = test_state("memory://");
    state.store.initialize().await.unwrap();
    app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_is_always_up() {
    let app = ready_app().await;
    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn login_issues_a_token() {
    let app = ready_app().await;
    let (status, body) =
        send_json(&app, Method::POST, "/login", Some(json!({ "username": "alice" }))).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["accessToken"].as_str().unwrap();
    // header.claims.signature
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn login_requires_a_username() {
    let app = ready_app().await;
    let (status, body) = send_json(&app, Method::POST, "/login", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("username"));

    let (status, _) =
        send_json(&app, Method::POST, "/login", Some(json!({ "username": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_validation_maps_to_400() {
    let app = ready_app().await;
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/restaurants",
        Some(json!({ "borough": "Queens" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn malformed_id_is_404() {
    let app = ready_app().await;
    let (status, _) = send_json(&app, Method::GET, "/api/restaurants/not-an-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crud_lifecycle_over_http() {
    let app = ready_app().await;

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/api/restaurants",
        Some(json!({
            "name": "Test Deli",
            "borough": "Queens",
            "grades": [{ "grade": "A", "score": 11.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert!(created["createdAt"].is_string());

    let (status, fetched) =
        send_json(&app, Method::GET, &format!("/api/restaurants/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Test Deli");
    assert_eq!(fetched["grades"][0]["grade"], "A");

    let (status, in_queens) = send_json(
        &app,
        Method::GET,
        "/api/restaurants?page=1&perPage=10&borough=Queens",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(in_queens
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == id.as_str()));

    let (status, in_bronx) = send_json(
        &app,
        Method::GET,
        "/api/restaurants?page=1&perPage=10&borough=Bronx",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(in_bronx
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["id"] != id.as_str()));

    let (status, updated) = send_json(
        &app,
        Method::PUT,
        &format!("/api/restaurants/{id}"),
        Some(json!({ "cuisine": "Delicatessen" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["cuisine"], "Delicatessen");
    assert_eq!(updated["name"], "Test Deli");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/restaurants/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/restaurants/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &format!("/api/restaurants/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pagination_via_query() {
    let app = ready_app().await;
    for i in 0..3 {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/restaurants",
            Some(json!({ "name": format!("Place {i}") })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, last) =
        send_json(&app, Method::GET, "/api/restaurants?page=2&perPage=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(last.as_array().unwrap().len(), 1);

    let (_, page_zero) =
        send_json(&app, Method::GET, "/api/restaurants?page=0&perPage=2", None).await;
    let (_, page_one) =
        send_json(&app, Method::GET, "/api/restaurants?page=1&perPage=2", None).await;
    assert_eq!(page_zero, page_one);
}

#[tokio::test]
async fn ui_page_lists_without_parameters() {
    let app = ready_app().await;
    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/restaurants",
        Some(json!({ "name": "Corner Bistro", "borough": "Manhattan" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Bare first visit still queries, defaulting to page 1.
    let (status, body) = send(&app, Method::GET, "/ui/restaurants", None).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Restaurant Browser"));
    assert!(html.contains("Corner Bistro"));

    let (status, body) = send(
        &app,
        Method::GET,
        "/ui/restaurants?page=0&perPage=500&borough=Bronx",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("No restaurants found."));
}

#[tokio::test]
async fn lazy_mode_answers_503_when_store_is_unreachable() {
    // Port 9 refuses quickly; the short timeouts keep the test fast.
    let state = test_state(
        "mongodb://127.0.0.1:9/?serverSelectionTimeoutMS=500&connectTimeoutMS=500",
    );
    let app = app(state);

    let (status, body) = send_json(&app, Method::GET, "/api/restaurants", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));

    // Liveness and the login stub bypass the readiness guard.
    let (status, _) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        send_json(&app, Method::POST, "/login", Some(json!({ "username": "alice" }))).await;
    assert_eq!(status, StatusCode::OK);
}
