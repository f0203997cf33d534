use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{DateTime, FixedOffset};
use sea_orm::{ConnectOptions, Database};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use todo_api::{config::AppConfig, db::connection, routes::router, state::AppState};

async fn app_state() -> Arc<AppState> {
    let cfg = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_level: "info".to_string(),
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        db_min_idle: 1,
    };

    // A single connection keeps every query on the same in-memory
    // database.
    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect to database");
    connection::sync_schema(&db).await.expect("sync schema");

    AppState::new(cfg, db)
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> axum::response::Response {
    router(state.clone()).oneshot(request).await.unwrap()
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_todo(
    state: &Arc<AppState>,
    title: &str,
    description: &str,
) -> axum::response::Response {
    send(
        state,
        Request::builder()
            .method("POST")
            .uri("/api/todos")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "title": title, "description": description }).to_string(),
            ))
            .unwrap(),
    )
    .await
}

async fn get_todo(state: &Arc<AppState>, id: &str) -> axum::response::Response {
    send(
        state,
        Request::builder()
            .uri(format!("/api/todos/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn put_todo(
    state: &Arc<AppState>,
    path_id: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    send(
        state,
        Request::builder()
            .method("PUT")
            .uri(format!("/api/todos/{path_id}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn delete_todo(state: &Arc<AppState>, id: &str) -> axum::response::Response {
    send(
        state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/todos/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

fn update_body(json: &serde_json::Value, is_completed: bool) -> serde_json::Value {
    json!({
        "id": json["id"],
        "title": json["title"],
        "description": json["description"],
        "isCompleted": is_completed,
    })
}

fn parse_timestamp(value: &serde_json::Value) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value.as_str().expect("timestamp should be a string"))
        .expect("timestamp should be RFC 3339")
}

#[tokio::test]
async fn creating_a_todo_returns_a_fresh_record() {
    let state = app_state().await;

    let response = create_todo(&state, "groceries", "milk and eggs").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let json = read_json(response).await;
    let id = json["id"].as_str().expect("id should be present");
    Uuid::parse_str(id).expect("id should be a uuid");

    assert_eq!(location.as_deref(), Some(format!("/api/todos/{id}").as_str()));
    assert_eq!(json["title"], "groceries");
    assert_eq!(json["description"], "milk and eggs");
    assert_eq!(json["isCompleted"], false);
    assert!(json["completedAt"].is_null());
    parse_timestamp(&json["createdAt"]);
}

#[tokio::test]
async fn reading_a_created_todo_returns_the_same_record() {
    let state = app_state().await;

    let created = read_json(create_todo(&state, "groceries", "milk").await).await;
    let id = created["id"].as_str().unwrap();

    let response = get_todo(&state, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, created);
}

#[tokio::test]
async fn reading_a_missing_todo_returns_404_with_empty_body() {
    let state = app_state().await;

    let response = get_todo(&state, &Uuid::new_v4().to_string()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn updating_a_missing_todo_returns_404() {
    let state = app_state().await;

    let id = Uuid::new_v4();
    let response = put_todo(
        &state,
        &id.to_string(),
        json!({
            "id": id,
            "title": "ghost",
            "description": "",
            "isCompleted": false,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completing_a_todo_stamps_completed_at() {
    let state = app_state().await;

    let created = read_json(create_todo(&state, "groceries", "milk").await).await;
    let id = created["id"].as_str().unwrap();

    let response = put_todo(&state, id, update_body(&created, true)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = read_json(response).await;
    assert_eq!(updated["isCompleted"], true);

    let completed_at = parse_timestamp(&updated["completedAt"]);
    let created_at = parse_timestamp(&created["createdAt"]);
    assert!(completed_at >= created_at);
}

#[tokio::test]
async fn a_completed_todo_cannot_be_uncompleted() {
    let state = app_state().await;

    let created = read_json(create_todo(&state, "groceries", "milk").await).await;
    let id = created["id"].as_str().unwrap();

    let completed = read_json(put_todo(&state, id, update_body(&created, true)).await).await;

    // Requesting isCompleted=false is a silent no-op for both fields.
    let response = put_todo(&state, id, update_body(&completed, false)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = read_json(response).await;
    assert_eq!(updated["isCompleted"], true);
    assert_eq!(updated["completedAt"], completed["completedAt"]);
}

#[tokio::test]
async fn mismatched_path_and_body_ids_return_400_without_mutating() {
    let state = app_state().await;

    let created = read_json(create_todo(&state, "groceries", "milk").await).await;
    let id = created["id"].as_str().unwrap();

    let response = put_todo(
        &state,
        id,
        json!({
            "id": Uuid::new_v4(),
            "title": "hijacked",
            "description": "",
            "isCompleted": true,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unchanged = read_json(get_todo(&state, id).await).await;
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn deleting_a_todo_removes_it() {
    let state = app_state().await;

    let created = read_json(create_todo(&state, "groceries", "milk").await).await;
    let id = created["id"].as_str().unwrap();

    let response = delete_todo(&state, id).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    let response = get_todo(&state, id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_todo_returns_404() {
    let state = app_state().await;

    let response = delete_todo(&state, &Uuid::new_v4().to_string()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_returns_every_created_todo() {
    let state = app_state().await;

    let mut ids = Vec::new();
    for n in ["0", "1", "2"] {
        let created = read_json(create_todo(&state, &format!("todo {n}"), "").await).await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let response = send(
        &state,
        Request::builder()
            .uri("/api/todos")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    let listed = json.as_array().expect("body should be an array");
    assert_eq!(listed.len(), ids.len());
    for id in &ids {
        assert!(
            listed
                .iter()
                .any(|todo| todo["id"].as_str() == Some(id.as_str())),
            "todo {id} should be in the listing"
        );
    }
}
