use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::entities::todo,
    error::AppError,
    services::{ServiceContext, todo_service::TodoService},
    state::AppState,
};

const BASE_PATH: &str = "/api/todos";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(BASE_PATH, get(list_todos).post(create_todo))
        .route(
            &format!("{BASE_PATH}/{{id}}"),
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let service = todo_service_from_state(state.as_ref());
    let todos = service.list().await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TodoResponse>, AppError> {
    let service = todo_service_from_state(state.as_ref());
    let todo = service.get(&id).await?;
    Ok(Json(TodoResponse::from(todo)))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTodoRequest>,
) -> Result<Response, AppError> {
    let service = todo_service_from_state(state.as_ref());
    let todo = service.create(&body.title, &body.description).await?;
    let location = format!("{BASE_PATH}/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoResponse::from(todo)),
    )
        .into_response())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, AppError> {
    // Checked before any handler work: a mismatched body id is a 400,
    // not a mutation of either id.
    if id != body.id {
        return Err(AppError::bad_request("Path id does not match body id"));
    }
    let service = todo_service_from_state(state.as_ref());
    let todo = service
        .update(&id, &body.title, &body.description, body.is_completed)
        .await?;
    Ok(Json(TodoResponse::from(todo)))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = todo_service_from_state(state.as_ref());
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            is_completed: model.is_completed,
            created_at: model.created_at,
            completed_at: model.completed_at,
        }
    }
}

fn todo_service_from_state(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}
