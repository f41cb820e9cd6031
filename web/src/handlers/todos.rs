//! Todo CRUD endpoints.
//!
//! Bodies are read as raw JSON objects and validated field by field so each
//! bad input gets its own 400 message; the validated `NewTodo` / `TodoPatch`
//! values then go straight to the repository.

use crate::error::AppError;
use crate::extractors::{JsonObject, NO_DATA, TodoIdPath};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use composable_todo_core::{NewTodo, Todo, TodoPatch, todo::TITLE_EMPTY, todo::TITLE_REQUIRED};
use serde::Serialize;
use serde_json::{Map, Value};

/// `{success, data, count}` for the list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    success: bool,
    data: Vec<Todo>,
    count: usize,
}

/// `{success, data, message?}` for single-record endpoints.
#[derive(Debug, Serialize)]
pub struct TodoResponse {
    success: bool,
    data: Todo,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// `{success, message}` for delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    success: bool,
    message: &'static str,
}

fn count_request(op: &'static str) {
    metrics::counter!("todos.requests", "op" => op).increment(1);
}

/// `title` for create: present, a string, non-blank.
fn required_title(body: &Map<String, Value>) -> Result<&str, AppError> {
    match body.get("title") {
        Some(Value::String(title)) => Ok(title),
        Some(Value::Null) | None => Err(AppError::bad_request(TITLE_REQUIRED)),
        Some(_) => Err(AppError::bad_request("Title must be a string")),
    }
}

/// `description`: absent → not given, `null` → cleared, string → set.
fn description_field(body: &Map<String, Value>) -> Result<Option<Option<String>>, AppError> {
    match body.get("description") {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(description)) => Ok(Some(Some(description.clone()))),
        Some(_) => Err(AppError::bad_request("Description must be a string")),
    }
}

fn completed_field(body: &Map<String, Value>) -> Result<Option<bool>, AppError> {
    match body.get("completed") {
        None => Ok(None),
        Some(Value::Bool(completed)) => Ok(Some(*completed)),
        Some(_) => Err(AppError::bad_request("Completed must be a boolean value")),
    }
}

/// Validate a create body.
///
/// # Errors
///
/// Returns a 400 [`AppError`] for an empty body, a missing or blank title,
/// or a wrongly-typed field.
pub fn parse_new_todo(body: &Map<String, Value>) -> Result<NewTodo, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request(NO_DATA));
    }

    let title = required_title(body)?;
    let description = description_field(body)?.flatten();
    let completed = completed_field(body)?.unwrap_or(false);

    Ok(NewTodo::new(title, description)?.with_completed(completed))
}

/// Validate an update body. Any subset of fields is accepted, including none.
///
/// # Errors
///
/// Returns a 400 [`AppError`] for a null, non-string or blank title, or a
/// wrongly-typed field.
pub fn parse_patch(body: &Map<String, Value>) -> Result<TodoPatch, AppError> {
    let mut patch = TodoPatch::new();

    match body.get("title") {
        None => {},
        Some(Value::String(title)) => patch = patch.with_title(title)?,
        Some(Value::Null) => return Err(AppError::bad_request(TITLE_EMPTY)),
        Some(_) => return Err(AppError::bad_request("Title must be a string")),
    }
    if let Some(description) = description_field(body)? {
        patch = patch.with_description(description);
    }
    if let Some(completed) = completed_field(body)? {
        patch = patch.with_completed(completed);
    }

    Ok(patch)
}

/// `GET /todos`: every todo, newest first.
///
/// # Errors
///
/// Returns 500 if the repository fails.
#[tracing::instrument(skip(state))]
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<ListResponse>, AppError> {
    count_request("list");
    let todos = state.repository.list().await?;

    Ok(Json(ListResponse {
        success: true,
        count: todos.len(),
        data: todos,
    }))
}

/// `GET /todos/{id}`
///
/// # Errors
///
/// Returns 404 if absent, 500 if the repository fails.
#[tracing::instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
) -> Result<Json<TodoResponse>, AppError> {
    count_request("get");
    let todo = state.repository.get(id).await?;

    Ok(Json(TodoResponse {
        success: true,
        data: todo,
        message: None,
    }))
}

/// `POST /todos`: 201 with the stored record.
///
/// # Errors
///
/// Returns 400 on invalid input, 500 if the repository fails.
#[tracing::instrument(skip(state, body))]
pub async fn create_todo(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<TodoResponse>), AppError> {
    count_request("create");
    let new = parse_new_todo(&body)?;
    let todo = state.repository.create(new).await?;
    tracing::info!(id = %todo.id, "Todo created");

    Ok((
        StatusCode::CREATED,
        Json(TodoResponse {
            success: true,
            data: todo,
            message: Some("Todo created successfully"),
        }),
    ))
}

/// `PUT /todos/{id}`: partial update.
///
/// # Errors
///
/// Returns 400 on invalid input, 404 if absent, 500 if the repository fails.
#[tracing::instrument(skip(state, body))]
pub async fn update_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<TodoResponse>, AppError> {
    count_request("update");
    let patch = parse_patch(&body)?;
    let todo = state.repository.update(id, patch).await?;
    tracing::info!(%id, completed = todo.completed, "Todo updated");

    Ok(Json(TodoResponse {
        success: true,
        data: todo,
        message: Some("Todo updated successfully"),
    }))
}

/// `DELETE /todos/{id}`
///
/// # Errors
///
/// Returns 404 if absent, 500 if the repository fails.
#[tracing::instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
) -> Result<Json<MessageResponse>, AppError> {
    count_request("delete");
    state.repository.delete(id).await?;
    tracing::info!(%id, "Todo deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Todo deleted successfully",
    }))
}
