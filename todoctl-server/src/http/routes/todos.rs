//! Todo endpoints, nested under their list

use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use todoctl_core::{validate_todo_name, Todo};

use super::{clean_name, is_xhr, load_list, Flash, ListPath, TodoPath};
use crate::http::error::ApiError;
use crate::http::extractors::{IdPath, JsonBody, Storage};
use crate::state::AppState;

/// Add todo request
#[derive(Debug, Deserialize)]
pub struct AddTodoRequest {
    pub todo: String,
}

/// Toggle request
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub completed: bool,
}

/// Action result carrying the affected todo
#[derive(Debug, Serialize)]
pub struct TodoFlash {
    pub message: String,
    pub todo: Todo,
}

/// POST /lists/{list_id}/todos - add a todo
async fn add(
    mut storage: Storage,
    IdPath(path): IdPath<ListPath>,
    JsonBody(req): JsonBody<AddTodoRequest>,
) -> Result<(StatusCode, Json<TodoFlash>), ApiError> {
    let list = load_list(&mut *storage, path.list_id).await?;
    let name = clean_name(&req.todo);
    validate_todo_name(name)?;

    let todo = storage
        .add_todo(list.id, name)
        .await?
        .ok_or_else(ApiError::list_not_found)?;

    Ok((
        StatusCode::CREATED,
        Json(TodoFlash {
            message: "The todo was added.".into(),
            todo,
        }),
    ))
}

/// POST /lists/{list_id}/todos/{todo_id}/delete - delete a todo
///
/// Script callers (`X-Requested-With: XMLHttpRequest`) get an empty 204.
async fn delete(
    mut storage: Storage,
    headers: HeaderMap,
    IdPath(path): IdPath<TodoPath>,
) -> Result<Response, ApiError> {
    let list = load_list(&mut *storage, path.list_id).await?;
    let todo = list.todo(path.todo_id).ok_or_else(ApiError::todo_not_found)?;
    storage.delete_todo(list.id, todo.id).await?;

    if is_xhr(&headers) {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok(Json(Flash::new("The todo has been deleted.")).into_response())
    }
}

/// POST /lists/{list_id}/todos/{todo_id} - set a todo's completed flag
async fn update(
    mut storage: Storage,
    IdPath(path): IdPath<TodoPath>,
    JsonBody(req): JsonBody<UpdateTodoRequest>,
) -> Result<Json<TodoFlash>, ApiError> {
    let list = load_list(&mut *storage, path.list_id).await?;
    let mut todo = list
        .todo(path.todo_id)
        .cloned()
        .ok_or_else(ApiError::todo_not_found)?;

    storage
        .set_todo_completed(list.id, todo.id, req.completed)
        .await?;
    todo.completed = req.completed;

    Ok(Json(TodoFlash {
        message: "The todo has been updated.".into(),
        todo,
    }))
}

/// Todo routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lists/{list_id}/todos", post(add))
        .route("/lists/{list_id}/todos/{todo_id}", post(update))
        .route("/lists/{list_id}/todos/{todo_id}/delete", post(delete))
}
