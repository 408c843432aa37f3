//! List endpoints

use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use todoctl_core::view::{completion_ratio, sort_lists};
use todoctl_core::{validate_list_name, ListId, TodoList};

use super::{clean_name, is_xhr, load_list, Flash, ListDetail, ListPath};
use crate::http::error::ApiError;
use crate::http::extractors::{IdPath, JsonBody, Storage};
use crate::state::AppState;

/// Create or rename request
#[derive(Debug, Deserialize)]
pub struct ListNameRequest {
    pub list_name: String,
}

/// One row of the list index
#[derive(Debug, Serialize)]
pub struct ListSummary {
    pub id: ListId,
    pub name: String,
    pub complete: bool,
    pub remaining: usize,
    pub total: usize,
    pub ratio: String,
}

impl From<&TodoList> for ListSummary {
    fn from(list: &TodoList) -> Self {
        Self {
            id: list.id,
            name: list.name.clone(),
            complete: list.is_complete(),
            remaining: list.remaining_count(),
            total: list.todos.len(),
            ratio: completion_ratio(&list.todos),
        }
    }
}

/// Action result carrying the affected list
#[derive(Debug, Serialize)]
pub struct ListFlash {
    pub message: String,
    pub list: ListDetail,
}

const LISTS_PATH: &str = "/lists";

/// GET / - the index lives at /lists
async fn root() -> Redirect {
    Redirect::to(LISTS_PATH)
}

/// GET /lists - every list, incomplete ones first
async fn index(mut storage: Storage) -> Result<Json<Vec<ListSummary>>, ApiError> {
    let lists = storage.list_all().await?;
    Ok(Json(sort_lists(&lists).into_iter().map(ListSummary::from).collect()))
}

/// POST /lists - create a list
async fn create(
    mut storage: Storage,
    JsonBody(req): JsonBody<ListNameRequest>,
) -> Result<(StatusCode, Json<ListFlash>), ApiError> {
    let name = clean_name(&req.list_name);
    let existing = storage.list_all().await?;
    validate_list_name(name, &existing)?;

    let list = storage.create_list(name).await?;
    tracing::info!(list_id = list.id, "list created");

    Ok((
        StatusCode::CREATED,
        Json(ListFlash {
            message: "The list has been created.".into(),
            list: ListDetail::from(&list),
        }),
    ))
}

/// GET /lists/{list_id} - one list with its todos
async fn show(
    mut storage: Storage,
    IdPath(path): IdPath<ListPath>,
) -> Result<Json<ListDetail>, ApiError> {
    let list = load_list(&mut *storage, path.list_id).await?;
    Ok(Json(ListDetail::from(&list)))
}

/// POST /lists/{list_id} - rename a list
async fn rename(
    mut storage: Storage,
    IdPath(path): IdPath<ListPath>,
    JsonBody(req): JsonBody<ListNameRequest>,
) -> Result<Json<ListFlash>, ApiError> {
    let mut list = load_list(&mut *storage, path.list_id).await?;
    let name = clean_name(&req.list_name);

    // The list itself does not count as a clash, so case-only renames pass
    let others: Vec<TodoList> = storage
        .list_all()
        .await?
        .into_iter()
        .filter(|l| l.id != list.id)
        .collect();
    validate_list_name(name, &others)?;

    storage.rename_list(list.id, name).await?;
    list.name = name.to_owned();

    Ok(Json(ListFlash {
        message: "The list name has been updated.".into(),
        list: ListDetail::from(&list),
    }))
}

/// POST /lists/{list_id}/delete - delete a list and its todos
///
/// Script callers get the plain-text path to navigate to next.
async fn delete(
    mut storage: Storage,
    headers: HeaderMap,
    IdPath(path): IdPath<ListPath>,
) -> Result<Response, ApiError> {
    let list = load_list(&mut *storage, path.list_id).await?;
    storage.delete_list(list.id).await?;
    tracing::info!(list_id = list.id, "list deleted");

    if is_xhr(&headers) {
        Ok(LISTS_PATH.into_response())
    } else {
        Ok(Json(Flash::new("The list has been deleted.")).into_response())
    }
}

/// POST /lists/{list_id}/complete_all - mark every todo done
async fn complete_all(
    mut storage: Storage,
    IdPath(path): IdPath<ListPath>,
) -> Result<Json<ListFlash>, ApiError> {
    let list = load_list(&mut *storage, path.list_id).await?;
    storage.complete_all(list.id).await?;
    let list = load_list(&mut *storage, list.id).await?;

    Ok(Json(ListFlash {
        message: format!("All todos for list \"{}\" were marked complete.", list.name),
        list: ListDetail::from(&list),
    }))
}

/// List routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/lists", get(index).post(create))
        .route("/lists/{list_id}", get(show).post(rename))
        .route("/lists/{list_id}/delete", post(delete))
        .route("/lists/{list_id}/complete_all", post(complete_all))
}
