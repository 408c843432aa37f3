//! Route handlers organized by resource

pub mod health;
pub mod lists;
pub mod todos;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use todoctl_core::store::TodoStore;
use todoctl_core::view::{completion_ratio, sort_todos};
use todoctl_core::{ListId, Todo, TodoId, TodoList};

use super::error::ApiError;

/// `/lists/{list_id}` path
#[derive(Debug, Deserialize)]
pub struct ListPath {
    pub list_id: ListId,
}

/// `/lists/{list_id}/todos/{todo_id}` path
#[derive(Debug, Deserialize)]
pub struct TodoPath {
    pub list_id: ListId,
    pub todo_id: TodoId,
}

/// Whether the caller is page script (`X-Requested-With: XMLHttpRequest`)
pub(crate) fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Confirmation message for a completed action
#[derive(Debug, Serialize)]
pub struct Flash {
    pub message: String,
}

impl Flash {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A list with its todos, incomplete ones first
#[derive(Debug, Serialize)]
pub struct ListDetail {
    pub id: ListId,
    pub name: String,
    pub complete: bool,
    pub ratio: String,
    pub todos: Vec<Todo>,
}

impl From<&TodoList> for ListDetail {
    fn from(list: &TodoList) -> Self {
        Self {
            id: list.id,
            name: list.name.clone(),
            complete: list.is_complete(),
            ratio: completion_ratio(&list.todos),
            todos: sort_todos(&list.todos).into_iter().cloned().collect(),
        }
    }
}

/// Load a list or answer 404.
pub async fn load_list(store: &mut dyn TodoStore, id: ListId) -> Result<TodoList, ApiError> {
    store
        .find_list(id)
        .await?
        .ok_or_else(ApiError::list_not_found)
}

/// Trim surrounding whitespace from a submitted name.
pub fn clean_name(raw: &str) -> &str {
    raw.trim()
}
