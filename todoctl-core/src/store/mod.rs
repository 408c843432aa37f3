//! Storage contract and its backends
//!
//! Callers depend on [`TodoStore`] only. Two implementations exist:
//! - [`MemoryStore`]: one per session, plain structural edits
//! - [`PgStore`]: two PostgreSQL tables, one statement per operation
//!
//! Operations on missing ids are no-ops. Callers that need a "not found"
//! answer load the list with [`TodoStore::find_list`] first.

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{ListId, Todo, TodoId, TodoList};

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use postgres::{completed_from_db, completed_to_db, PgStore};
pub use schema::ensure_schema;

/// Backend-independent list/todo storage.
///
/// Names are stored as given; validation happens before a call reaches
/// the store.
#[async_trait]
pub trait TodoStore: Send {
    /// Every list in id order, todos included.
    async fn list_all(&mut self) -> StoreResult<Vec<TodoList>>;

    /// One list with its todos in insertion order.
    async fn find_list(&mut self, id: ListId) -> StoreResult<Option<TodoList>>;

    /// Create an empty list under the next free id.
    async fn create_list(&mut self, name: &str) -> StoreResult<TodoList>;

    async fn rename_list(&mut self, id: ListId, new_name: &str) -> StoreResult<()>;

    /// Remove a list and all of its todos.
    async fn delete_list(&mut self, id: ListId) -> StoreResult<()>;

    /// Append an incomplete todo; `None` when the list does not exist.
    async fn add_todo(&mut self, list_id: ListId, name: &str) -> StoreResult<Option<Todo>>;

    async fn delete_todo(&mut self, list_id: ListId, todo_id: TodoId) -> StoreResult<()>;

    async fn set_todo_completed(
        &mut self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> StoreResult<()>;

    /// Mark every todo of the list completed.
    async fn complete_all(&mut self, list_id: ListId) -> StoreResult<()>;
}
