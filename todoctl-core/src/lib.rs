//! todoctl-core: to-do lists, their validation rules and their storage
//!
//! - [`model`]: `TodoList` / `Todo` records and id assignment
//! - [`validation`]: name length and uniqueness rules
//! - [`store`]: the `TodoStore` contract with in-memory and PostgreSQL backends
//! - [`view`]: display ordering and completion ratios

pub mod error;
pub mod model;
pub mod store;
pub mod validation;
pub mod view;

pub use error::{StoreError, StoreResult};
pub use model::{ListId, Todo, TodoId, TodoList};
pub use store::{MemoryStore, PgStore, TodoStore};
pub use validation::{validate_list_name, validate_todo_name, ValidationError, ValidationErrors};
