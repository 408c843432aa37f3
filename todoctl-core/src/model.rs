//! Domain records: lists and the todos they own

use serde::{Deserialize, Serialize};

/// List identifier (positive, assigned by the store)
pub type ListId = i32;

/// Todo identifier, unique within its owning list
pub type TodoId = i32;

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub name: String,
    pub completed: bool,
}

impl Todo {
    /// New todos always start incomplete.
    pub fn new(id: TodoId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
        }
    }
}

/// A named list and its todos, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: ListId,
    pub name: String,
    pub todos: Vec<Todo>,
}

impl TodoList {
    /// Create an empty list.
    pub fn new(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            todos: Vec::new(),
        }
    }

    /// A list is complete when it has todos and all of them are done.
    ///
    /// ```
    /// use todoctl_core::model::{Todo, TodoList};
    ///
    /// let mut list = TodoList::new(1, "Groceries");
    /// assert!(!list.is_complete());
    ///
    /// let mut milk = Todo::new(1, "Milk");
    /// milk.completed = true;
    /// list.todos.push(milk);
    /// assert!(list.is_complete());
    /// ```
    pub fn is_complete(&self) -> bool {
        !self.todos.is_empty() && self.todos.iter().all(|t| t.completed)
    }

    /// Number of todos not yet completed.
    pub fn remaining_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn todo_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Id the next appended todo receives.
    pub fn next_todo_id(&self) -> TodoId {
        next_id(self.todos.iter().map(|t| t.id))
    }
}

/// Max existing id + 1, or 1 when there are none.
///
/// Ids are recomputed from what currently exists, so deleting the
/// highest id frees it for the next insert.
pub fn next_id<I>(ids: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    ids.into_iter().max().unwrap_or(0) + 1
}
