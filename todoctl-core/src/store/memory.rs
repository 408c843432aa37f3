//! In-memory backend held in a single session

use async_trait::async_trait;

use super::TodoStore;
use crate::error::StoreResult;
use crate::model::{next_id, ListId, Todo, TodoId, TodoList};

/// Lists kept in a plain vector, in creation order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lists: Vec<TodoList>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the current lists without cloning.
    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    fn list_mut(&mut self, id: ListId) -> Option<&mut TodoList> {
        self.lists.iter_mut().find(|l| l.id == id)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_all(&mut self) -> StoreResult<Vec<TodoList>> {
        let mut lists = self.lists.clone();
        lists.sort_by_key(|l| l.id);
        Ok(lists)
    }

    async fn find_list(&mut self, id: ListId) -> StoreResult<Option<TodoList>> {
        Ok(self.lists.iter().find(|l| l.id == id).cloned())
    }

    async fn create_list(&mut self, name: &str) -> StoreResult<TodoList> {
        let id = next_id(self.lists.iter().map(|l| l.id));
        let list = TodoList::new(id, name);
        self.lists.push(list.clone());
        Ok(list)
    }

    async fn rename_list(&mut self, id: ListId, new_name: &str) -> StoreResult<()> {
        if let Some(list) = self.list_mut(id) {
            list.name = new_name.to_owned();
        }
        Ok(())
    }

    async fn delete_list(&mut self, id: ListId) -> StoreResult<()> {
        self.lists.retain(|l| l.id != id);
        Ok(())
    }

    async fn add_todo(&mut self, list_id: ListId, name: &str) -> StoreResult<Option<Todo>> {
        let Some(list) = self.list_mut(list_id) else {
            return Ok(None);
        };

        let todo = Todo::new(list.next_todo_id(), name);
        list.todos.push(todo.clone());
        Ok(Some(todo))
    }

    async fn delete_todo(&mut self, list_id: ListId, todo_id: TodoId) -> StoreResult<()> {
        if let Some(list) = self.list_mut(list_id) {
            list.todos.retain(|t| t.id != todo_id);
        }
        Ok(())
    }

    async fn set_todo_completed(
        &mut self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> StoreResult<()> {
        if let Some(todo) = self.list_mut(list_id).and_then(|l| l.todo_mut(todo_id)) {
            todo.completed = completed;
        }
        Ok(())
    }

    async fn complete_all(&mut self, list_id: ListId) -> StoreResult<()> {
        if let Some(list) = self.list_mut(list_id) {
            for todo in &mut list.todos {
                todo.completed = true;
            }
        }
        Ok(())
    }
}
