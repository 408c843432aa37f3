//! PostgreSQL backend
//!
//! Patterns:
//! - one parameterized statement per mutation, keyed by primary key
//! - ids assigned in the INSERT itself (`MAX(id) + 1`)
//! - list reads fetch lists and todos in two queries, never one per list
//! - no transactions spanning statements

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::TodoStore;
use crate::error::StoreResult;
use crate::model::{ListId, Todo, TodoId, TodoList};

/// Read a textual truth flag as stored in `todos.completed`.
///
/// `t`, `true`, `y`, `yes`, `on` and `1` (any case) are true; everything
/// else is false.
pub fn completed_from_db(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "t" | "true" | "y" | "yes" | "on" | "1"
    )
}

/// Textual form written to `todos.completed`.
pub fn completed_to_db(completed: bool) -> &'static str {
    if completed {
        "t"
    } else {
        "f"
    }
}

fn log_statement(sql: &str, params: &[&dyn Debug]) {
    tracing::info!(statement = %sql.trim(), params = ?params, "executing statement");
}

fn todo_from_row(row: &PgRow) -> Todo {
    Todo {
        id: row.get("id"),
        name: row.get("name"),
        completed: completed_from_db(row.get::<&str, _>("completed")),
    }
}

/// Store backed by the `lists` and `todos` tables
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_todos(&self, list_id: ListId) -> StoreResult<Vec<Todo>> {
        let sql = r#"
            SELECT id, name, completed::text AS completed
            FROM todos
            WHERE list_id = $1
            ORDER BY id
        "#;
        log_statement(sql, &[&list_id]);

        let rows = sqlx::query(sql).bind(list_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(todo_from_row).collect())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_all(&mut self) -> StoreResult<Vec<TodoList>> {
        let sql = "SELECT id, name FROM lists ORDER BY id";
        log_statement(sql, &[]);
        let list_rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let mut lists: Vec<TodoList> = list_rows
            .iter()
            .map(|r| TodoList::new(r.get("id"), r.get::<String, _>("name")))
            .collect();
        let index: HashMap<ListId, usize> =
            lists.iter().enumerate().map(|(i, l)| (l.id, i)).collect();

        let sql = r#"
            SELECT id, list_id, name, completed::text AS completed
            FROM todos
            ORDER BY list_id, id
        "#;
        log_statement(sql, &[]);
        let todo_rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        for row in &todo_rows {
            let list_id: ListId = row.get("list_id");
            if let Some(&i) = index.get(&list_id) {
                lists[i].todos.push(todo_from_row(row));
            }
        }

        Ok(lists)
    }

    async fn find_list(&mut self, id: ListId) -> StoreResult<Option<TodoList>> {
        let sql = "SELECT id, name FROM lists WHERE id = $1";
        log_statement(sql, &[&id]);

        let Some(row) = sqlx::query(sql).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        let mut list = TodoList::new(row.get("id"), row.get::<String, _>("name"));
        list.todos = self.fetch_todos(list.id).await?;
        Ok(Some(list))
    }

    async fn create_list(&mut self, name: &str) -> StoreResult<TodoList> {
        let sql = r#"
            INSERT INTO lists (id, name)
            SELECT COALESCE(MAX(id), 0) + 1, $1 FROM lists
            RETURNING id, name
        "#;
        log_statement(sql, &[&name]);

        let row = sqlx::query(sql).bind(name).fetch_one(&self.pool).await?;
        Ok(TodoList::new(row.get("id"), row.get::<String, _>("name")))
    }

    async fn rename_list(&mut self, id: ListId, new_name: &str) -> StoreResult<()> {
        let sql = "UPDATE lists SET name = $2 WHERE id = $1";
        log_statement(sql, &[&id, &new_name]);

        sqlx::query(sql)
            .bind(id)
            .bind(new_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_list(&mut self, id: ListId) -> StoreResult<()> {
        // todos go with it via ON DELETE CASCADE
        let sql = "DELETE FROM lists WHERE id = $1";
        log_statement(sql, &[&id]);

        sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn add_todo(&mut self, list_id: ListId, name: &str) -> StoreResult<Option<Todo>> {
        let sql = r#"
            INSERT INTO todos (id, list_id, name, completed)
            SELECT COALESCE(MAX(t.id), 0) + 1, l.id, $2, $3
            FROM lists l
            LEFT JOIN todos t ON t.list_id = l.id
            WHERE l.id = $1
            GROUP BY l.id
            RETURNING id, name, completed::text AS completed
        "#;
        let completed = completed_to_db(false);
        log_statement(sql, &[&list_id, &name, &completed]);

        let row = sqlx::query(sql)
            .bind(list_id)
            .bind(name)
            .bind(completed)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(todo_from_row))
    }

    async fn delete_todo(&mut self, list_id: ListId, todo_id: TodoId) -> StoreResult<()> {
        let sql = "DELETE FROM todos WHERE list_id = $1 AND id = $2";
        log_statement(sql, &[&list_id, &todo_id]);

        sqlx::query(sql)
            .bind(list_id)
            .bind(todo_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_todo_completed(
        &mut self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> StoreResult<()> {
        let sql = "UPDATE todos SET completed = $3 WHERE list_id = $1 AND id = $2";
        let flag = completed_to_db(completed);
        log_statement(sql, &[&list_id, &todo_id, &flag]);

        sqlx::query(sql)
            .bind(list_id)
            .bind(todo_id)
            .bind(flag)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn complete_all(&mut self, list_id: ListId) -> StoreResult<()> {
        let sql = "UPDATE todos SET completed = $2 WHERE list_id = $1";
        let flag = completed_to_db(true);
        log_statement(sql, &[&list_id, &flag]);

        sqlx::query(sql)
            .bind(list_id)
            .bind(flag)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{create_pool, ensure_schema};

    #[test]
    fn textual_flags_normalize() {
        assert!(completed_from_db("t"));
        assert!(completed_from_db("true"));
        assert!(completed_from_db("TRUE"));
        assert!(completed_from_db("1"));
        assert!(!completed_from_db("f"));
        assert!(!completed_from_db("false"));
        assert!(!completed_from_db(""));
        assert!(!completed_from_db("maybe"));
    }

    #[test]
    fn written_flag_reads_back() {
        for completed in [true, false] {
            assert_eq!(completed_from_db(completed_to_db(completed)), completed);
        }
    }

    // Integration tests - run with DATABASE_URL set
    // cargo test -p todoctl-core -- --ignored
    //
    // Single test so concurrent test threads never truncate under each other.
    #[tokio::test]
    #[ignore = "requires database"]
    async fn relational_backend_contract() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        ensure_schema(&pool).await.expect("schema failed");
        sqlx::query("TRUNCATE lists CASCADE")
            .execute(&pool)
            .await
            .expect("truncate failed");

        let mut store = PgStore::new(pool);

        let list = store.create_list("Groceries").await.unwrap();
        assert_eq!(list.id, 1);
        store.delete_list(1).await.unwrap();
        assert!(store.find_list(1).await.unwrap().is_none());
        let list = store.create_list("Groceries").await.unwrap();
        assert_eq!(list.id, 1);

        let milk = store.add_todo(1, "milk").await.unwrap().unwrap();
        let eggs = store.add_todo(1, "eggs").await.unwrap().unwrap();
        assert_eq!((milk.id, eggs.id), (1, 2));
        assert!(!milk.completed);
        assert!(store.add_todo(99, "orphan").await.unwrap().is_none());

        store.set_todo_completed(1, 2, true).await.unwrap();
        let found = store.find_list(1).await.unwrap().unwrap();
        assert_eq!(
            found.todos.iter().map(|t| t.completed).collect::<Vec<_>>(),
            vec![false, true]
        );

        store.complete_all(1).await.unwrap();
        assert!(store.find_list(1).await.unwrap().unwrap().is_complete());

        store.rename_list(1, "Market").await.unwrap();
        store.create_list("Chores").await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Market");
        assert_eq!(all[0].todos.len(), 2);
        assert!(all[1].todos.is_empty());

        store.delete_todo(1, 1).await.unwrap();
        store.delete_todo(1, 42).await.unwrap();
        store.rename_list(42, "nobody").await.unwrap();
        assert_eq!(store.find_list(1).await.unwrap().unwrap().todos.len(), 1);

        store.delete_list(1).await.unwrap();
        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE list_id = 1")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(remaining.0, 0);
    }
}
