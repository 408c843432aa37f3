//! Table bootstrap for the relational backend

use sqlx::PgPool;

const CREATE_LISTS: &str = r#"
    CREATE TABLE IF NOT EXISTS lists (
        id   INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    )
"#;

// completed holds a textual truth flag ('t' / 'f'); writes bind text, so the
// column must stay TEXT
const CREATE_TODOS: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id        INTEGER NOT NULL,
        list_id   INTEGER NOT NULL REFERENCES lists (id) ON DELETE CASCADE,
        name      TEXT NOT NULL,
        completed TEXT NOT NULL DEFAULT 'f',
        PRIMARY KEY (list_id, id)
    )
"#;

/// Create `lists` and `todos` when missing. Existing tables are left as they are.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring todo schema...");

    sqlx::query(CREATE_LISTS).execute(pool).await?;
    sqlx::query(CREATE_TODOS).execute(pool).await?;

    tracing::info!("Todo schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::completed_to_db;

    #[test]
    fn completed_column_is_text_defaulting_to_false() {
        let column = format!(
            "completed TEXT NOT NULL DEFAULT '{}'",
            completed_to_db(false)
        );
        assert!(CREATE_TODOS.contains(&column));
    }
}
