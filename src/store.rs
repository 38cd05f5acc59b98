use std::str::FromStr;

use chrono::Utc;
use sqlx::{
    query, query_as,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::model::{Todo, TodoId};

const CREATE_TODOS_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS todos (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);"#;

/// Handle to the `todos` collection.
///
/// Cloning is cheap and shares the underlying pool, so one handle built at
/// startup serves every request.
#[derive(Debug, Clone)]
pub struct TodoStore {
    db: Pool<Sqlite>,
}

impl TodoStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Builds a pool that opens its first connection on first use. The
    /// database file is created if it does not exist yet.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy_with(options);
        Ok(Self::new(db))
    }

    // Create the 'todos' table if it doesn't exist
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        query(CREATE_TODOS_TABLE).execute(&self.db).await?;
        Ok(())
    }

    /// All records, newest first. Records sharing a timestamp fall back to
    /// insertion order.
    pub async fn find_all(&self) -> Result<Vec<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "SELECT id, content, completed, created_at, updated_at FROM todos \
             ORDER BY created_at DESC, seq DESC",
        )
        .fetch_all(&self.db)
        .await
    }

    pub async fn find(&self, id: &TodoId) -> Result<Option<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "SELECT id, content, completed, created_at, updated_at FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    pub async fn insert(&self, content: String) -> Result<Todo, sqlx::Error> {
        let todo = Todo::new(content, Utc::now());
        query(
            "INSERT INTO todos (id, content, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&todo.id)
        .bind(&todo.content)
        .bind(todo.completed)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&self.db)
        .await?;
        Ok(todo)
    }

    /// Sets the completion flag. Returns the number of records touched,
    /// which is zero when the id is unknown.
    pub async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<u64, sqlx::Error> {
        let result = query("UPDATE todos SET completed = ?, updated_at = ? WHERE id = ?")
            .bind(completed)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Hard delete. Returns the number of records removed.
    pub async fn remove(&self, id: &TodoId) -> Result<u64, sqlx::Error> {
        let result = query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// Single-connection in-memory store. The connection is never recycled, so
/// the database lives as long as the pool.
#[cfg(test)]
pub(crate) async fn memory_store() -> TodoStore {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    let store = TodoStore::new(db);
    store.migrate().await.unwrap();
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_find() {
        let store = memory_store().await;
        let todo = store.insert("Buy milk".to_string()).await.unwrap();

        let found = store.find(&todo.id).await.unwrap().unwrap();
        assert_eq!(found, todo);
        assert!(!found.completed);
    }

    #[tokio::test]
    async fn find_all_is_newest_first() {
        let store = memory_store().await;
        let first = store.insert("first".to_string()).await.unwrap();
        let second = store.insert("second".to_string()).await.unwrap();
        let third = store.insert("third".to_string()).await.unwrap();

        let ids: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn set_completed_refreshes_updated_at() {
        let store = memory_store().await;
        let todo = store.insert("Walk dog".to_string()).await.unwrap();

        assert_eq!(store.set_completed(&todo.id, true).await.unwrap(), 1);
        let updated = store.find(&todo.id).await.unwrap().unwrap();
        assert!(updated.completed);
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at >= todo.updated_at);
    }

    #[tokio::test]
    async fn unknown_ids_touch_nothing() {
        let store = memory_store().await;
        let missing = TodoId::generate();
        assert_eq!(store.set_completed(&missing, true).await.unwrap(), 0);
        assert_eq!(store.remove(&missing).await.unwrap(), 0);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_is_hard_delete() {
        let store = memory_store().await;
        let keep = store.insert("keep".to_string()).await.unwrap();
        let gone = store.insert("gone".to_string()).await.unwrap();

        assert_eq!(store.remove(&gone.id).await.unwrap(), 1);
        assert!(store.find(&gone.id).await.unwrap().is_none());
        assert_eq!(store.find_all().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn keeps_content_with_control_characters() {
        let store = memory_store().await;
        let todo = store.insert("\u{0}milk\n\t".to_string()).await.unwrap();

        let found = store.find(&todo.id).await.unwrap().unwrap();
        assert_eq!(found.content, "\u{0}milk\n\t");
    }

    #[tokio::test]
    async fn closed_store_reports_errors() {
        let store = memory_store().await;
        store.close().await;
        assert!(store.find_all().await.is_err());
        assert!(store.insert("late".to_string()).await.is_err());
    }
}
