//! SQLite todo store for Composable Todo.
//!
//! Implements `TodoRepository` on top of a sqlx `SqlitePool`:
//!
//! - Embedded migrations (`migrations/`), applied with [`SqliteTodoRepository::migrate`]
//! - Monotonic `AUTOINCREMENT` ids that are never reused
//! - Updates are optimistic: a concurrent write forces a re-read, never an error
//!
//! # Example
//!
//! ```no_run
//! use composable_todo_sqlite::SqliteTodoRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = SqliteTodoRepository::connect("sqlite://todos.db", 5).await?;
//! repo.migrate().await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use composable_todo_core::environment::{Clock, SystemClock};
use composable_todo_core::repository::{RepositoryFuture, TodoRepository};
use composable_todo_core::{NewTodo, Todo, TodoError, TodoId, TodoPatch};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

const SELECT_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: TodoId::new(row.id),
            title: row.title,
            description: row.description,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn storage(action: &'static str) -> impl FnOnce(sqlx::Error) -> TodoError {
    move |e| {
        tracing::error!(error = %e, "Failed to {action}");
        TodoError::storage(format!("Failed to {action}: {e}"))
    }
}

/// SQLite todo repository.
#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteTodoRepository {
    /// Wrap an existing pool, stamping records with the system clock.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for `created_at` / `updated_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open a pool for `url`, creating the database file if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Storage`] if the URL is malformed or the
    /// database cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, TodoError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage("parse database url"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(storage("open database"))?;

        tracing::info!(url, max_connections, "Connected to SQLite");
        Ok(Self::new(pool))
    }

    /// Fresh, migrated in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// `:memory:` connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Storage`] if the database cannot be opened or
    /// migrated.
    pub async fn in_memory() -> Result<Self, TodoError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(storage("parse database url"))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(storage("open database"))?;

        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TodoError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TodoError::storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_all(&self) -> Result<Vec<Todo>, TodoError> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage("list todos"))?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn fetch_one(&self, id: TodoId) -> Result<Todo, TodoError> {
        let row: Option<TodoRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM todos WHERE id = ?"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage("get todo"))?;

        row.map(Todo::from).ok_or(TodoError::NotFound(id))
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, TodoError> {
        let now = self.clock.now();
        let row: TodoRow = sqlx::query_as(&format!(
            "INSERT INTO todos (title, description, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {SELECT_COLUMNS}"
        ))
        .bind(new.title())
        .bind(new.description())
        .bind(new.completed())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(storage("create todo"))?;

        tracing::debug!(id = row.id, "Created todo");
        Ok(row.into())
    }

    /// Compare-and-swap on `updated_at`, which changes on every write.
    ///
    /// Each statement runs on its own, so a concurrent writer makes this one
    /// re-read and retry instead of failing with `SQLITE_BUSY`. The last
    /// successful swap wins.
    async fn modify(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, TodoError> {
        loop {
            let mut todo = self.fetch_one(id).await?;
            let seen = todo.updated_at;
            patch.apply_to(&mut todo, self.clock.now());

            let result = sqlx::query(
                "UPDATE todos SET title = ?, description = ?, completed = ?, updated_at = ? \
                 WHERE id = ? AND updated_at = ?",
            )
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.updated_at)
            .bind(id.get())
            .bind(seen)
            .execute(&self.pool)
            .await
            .map_err(storage("update todo"))?;

            if result.rows_affected() == 1 {
                tracing::debug!(%id, "Updated todo");
                return Ok(todo);
            }
            tracing::debug!(%id, "Todo changed during update, retrying");
        }
    }

    async fn remove(&self, id: TodoId) -> Result<(), TodoError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(storage("delete todo"))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id));
        }

        tracing::debug!(%id, "Deleted todo");
        Ok(())
    }
}

impl std::fmt::Debug for SqliteTodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTodoRepository")
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn list(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(self.fetch_all())
    }

    fn get(&self, id: TodoId) -> RepositoryFuture<'_, Todo> {
        Box::pin(self.fetch_one(id))
    }

    fn create(&self, new: NewTodo) -> RepositoryFuture<'_, Todo> {
        Box::pin(self.insert(new))
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, Todo> {
        Box::pin(self.modify(id, patch))
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()> {
        Box::pin(self.remove(id))
    }
}
