//! In-memory `TodoRepository` for fast, deterministic tests

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use composable_todo_core::environment::{Clock, SystemClock};
use composable_todo_core::repository::{RepositoryFuture, TodoRepository};
use composable_todo_core::{NewTodo, Todo, TodoError, TodoId, TodoPatch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Todo>,
    last_id: i64,
}

/// In-memory todo store with the same observable behavior as the SQLite one.
///
/// Ids increase monotonically and are never reused, even after deletes.
/// [`set_failing`](Self::set_failing) lets tests exercise storage errors.
///
/// # Example
///
/// ```
/// use composable_todo_testing::{InMemoryTodoRepository, test_clock};
///
/// let repo = InMemoryTodoRepository::with_clock(test_clock());
/// assert!(repo.is_empty());
/// ```
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    table: Arc<RwLock<Table>>,
    clock: Arc<dyn Clock>,
    failing: Arc<AtomicBool>,
}

impl InMemoryTodoRepository {
    /// Empty repository using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Empty repository stamping records with `clock`
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::with_shared_clock(Arc::new(clock))
    }

    /// Empty repository sharing a clock the test keeps a handle to
    #[must_use]
    pub fn with_shared_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
            clock,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent call fail with a storage error (or stop doing so)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().unwrap().rows.len()
    }

    /// Whether the repository holds no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), TodoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TodoError::storage("in-memory store is offline"));
        }
        Ok(())
    }

    fn list_now(&self) -> Result<Vec<Todo>, TodoError> {
        self.check()?;
        let mut rows = self.table.read().unwrap().rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn get_now(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.check()?;
        self.table
            .read()
            .unwrap()
            .rows
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TodoError::NotFound(id))
    }

    fn create_now(&self, new: NewTodo) -> Result<Todo, TodoError> {
        self.check()?;
        let mut table = self.table.write().unwrap();
        table.last_id += 1;
        let todo = Todo::from_new(TodoId::new(table.last_id), new, self.clock.now());
        table.rows.push(todo.clone());
        Ok(todo)
    }

    fn update_now(&self, id: TodoId, patch: &TodoPatch) -> Result<Todo, TodoError> {
        self.check()?;
        let mut table = self.table.write().unwrap();
        let todo = table
            .rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TodoError::NotFound(id))?;
        patch.apply_to(todo, self.clock.now());
        Ok(todo.clone())
    }

    fn delete_now(&self, id: TodoId) -> Result<(), TodoError> {
        self.check()?;
        let mut table = self.table.write().unwrap();
        let before = table.rows.len();
        table.rows.retain(|t| t.id != id);
        if table.rows.len() == before {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTodoRepository")
            .field("len", &self.len())
            .field("failing", &self.failing.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn list(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(async move { self.list_now() })
    }

    fn get(&self, id: TodoId) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move { self.get_now(id) })
    }

    fn create(&self, new: NewTodo) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move { self.create_now(new) })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move { self.update_now(id, &patch) })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()> {
        Box::pin(async move { self.delete_now(id) })
    }
}
