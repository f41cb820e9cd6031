//! Persistence boundary for todos.
//!
//! Implementations live in `composable-todo-sqlite` (production) and
//! `composable-todo-testing` (in-memory). The HTTP layer only sees the trait.

use crate::error::TodoError;
use crate::todo::{NewTodo, Todo, TodoId, TodoPatch};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`TodoRepository`] methods.
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TodoError>> + Send + 'a>>;

/// Durable collection of todos.
///
/// The trait is dyn-compatible so handlers can hold an
/// `Arc<dyn TodoRepository>` and tests can swap in the in-memory version.
///
/// Every successful mutation is durable before its future resolves, and
/// `updated_at` strictly increases across mutations of the same record.
pub trait TodoRepository: Send + Sync {
    /// Returns all todos, newest first (`created_at` descending, ties broken
    /// by descending id).
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Storage`] if the engine fails.
    fn list(&self) -> RepositoryFuture<'_, Vec<Todo>>;

    /// Fetches a single todo.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no record has this id, or
    /// [`TodoError::Storage`] if the engine fails.
    fn get(&self, id: TodoId) -> RepositoryFuture<'_, Todo>;

    /// Inserts a new todo, assigning a fresh id and both timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Storage`] if the engine fails.
    fn create(&self, new: NewTodo) -> RepositoryFuture<'_, Todo>;

    /// Applies a partial update and returns the record after the change.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no record has this id, or
    /// [`TodoError::Storage`] if the engine fails.
    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, Todo>;

    /// Permanently removes a todo.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no record has this id, or
    /// [`TodoError::Storage`] if the engine fails.
    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()>;
}
