//! The client's view of the todo store.
//!
//! [`TodoApi`] mirrors the HTTP surface one method per endpoint. The sync
//! reducer only ever talks to an `Arc<dyn TodoApi>`, so the transport can be
//! HTTP ([`HttpTodoApi`](crate::HttpTodoApi)) or a repository in the same
//! process ([`RepositoryApi`]).

use crate::error::ClientError;
use composable_todo_core::{NewTodo, Todo, TodoError, TodoId, TodoPatch, TodoRepository};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Boxed future returned by [`TodoApi`] methods.
pub type ApiFuture<'a, T> = BoxFuture<'a, Result<T, ClientError>>;

/// Remote todo store.
pub trait TodoApi: Send + Sync {
    /// `GET /todos`
    fn list(&self) -> ApiFuture<'_, Vec<Todo>>;

    /// `POST /todos`
    fn create(&self, new: NewTodo) -> ApiFuture<'_, Todo>;

    /// `PUT /todos/{id}`
    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo>;

    /// `DELETE /todos/{id}`
    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()>;
}

impl From<TodoError> for ClientError {
    fn from(err: TodoError) -> Self {
        let status = match &err {
            TodoError::Validation(_) => 400,
            TodoError::NotFound(_) => 404,
            TodoError::Storage(_) => 500,
        };
        let message = match err {
            TodoError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        Self::Api { status, message }
    }
}

/// [`TodoApi`] backed directly by a [`TodoRepository`], with errors mapped
/// the way the HTTP server maps them.
///
/// Lets the sync layer run against a repository in the same process, with
/// no socket in between.
#[derive(Clone)]
pub struct RepositoryApi {
    repository: Arc<dyn TodoRepository>,
}

impl RepositoryApi {
    /// Wrap a repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }
}

impl std::fmt::Debug for RepositoryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryApi").finish_non_exhaustive()
    }
}

impl TodoApi for RepositoryApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move { Ok(self.repository.list().await?) })
    }

    fn create(&self, new: NewTodo) -> ApiFuture<'_, Todo> {
        Box::pin(async move { Ok(self.repository.create(new).await?) })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(async move { Ok(self.repository.update(id, patch).await?) })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move { Ok(self.repository.delete(id).await?) })
    }
}
