//! Application state for Axum handlers.

use composable_todo_core::TodoRepository;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Holds the todo repository behind a trait object so the same router
/// serves SQLite in production and the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    /// Persistence boundary for todos
    pub repository: Arc<dyn TodoRepository>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
