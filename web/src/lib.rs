//! Axum HTTP surface for the todo store.
//!
//! Thin imperative shell over a [`TodoRepository`](composable_todo_core::TodoRepository):
//! handlers validate JSON bodies into `NewTodo` / `TodoPatch`, call the
//! repository, and wrap the result in the `{success, ...}` envelope.
//!
//! # Example
//!
//! ```ignore
//! use composable_todo_web::{AppState, build_router};
//!
//! let repository = SqliteTodoRepository::in_memory().await?;
//! let app = build_router(AppState::new(Arc::new(repository)));
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use extractors::{JsonObject, TodoIdPath};
pub use routes::build_router;
pub use state::AppState;
