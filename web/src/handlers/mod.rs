//! HTTP request handlers.

pub mod health;
pub mod todos;

pub use health::health_check;
pub use todos::{create_todo, delete_todo, get_todo, list_todos, update_todo};
