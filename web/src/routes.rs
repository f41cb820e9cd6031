//! Router configuration.

use crate::error::AppError;
use crate::handlers::{self, health_check};
use crate::state::AppState;
use axum::{Router, http::StatusCode, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Todo routes, mounted both at the root and under `/api`.
fn todo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .fallback(method_not_allowed),
        )
        .route(
            "/todos/:id",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo)
                .fallback(method_not_allowed),
        )
}

#[allow(clippy::unused_async)]
async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}

#[allow(clippy::unused_async)]
async fn method_not_allowed() -> AppError {
    AppError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
}

/// Build the complete Axum router.
///
/// # Routes
///
/// - `GET /health`
/// - `GET|POST /todos`, `GET|PUT|DELETE /todos/:id`
/// - the same todo routes under `/api`
///
/// Unknown paths answer 404 and unsupported methods 405, both with the error
/// envelope. CORS is open to all origins.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check).fallback(method_not_allowed))
        .merge(todo_routes())
        .nest("/api", todo_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
