//! Todo HTTP API server.
//!
//! ```bash
//! DATABASE_URL=sqlite://todos.db PORT=5000 cargo run --bin todo-server
//!
//! curl -X POST http://localhost:5000/api/todos \
//!   -H "Content-Type: application/json" \
//!   -d '{"title": "Buy milk"}'
//! curl http://localhost:5000/api/todos
//! ```

use anyhow::Context;
use composable_todo_sqlite::SqliteTodoRepository;
use composable_todo_web::{AppState, Config, build_router};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,composable_todo_web=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    info!(database_url = %config.database_url, "Opening todo database");
    let repository =
        SqliteTodoRepository::connect(&config.database_url, config.database_max_connections)
            .await
            .context("connecting to database")?;
    repository.migrate().await.context("running migrations")?;

    let app = build_router(AppState::new(Arc::new(repository.clone())));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, closing database pool");
    repository.pool().close().await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
