//! Command-style facade over the sync [`Store`].

use crate::action::SyncAction;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::HttpTodoApi;
use crate::reducer::{SyncEnvironment, SyncReducer};
use crate::state::{Counts, Filter, Notice, SyncState};
use composable_todo_core::{Todo, TodoId};
use composable_todo_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;

type SyncStore = Store<SyncState, SyncAction, SyncEnvironment, SyncReducer>;

/// The client sync layer.
///
/// Every command resolves once its request has come back and the mirror
/// has been reconciled. Failures never surface as `Err`: they become a
/// [`Notice`] instead. `Err` only means the store is shutting down.
///
/// # Example
///
/// ```ignore
/// let client = SyncClient::new(SyncEnvironment::new(api));
/// client.reload().await?;
/// client.add("Buy milk", None).await?;
/// for todo in client.view().await {
///     println!("{}", todo.title);
/// }
/// ```
#[derive(Clone)]
pub struct SyncClient {
    store: SyncStore,
}

impl SyncClient {
    /// Client over an arbitrary environment.
    #[must_use]
    pub fn new(environment: SyncEnvironment) -> Self {
        Self {
            store: Store::new(SyncState::new(), SyncReducer::new(), environment),
        }
    }

    /// HTTP client configured from [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let api = HttpTodoApi::new(config.api_url.clone(), config.request_timeout)?;
        let environment = SyncEnvironment::new(Arc::new(api))
            .with_reload_interval(config.reload_interval)
            .with_notice_ttl(config.notice_ttl);
        Ok(Self::new(environment))
    }

    async fn dispatch(&self, action: SyncAction) -> Result<(), StoreError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;
        Ok(())
    }

    /// Replace the mirror with the server's list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn reload(&self) -> Result<(), StoreError> {
        self.dispatch(SyncAction::Reload).await
    }

    /// Create a todo and prepend it to the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn add(&self, title: &str, description: Option<String>) -> Result<(), StoreError> {
        self.dispatch(SyncAction::Add {
            title: title.to_string(),
            description,
        })
        .await
    }

    /// Flip `completed` on the server and take its answer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn toggle(&self, id: TodoId) -> Result<(), StoreError> {
        self.dispatch(SyncAction::Toggle { id }).await
    }

    /// Delete on the server, then from the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn remove(&self, id: TodoId) -> Result<(), StoreError> {
        self.dispatch(SyncAction::Remove { id }).await
    }

    /// Change the display filter. No request is made.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn set_filter(&self, filter: Filter) -> Result<(), StoreError> {
        self.dispatch(SyncAction::SetFilter { filter }).await
    }

    /// Reload now and again every `reload_interval`.
    ///
    /// Resolves after the first reload. Calling it again restarts the
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn start_auto_reload(&self) -> Result<(), StoreError> {
        self.dispatch(SyncAction::StartAutoReload).await
    }

    /// Stop the periodic reload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn stop_auto_reload(&self) -> Result<(), StoreError> {
        self.dispatch(SyncAction::StopAutoReload).await
    }

    /// Mirror entries under the current filter.
    pub async fn view(&self) -> Vec<Todo> {
        self.store.state(|s| s.view().cloned().collect()).await
    }

    /// The whole mirror, ignoring the filter.
    pub async fn mirror(&self) -> Vec<Todo> {
        self.store.state(|s| s.mirror.clone()).await
    }

    /// Current filter.
    pub async fn filter(&self) -> Filter {
        self.store.state(|s| s.filter).await
    }

    /// Undismissed notices, oldest first.
    pub async fn notices(&self) -> Vec<Notice> {
        self.store.state(|s| s.notices.clone()).await
    }

    /// Active / completed totals.
    pub async fn counts(&self) -> Counts {
        self.store.state(SyncState::counts).await
    }

    /// Read anything from the state in one lock.
    pub async fn with_state<T>(&self, f: impl FnOnce(&SyncState) -> T) -> T {
        self.store.state(f).await
    }

    /// Stop accepting commands and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if requests are still running
    /// when `timeout` elapses.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient").finish_non_exhaustive()
    }
}
