//! reqwest-backed [`TodoApi`].

use crate::api::{ApiFuture, TodoApi};
use crate::error::ClientError;
use composable_todo_core::{NewTodo, Todo, TodoId, TodoPatch};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Success envelope: `{success: true, data: ..., ...}`.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Error envelope: `{success: false, error: ..., status: ...}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// HTTP client for the todo API.
///
/// `base_url` is the server root; requests go to `{base_url}/api/todos`.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Create a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Server root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }

    /// Turn a response into `T`, or the server's error message.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn api_error(status: StatusCode, response: Response) -> ClientError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
            |_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Request failed").to_string()
                } else {
                    body
                }
            },
            |envelope| envelope.error,
        );

        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

fn network(e: reqwest::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

fn create_body(new: &NewTodo) -> Value {
    json!({
        "title": new.title(),
        "description": new.description(),
        "completed": new.completed(),
    })
}

fn patch_body(patch: &TodoPatch) -> Value {
    let mut body = Map::new();
    if let Some(title) = patch.title() {
        body.insert("title".into(), Value::from(title));
    }
    if let Some(description) = patch.description() {
        body.insert("description".into(), description.map_or(Value::Null, Value::from));
    }
    if let Some(completed) = patch.completed() {
        body.insert("completed".into(), Value::Bool(completed));
    }
    Value::Object(body)
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            tracing::debug!(url = %self.todos_url(), "Fetching todos");
            let response = self.client.get(self.todos_url()).send().await.map_err(network)?;
            let envelope: DataEnvelope<Vec<Todo>> = Self::decode(response).await?;
            Ok(envelope.data)
        })
    }

    fn create(&self, new: NewTodo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.todos_url())
                .json(&create_body(&new))
                .send()
                .await
                .map_err(network)?;
            let envelope: DataEnvelope<Todo> = Self::decode(response).await?;
            Ok(envelope.data)
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            let response = self
                .client
                .put(self.todo_url(id))
                .json(&patch_body(&patch))
                .send()
                .await
                .map_err(network)?;
            let envelope: DataEnvelope<Todo> = Self::decode(response).await?;
            Ok(envelope.data)
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let response = self.client.delete(self.todo_url(id)).send().await.map_err(network)?;
            let _: Value = Self::decode(response).await?;
            Ok(())
        })
    }
}
