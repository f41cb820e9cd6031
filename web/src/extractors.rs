//! Custom Axum extractors.
//!
//! - `JsonObject`: request body parsed as a JSON object, with the todo API's
//!   own 400 messages instead of axum's plain-text rejections
//! - `TodoIdPath`: the `{id}` path segment parsed as a [`TodoId`]

use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use composable_todo_core::TodoId;
use serde_json::{Map, Value};

/// Message returned when the body is absent, empty, or not an object.
pub const NO_DATA: &str = "No data provided";

/// A request body that must be a JSON object.
///
/// The `Content-Type` header is not checked; an empty body, `null`, or a
/// non-object value is rejected with "No data provided".
#[derive(Debug, Clone)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(format!("Could not read request body: {e}")))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::bad_request(NO_DATA));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(AppError::bad_request(NO_DATA)),
            Err(e) => Err(AppError::bad_request(format!("Invalid JSON: {e}"))),
        }
    }
}

/// The `{id}` path parameter as a [`TodoId`].
#[derive(Debug, Clone, Copy)]
pub struct TodoIdPath(pub TodoId);

#[async_trait]
impl<S> FromRequestParts<S> for TodoIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        raw.parse::<TodoId>()
            .map(Self)
            .map_err(|_| AppError::bad_request(format!("Invalid todo id: {raw}")))
    }
}
