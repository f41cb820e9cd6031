//! # Composable Todo Client
//!
//! Client sync layer for the todo API: keeps an in-memory mirror of the
//! server's list, filters it for display, and reconciles it with the server
//! after every mutation.
//!
//! The layer is a reducer ([`SyncReducer`]) over [`SyncState`], run by the
//! workspace [`Store`](composable_todo_runtime::Store). Network calls are
//! `Effect::Future`s built from an injected [`TodoApi`]; timers (periodic
//! reload, notice expiry) are `Effect::Delay`s.
//!
//! ```text
//! SyncClient::toggle(id)
//!   → SyncAction::Toggle        (reducer reads mirror, builds PUT)
//!   → Effect::Future            (TodoApi::update)
//!   → SyncAction::Updated       (reducer replaces entry by id)
//! ```
//!
//! On failure the mirror is left as it was and a [`Notice`] is pushed.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod reducer;
pub mod render;
pub mod state;

pub use action::SyncAction;
pub use api::{ApiFuture, RepositoryApi, TodoApi};
pub use client::SyncClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use http::HttpTodoApi;
pub use reducer::{SyncEnvironment, SyncReducer};
pub use state::{Counts, Filter, Notice, Operation, SyncState};
