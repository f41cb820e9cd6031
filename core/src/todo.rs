//! Domain types for todo records.
//!
//! `Todo` is what the store hands back. `NewTodo` and `TodoPatch` are what
//! callers hand in; both can only be built through validating constructors,
//! so a repository never sees an empty title.

use crate::error::TodoError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Error message for a create request without a usable title.
pub const TITLE_REQUIRED: &str = "Title is required and cannot be empty";

/// Error message for an update that would blank the title.
pub const TITLE_EMPTY: &str = "Title cannot be empty";

/// Store-assigned identifier of a todo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw database id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A persisted todo record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Non-empty, trimmed title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Whether the todo is done
    pub completed: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// When the todo was last mutated
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Builds the record for a freshly inserted `NewTodo`.
    #[must_use]
    pub fn from_new(id: TodoId, new: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            completed: new.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, keeping it strictly increasing.
    ///
    /// Two mutations inside the same clock tick (or a clock that stepped
    /// backwards) still yield a later stamp than the previous one.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Trims a title and rejects it when nothing is left.
fn clean_title(raw: &str, message: &str) -> Result<String, TodoError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TodoError::validation(message));
    }
    Ok(title.to_string())
}

fn clean_description(raw: Option<String>) -> Option<String> {
    raw.map(|d| d.trim().to_string())
}

/// Validated input for creating a todo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    title: String,
    description: Option<String>,
    completed: bool,
}

impl NewTodo {
    /// Validates and normalizes a create request.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] when the title is empty or
    /// whitespace-only.
    pub fn new(title: &str, description: Option<String>) -> Result<Self, TodoError> {
        Ok(Self {
            title: clean_title(title, TITLE_REQUIRED)?,
            description: clean_description(description),
            completed: false,
        })
    }

    /// Creates the todo already marked as completed (or not).
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Initial completion flag.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }
}

/// Validated partial update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    title: Option<String>,
    description: Option<Option<String>>,
    completed: Option<bool>,
}

impl TodoPatch {
    /// An empty patch; applying it only refreshes `updated_at`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] when the title is empty or
    /// whitespace-only.
    pub fn with_title(mut self, title: &str) -> Result<Self, TodoError> {
        self.title = Some(clean_title(title, TITLE_EMPTY)?);
        Ok(self)
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(clean_description(description));
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// New title, if present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// New description, if present (`Some(None)` clears it).
    #[must_use]
    pub fn description(&self) -> Option<Option<&str>> {
        self.description.as_ref().map(Option::as_deref)
    }

    /// New completion flag, if present.
    #[must_use]
    pub const fn completed(&self) -> Option<bool> {
        self.completed
    }

    /// `true` when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Applies the present fields and stamps `updated_at`.
    pub fn apply_to(&self, todo: &mut Todo, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            todo.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            todo.description.clone_from(description);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.touch(now);
    }
}
