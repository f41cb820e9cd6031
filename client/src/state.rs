//! Client-side state: the mirror, the display filter, and notices.

use composable_todo_core::{Todo, TodoId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display-only predicate over the mirror.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Todos not yet completed
    Active,
    /// Completed todos
    Completed,
}

impl Filter {
    /// Whether `todo` is shown under this filter.
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }

    /// Lowercase name, as used on the wire and in the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!("Unknown filter: {other}")),
        }
    }
}

/// Which sync operation a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// `reload`
    Load,
    /// `add`
    Create,
    /// `toggle`
    Update,
    /// `remove`
    Delete,
}

impl Operation {
    /// User-facing prefix for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load todos",
            Self::Create => "Failed to create todo",
            Self::Update => "Failed to update todo",
            Self::Delete => "Failed to delete todo",
        }
    }
}

/// Identifier of a [`Notice`], unique within one client.
pub type NoticeId = u64;

/// Transient user-facing failure message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Used to dismiss this notice
    pub id: NoticeId,
    /// Operation that failed
    pub operation: Operation,
    /// `"<operation failure>: <reason>"`
    pub message: String,
}

/// Active and completed totals over the whole mirror.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Not yet completed
    pub active: usize,
    /// Completed
    pub completed: usize,
}

impl Counts {
    /// `active + completed`
    #[must_use]
    pub const fn total(&self) -> usize {
        self.active + self.completed
    }
}

/// State owned by the sync [`Store`](composable_todo_runtime::Store).
#[derive(Clone, Debug, Default)]
pub struct SyncState {
    /// Local copy of the server's records, newest first
    pub mirror: Vec<Todo>,
    /// Current display filter
    pub filter: Filter,
    /// Undismissed failure notices, oldest first
    pub notices: Vec<Notice>,
    /// Whether periodic reload is running
    pub auto_reload: bool,
    /// Bumped on every start so stale timers can recognise themselves
    pub reload_generation: u64,
    pub(crate) next_notice_id: NoticeId,
}

impl SyncState {
    /// Empty mirror, `all` filter, no notices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror entries visible under the current filter.
    ///
    /// The iterator is lazy and can be cloned to walk it again.
    pub fn view(&self) -> impl Iterator<Item = &Todo> + Clone + '_ {
        self.view_with(self.filter)
    }

    /// Mirror entries visible under `filter`.
    pub fn view_with(&self, filter: Filter) -> impl Iterator<Item = &Todo> + Clone + '_ {
        self.mirror.iter().filter(move |todo| filter.matches(todo))
    }

    /// Active / completed totals over the whole mirror.
    #[must_use]
    pub fn counts(&self) -> Counts {
        let completed = self.mirror.iter().filter(|t| t.completed).count();
        Counts {
            active: self.mirror.len() - completed,
            completed,
        }
    }

    /// Mirror entry for `id`.
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.mirror.iter().find(|t| t.id == id)
    }

    /// Insert a server-returned record at the front, or replace the entry
    /// with the same id if a reload already brought it in.
    pub fn upsert_front(&mut self, todo: Todo) {
        if let Some(existing) = self.mirror.iter_mut().find(|t| t.id == todo.id) {
            *existing = todo;
        } else {
            self.mirror.insert(0, todo);
        }
    }

    /// Replace the entry with the same id. Returns `false` if it is gone.
    pub fn replace(&mut self, todo: Todo) -> bool {
        match self.mirror.iter_mut().find(|t| t.id == todo.id) {
            Some(existing) => {
                *existing = todo;
                true
            },
            None => false,
        }
    }

    /// Drop the entry for `id`, if any.
    pub fn remove(&mut self, id: TodoId) {
        self.mirror.retain(|t| t.id != id);
    }

    /// Record a failure and return the new notice's id.
    pub fn push_notice(&mut self, operation: Operation, reason: &str) -> NoticeId {
        self.next_notice_id += 1;
        let id = self.next_notice_id;
        self.notices.push(Notice {
            id,
            operation,
            message: format!("{}: {reason}", operation.failure_message()),
        });
        id
    }

    /// Remove a notice. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: NoticeId) {
        self.notices.retain(|n| n.id != id);
    }
}
