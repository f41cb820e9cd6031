//! Actions for the sync reducer.

use crate::state::{Filter, NoticeId, Operation};
use composable_todo_core::{Todo, TodoId};

/// Everything the sync layer reacts to.
///
/// Commands come from the user (through [`SyncClient`](crate::SyncClient));
/// responses come back from effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncAction {
    // Commands
    /// Fetch the full list and replace the mirror
    Reload,
    /// Create a todo
    Add {
        /// Raw title as typed; trimmed and validated before any request
        title: String,
        /// Raw description
        description: Option<String>,
    },
    /// Flip `completed` on the server
    Toggle {
        /// Mirror entry to flip
        id: TodoId,
    },
    /// Delete on the server
    Remove {
        /// Mirror entry to delete
        id: TodoId,
    },
    /// Change the display filter
    SetFilter {
        /// New filter
        filter: Filter,
    },
    /// Reload now and then on every interval tick
    StartAutoReload,
    /// Stop the periodic reload
    StopAutoReload,

    // Timers
    /// Interval elapsed for the given start generation
    AutoReloadTick {
        /// Generation that scheduled this tick
        generation: u64,
    },
    /// Notice lifetime elapsed
    DismissNotice {
        /// Notice to drop
        id: NoticeId,
    },

    // Responses
    /// `list()` succeeded
    Loaded {
        /// Server's full list, newest first
        todos: Vec<Todo>,
    },
    /// `create()` succeeded
    Created {
        /// Record as stored
        todo: Todo,
    },
    /// `update()` succeeded
    Updated {
        /// Record as stored
        todo: Todo,
    },
    /// `delete()` succeeded
    Removed {
        /// Deleted id
        id: TodoId,
    },
    /// Any operation failed
    Failed {
        /// Which operation
        operation: Operation,
        /// Server or transport reason
        reason: String,
    },
}
