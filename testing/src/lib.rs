//! # Composable Todo Testing
//!
//! Testing utilities and helpers shared by the workspace.
//!
//! This crate provides:
//! - Deterministic clocks ([`FixedClock`], [`ManualClock`])
//! - [`InMemoryTodoRepository`], a drop-in `TodoRepository` for handler tests
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - proptest strategies for todo titles
//!
//! ## Example
//!
//! ```
//! use composable_todo_core::{NewTodo, TodoRepository};
//! use composable_todo_testing::{InMemoryTodoRepository, test_clock};
//!
//! # tokio_test_block(async {
//! let repo = InMemoryTodoRepository::with_clock(test_clock());
//! let todo = repo.create(NewTodo::new("Write tests", None).unwrap()).await.unwrap();
//! assert_eq!(repo.list().await.unwrap(), vec![todo]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use chrono::{DateTime, Utc};
use composable_todo_core::environment::Clock;

mod repository;

pub use reducer_test::{ReducerTest, assertions, resolve_futures};
pub use repository::InMemoryTodoRepository;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use composable_todo_testing::mocks::FixedClock;
    /// use composable_todo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Lets tests put a known gap between two `created_at` stamps.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Start the clock at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// proptest strategies for todo input
pub mod properties {
    use proptest::prelude::*;

    /// Titles that survive trimming (no leading or trailing whitespace)
    pub fn valid_title() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ,.!?-]{0,40}[A-Za-z0-9.!?]|[A-Za-z0-9]"
    }

    /// Titles made only of whitespace (including the empty string)
    pub fn blank_title() -> impl Strategy<Value = String> {
        "[ \t\r\n]{0,12}"
    }
}

pub use mocks::{FixedClock, ManualClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn manual_clock_advances_on_request() {
        let start = test_clock().now();
        let clock = ManualClock::new(start);
        clock.advance(chrono::Duration::seconds(3));
        assert_eq!(clock.now() - start, chrono::Duration::seconds(3));
    }
}
