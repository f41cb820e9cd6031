//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when a reducer needs to describe an async
//! call or a timer without spelling out `Box::pin` and `Box::new` by hand.

/// Create an `Effect::Future` from an async block body
///
/// The body runs inside `async move`, so it takes ownership of everything it
/// captures (clone `Arc`s before the macro).
///
/// # Example
///
/// ```rust,ignore
/// use composable_todo_core::async_effect;
///
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     match api.list().await {
///         Ok(todos) => Some(SyncAction::Loaded { todos }),
///         Err(error) => Some(SyncAction::Failed { operation: Operation::Load, reason: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use composable_todo_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(5),
///     action: SyncAction::DismissNotice { id }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
