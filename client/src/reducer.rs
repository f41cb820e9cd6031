//! Reducer for the client sync layer.
//!
//! Commands either fail locally (bad title, unknown id) or turn into one
//! network call described as an `Effect::Future`. Responses patch the
//! mirror; failures leave it untouched and raise one notice that dismisses
//! itself after `notice_ttl`.

use crate::action::SyncAction;
use crate::api::TodoApi;
use crate::state::{Operation, SyncState};
use composable_todo_core::{
    NewTodo, SmallVec, TodoPatch, async_effect, delay, effect::Effect, reducer::Reducer, smallvec,
};
use std::sync::Arc;
use std::time::Duration;

/// Default interval between automatic reloads.
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(30);

/// Default lifetime of a failure notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Environment dependencies for the sync reducer
#[derive(Clone)]
pub struct SyncEnvironment {
    /// Remote todo store
    pub api: Arc<dyn TodoApi>,
    /// Time between automatic reloads
    pub reload_interval: Duration,
    /// Time a notice stays visible
    pub notice_ttl: Duration,
}

impl SyncEnvironment {
    /// Environment with the default interval and notice lifetime.
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            api,
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }

    /// Override the reload interval.
    #[must_use]
    pub const fn with_reload_interval(mut self, interval: Duration) -> Self {
        self.reload_interval = interval;
        self
    }

    /// Override the notice lifetime.
    #[must_use]
    pub const fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for SyncEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEnvironment")
            .field("reload_interval", &self.reload_interval)
            .field("notice_ttl", &self.notice_ttl)
            .finish_non_exhaustive()
    }
}

/// Reducer for the client sync layer
#[derive(Clone, Debug, Default)]
pub struct SyncReducer;

impl SyncReducer {
    /// Creates a new `SyncReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load(env: &SyncEnvironment) -> Effect<SyncAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            Some(match api.list().await {
                Ok(todos) => SyncAction::Loaded { todos },
                Err(error) => SyncAction::Failed {
                    operation: Operation::Load,
                    reason: error.to_string(),
                },
            })
        }
    }

    fn next_tick(state: &SyncState, env: &SyncEnvironment) -> Effect<SyncAction> {
        delay! {
            duration: env.reload_interval,
            action: SyncAction::AutoReloadTick { generation: state.reload_generation }
        }
    }

    /// Record a failure and schedule its dismissal.
    fn fail(
        state: &mut SyncState,
        operation: Operation,
        reason: &str,
        env: &SyncEnvironment,
    ) -> Effect<SyncAction> {
        tracing::warn!(?operation, reason, "Sync operation failed");
        let id = state.push_notice(operation, reason);
        delay! {
            duration: env.notice_ttl,
            action: SyncAction::DismissNotice { id }
        }
    }
}

impl Reducer for SyncReducer {
    type State = SyncState;
    type Action = SyncAction;
    type Environment = SyncEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            SyncAction::Reload => smallvec![Self::load(env)],

            SyncAction::Add { title, description } => {
                let new = match NewTodo::new(&title, description) {
                    Ok(new) => new,
                    Err(error) => {
                        return smallvec![Self::fail(
                            state,
                            Operation::Create,
                            &error.to_string(),
                            env
                        )];
                    },
                };

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    Some(match api.create(new).await {
                        Ok(todo) => SyncAction::Created { todo },
                        Err(error) => SyncAction::Failed {
                            operation: Operation::Create,
                            reason: error.to_string(),
                        },
                    })
                }]
            },

            SyncAction::Toggle { id } => {
                let Some(current) = state.get(id) else {
                    let reason = format!("Todo with id {id} not found");
                    return smallvec![Self::fail(state, Operation::Update, &reason, env)];
                };

                let patch = TodoPatch::new().with_completed(!current.completed);
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    Some(match api.update(id, patch).await {
                        Ok(todo) => SyncAction::Updated { todo },
                        Err(error) => SyncAction::Failed {
                            operation: Operation::Update,
                            reason: error.to_string(),
                        },
                    })
                }]
            },

            SyncAction::Remove { id } => {
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    Some(match api.delete(id).await {
                        Ok(()) => SyncAction::Removed { id },
                        Err(error) => SyncAction::Failed {
                            operation: Operation::Delete,
                            reason: error.to_string(),
                        },
                    })
                }]
            },

            SyncAction::SetFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            },

            SyncAction::StartAutoReload => {
                state.auto_reload = true;
                state.reload_generation += 1;
                smallvec![Self::load(env), Self::next_tick(state, env)]
            },

            SyncAction::StopAutoReload => {
                state.auto_reload = false;
                SmallVec::new()
            },

            // ========== Timers ==========
            SyncAction::AutoReloadTick { generation } => {
                if !state.auto_reload || generation != state.reload_generation {
                    tracing::trace!(generation, "Ignoring stale reload tick");
                    return SmallVec::new();
                }
                smallvec![Self::load(env), Self::next_tick(state, env)]
            },

            SyncAction::DismissNotice { id } => {
                state.dismiss(id);
                SmallVec::new()
            },

            // ========== Responses ==========
            SyncAction::Loaded { todos } => {
                tracing::debug!(count = todos.len(), "Mirror reloaded");
                state.mirror = todos;
                SmallVec::new()
            },

            SyncAction::Created { todo } => {
                state.upsert_front(todo);
                SmallVec::new()
            },

            SyncAction::Updated { todo } => {
                if !state.replace(todo) {
                    tracing::debug!("Updated todo no longer in mirror");
                }
                SmallVec::new()
            },

            SyncAction::Removed { id } => {
                state.remove(id);
                SmallVec::new()
            },

            SyncAction::Failed { operation, reason } => {
                smallvec![Self::fail(state, operation, &reason, env)]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::RepositoryApi;
    use crate::state::Filter;
    use composable_todo_core::{Todo, TodoId, TodoRepository};
    use composable_todo_testing::{InMemoryTodoRepository, ReducerTest, assertions, resolve_futures};

    fn env_for(repo: &InMemoryTodoRepository) -> SyncEnvironment {
        SyncEnvironment::new(Arc::new(RepositoryApi::new(Arc::new(repo.clone()))))
    }

    async fn seeded(titles: &[&str]) -> (InMemoryTodoRepository, Vec<Todo>) {
        let repo = InMemoryTodoRepository::new();
        for title in titles {
            repo.create(NewTodo::new(title, None).unwrap()).await.unwrap();
        }
        let todos = repo.list().await.unwrap();
        (repo, todos)
    }

    fn reduce(state: &mut SyncState, action: SyncAction, env: &SyncEnvironment) -> Vec<Effect<SyncAction>> {
        SyncReducer::new().reduce(state, action, env).into_vec()
    }

    #[test]
    fn set_filter_touches_nothing_else() {
        let repo = InMemoryTodoRepository::new();
        ReducerTest::new(SyncReducer::new())
            .with_env(env_for(&repo))
            .given_state(SyncState::new())
            .when_action(SyncAction::SetFilter {
                filter: Filter::Completed,
            })
            .then_state(|state| {
                assert_eq!(state.filter, Filter::Completed);
                assert!(state.mirror.is_empty());
                assert!(state.notices.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn blank_title_fails_locally_without_a_call() {
        let repo = InMemoryTodoRepository::new();
        let ttl = DEFAULT_NOTICE_TTL;
        ReducerTest::new(SyncReducer::new())
            .with_env(env_for(&repo))
            .given_state(SyncState::new())
            .when_action(SyncAction::Add {
                title: "   ".into(),
                description: None,
            })
            .then_state(|state| {
                assert!(state.mirror.is_empty());
                assert_eq!(state.notices.len(), 1);
                assert_eq!(
                    state.notices[0].message,
                    "Failed to create todo: Title is required and cannot be empty"
                );
            })
            .then_effects(move |effects| {
                assertions::assert_no_future_effect(effects);
                let delayed = assertions::delayed_actions(effects);
                assert_eq!(delayed.len(), 1);
                assert_eq!(*delayed[0].0, ttl);
                assert!(matches!(delayed[0].1, SyncAction::DismissNotice { .. }));
            })
            .run();
        assert!(repo.is_empty());
    }

    #[test]
    fn toggle_of_unknown_id_is_an_update_failure() {
        let repo = InMemoryTodoRepository::new();
        ReducerTest::new(SyncReducer::new())
            .with_env(env_for(&repo))
            .given_state(SyncState::new())
            .when_action(SyncAction::Toggle { id: TodoId::new(5) })
            .then_state(|state| {
                assert_eq!(
                    state.notices[0].message,
                    "Failed to update todo: Todo with id 5 not found"
                );
            })
            .then_effects(assertions::assert_no_future_effect)
            .run();
    }

    #[test]
    fn failure_leaves_mirror_and_adds_one_notice() {
        let repo = InMemoryTodoRepository::new();
        let mirror = vec![];
        ReducerTest::new(SyncReducer::new())
            .with_env(env_for(&repo))
            .given_state(SyncState {
                mirror: mirror.clone(),
                ..SyncState::new()
            })
            .when_action(SyncAction::Failed {
                operation: Operation::Delete,
                reason: "Network error: refused".into(),
            })
            .then_state(move |state| {
                assert_eq!(state.mirror, mirror);
                assert_eq!(state.notices.len(), 1);
                assert_eq!(state.notices[0].operation, Operation::Delete);
            })
            .then_effects(assertions::assert_has_delay_effect)
            .run();
    }

    #[test]
    fn dismiss_notice_removes_it() {
        let repo = InMemoryTodoRepository::new();
        let mut state = SyncState::new();
        let id = state.push_notice(Operation::Load, "boom");

        ReducerTest::new(SyncReducer::new())
            .with_env(env_for(&repo))
            .given_state(state)
            .when_action(SyncAction::DismissNotice { id })
            .then_state(|state| assert!(state.notices.is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn reload_replaces_mirror_wholesale() {
        let (repo, todos) = seeded(&["A", "B"]).await;
        let env = env_for(&repo);
        let mut state = SyncState {
            mirror: vec![todos[1].clone()],
            ..SyncState::new()
        };

        let effects = reduce(&mut state, SyncAction::Reload, &env);
        let responses = resolve_futures(effects).await;
        assert_eq!(responses, vec![SyncAction::Loaded { todos: todos.clone() }]);

        for response in responses {
            reduce(&mut state, response, &env);
        }
        assert_eq!(state.mirror, todos);
    }

    #[tokio::test]
    async fn add_prepends_server_record() {
        let (repo, todos) = seeded(&["Old"]).await;
        let env = env_for(&repo);
        let mut state = SyncState {
            mirror: todos,
            ..SyncState::new()
        };

        let effects = reduce(
            &mut state,
            SyncAction::Add {
                title: "  New  ".into(),
                description: Some("details".into()),
            },
            &env,
        );
        assert!(state.mirror.len() == 1, "no optimistic insert");

        for response in resolve_futures(effects).await {
            reduce(&mut state, response, &env);
        }
        assert_eq!(state.mirror[0].title, "New");
        assert_eq!(state.mirror[0].description.as_deref(), Some("details"));
        assert_eq!(state.mirror[1].title, "Old");
    }

    #[tokio::test]
    async fn toggle_sends_negated_value_and_takes_server_record() {
        let (repo, todos) = seeded(&["A"]).await;
        let env = env_for(&repo);
        let id = todos[0].id;
        let mut state = SyncState {
            mirror: todos,
            ..SyncState::new()
        };

        let effects = reduce(&mut state, SyncAction::Toggle { id }, &env);
        assert!(!state.mirror[0].completed, "no optimistic flip");

        for response in resolve_futures(effects).await {
            reduce(&mut state, response, &env);
        }
        let stored = repo.get(id).await.unwrap();
        assert!(stored.completed);
        assert_eq!(state.mirror[0], stored);
    }

    #[tokio::test]
    async fn remove_failure_keeps_entry() {
        let (repo, todos) = seeded(&["Keep"]).await;
        let env = env_for(&repo);
        let id = todos[0].id;
        let mut state = SyncState {
            mirror: todos.clone(),
            ..SyncState::new()
        };
        repo.set_failing(true);

        let effects = reduce(&mut state, SyncAction::Remove { id }, &env);
        for response in resolve_futures(effects).await {
            reduce(&mut state, response, &env);
        }

        assert_eq!(state.mirror, todos);
        assert_eq!(state.notices.len(), 1);
        assert_eq!(
            state.notices[0].message,
            "Failed to delete todo: Internal server error"
        );
    }

    #[test]
    fn stale_reload_ticks_are_ignored() {
        let repo = InMemoryTodoRepository::new();
        let env = env_for(&repo);
        let mut state = SyncState::new();

        reduce(&mut state, SyncAction::StartAutoReload, &env);
        reduce(&mut state, SyncAction::StartAutoReload, &env);
        assert_eq!(state.reload_generation, 2);

        let stale = reduce(&mut state, SyncAction::AutoReloadTick { generation: 1 }, &env);
        assertions::assert_no_effects(&stale);

        let live = reduce(&mut state, SyncAction::AutoReloadTick { generation: 2 }, &env);
        assertions::assert_has_future_effect(&live);
        assertions::assert_has_delay_effect(&live);

        reduce(&mut state, SyncAction::StopAutoReload, &env);
        let stopped = reduce(&mut state, SyncAction::AutoReloadTick { generation: 2 }, &env);
        assertions::assert_no_effects(&stopped);
    }
}
