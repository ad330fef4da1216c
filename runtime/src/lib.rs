//! # Shopfront Runtime
//!
//! The [`Store`] owns the application state and is the only place where
//! reducers run.
//!
//! ## Guarantees
//!
//! - **Serialized mutation**: each [`Store::send`] applies its reducer under an
//!   exclusive lock, so exactly one reducer invocation happens at a time and
//!   the state is a deterministic fold over the order in which actions were
//!   applied
//! - **Concurrent reads**: [`Store::state`] takes a shared lock; any number of
//!   selector calls may run at once
//! - **Observable action stream**: every applied action is broadcast to
//!   [`Store::subscribe_actions`] receivers after the reducer has run
//!
//! ## Example
//!
//! ```ignore
//! use shopfront_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use shopfront_core::{SmallVec, effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// A task join error occurred while waiting for effects
        ///
        /// This typically means a spawned effect panicked.
        #[error("Effect task failed: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),

        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,
    }
}

pub use error::StoreError;

/// Default capacity of the action broadcast channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Handle for the effects started by one [`Store::send`]
///
/// Waiting on it also waits for the effects of every action those effects
/// fed back into the store.
#[derive(Debug)]
#[must_use = "effects keep running in the background unless awaited"]
pub struct EffectHandle {
    task: Option<JoinHandle<()>>,
}

impl EffectHandle {
    /// A handle with nothing to wait for
    pub const fn completed() -> Self {
        Self { task: None }
    }

    /// Returns true if the reducer produced no effects to run
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.task.is_none()
    }

    /// Wait for all effects to complete
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskJoinError`] if an effect panicked.
    pub async fn wait(self) -> Result<(), StoreError> {
        if let Some(task) = self.task {
            task.await?;
        }
        Ok(())
    }
}

/// The Store - runtime for reducers
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
    shutdown: Arc<AtomicBool>,
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Sync + Clone + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create a new store whose action stream buffers `capacity` actions per
    /// subscriber
    ///
    /// Slow subscribers that fall further behind skip the oldest actions.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity.max(1));

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            shutdown: Arc::new(AtomicBool::new(false)),
            action_broadcast,
        }
    }

    /// Send an action to the store
    ///
    /// The reducer runs before this returns. Effects it produced are started
    /// in the background; actions they yield are fed back through the reducer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::SeqCst) {
            tracing::warn!(?action, "Rejecting action, store is shutting down");
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = self.apply(action).await;
        if effects.iter().all(|effect| matches!(effect, Effect::None)) {
            return Ok(EffectHandle::completed());
        }

        let store = self.clone();
        let task = tokio::spawn(async move { store.run_effects(effects).await });

        Ok(EffectHandle { task: Some(task) })
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let loading = store.state(|s| selectors::loading(&s.customers)).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Subscribe to the stream of applied actions
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Stop accepting actions
    ///
    /// Effects already running finish, but the actions they yield are dropped.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            tracing::info!("Store shutting down");
        }
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    async fn apply(&self, action: A) -> SmallVec<[Effect<A>; 4]> {
        let effects = {
            let mut state = self.state.write().await;
            self.reducer
                .reduce(&mut state, action.clone(), &self.environment)
        };

        tracing::trace!(?action, effects = effects.len(), "Reduced action");

        // No receivers is not an error
        let _ = self.action_broadcast.send(action);

        effects
    }

    async fn run_effects(&self, effects: SmallVec<[Effect<A>; 4]>) {
        join_all(effects.into_iter().map(|effect| self.run_effect(effect))).await;
    }

    fn run_effect(&self, effect: Effect<A>) -> BoxFuture<'static, ()> {
        let store = self.clone();

        async move {
            match effect {
                Effect::None => {},
                Effect::Future(future) => {
                    let Some(action) = future.await else {
                        tracing::trace!("Effect::Future completed with no action");
                        return;
                    };
                    if store.is_shutting_down() {
                        tracing::warn!(?action, "Dropping effect action, store is shutting down");
                        return;
                    }
                    let effects = store.apply(action).await;
                    store.run_effects(effects).await;
                },
                Effect::Parallel(effects) => {
                    join_all(effects.into_iter().map(|effect| store.run_effect(effect))).await;
                },
                Effect::Sequential(effects) => {
                    for effect in effects {
                        store.run_effect(effect).await;
                    }
                },
            }
        }
        .boxed()
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            shutdown: Arc::clone(&self.shutdown),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}
