//! # Reserva Runtime
//!
//! Runtime implementation for the Reserva client architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling for the single-page-application core.
//!
//! ## Core Components
//!
//! - **Store**: owns state, runs the reducer, executes effects
//! - **Effect Executor**: executes effect descriptions and feeds produced
//!   actions back into the reducer
//! - **Subscriptions**: a `watch` channel carrying state snapshots (the
//!   shell redraws whenever state changes) and a `broadcast` channel
//!   carrying every effect-produced action (request/response waiting)
//!
//! ## Example
//!
//! ```ignore
//! use reserva_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action and wait for its effect chain to settle
//! store.send(Action::Initialize).await.wait().await;
//!
//! // Read state
//! let logged_in = store.state(|s| s.session.user.is_some()).await;
//! ```

use reserva_core::{effect::Effect, reducer::Reducer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Timeout waiting for a terminal action or for effect completion
        #[error("Timeout waiting for action")]
        Timeout,

        /// The action broadcast channel closed, typically because the store
        /// was dropped
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Tracks outstanding async work spawned by one `send` call.
///
/// The counter covers the transitive effect chain: when an effect produces
/// an action, the actions own effects are tracked under the same counter,
/// so `EffectHandle::wait` observes full quiescence.
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn new() -> (Self, watch::Receiver<()>) {
        let (tx, rx) = watch::channel(());
        (
            Self {
                counter: Arc::new(AtomicUsize::new(0)),
                notifier: tx,
            },
            rx,
        )
    }

    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
        let _ = self.notifier.send(());
    }

    fn pending(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

/// RAII guard that decrements the effect counter on drop.
///
/// Ensures the counter is decremented even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Handle returned by [`Store::send`] for waiting on effect completion.
///
/// `send` returns after starting effect execution, not after completion.
/// Use this handle when a test or scripted flow needs the whole effect
/// chain (including feedback actions) to settle.
pub struct EffectHandle {
    tracking: EffectTracking,
    done_rx: watch::Receiver<()>,
}

impl EffectHandle {
    /// Wait until all effects spawned by the originating `send` (and their
    /// feedback actions) have completed.
    pub async fn wait(mut self) {
        while self.tracking.pending() > 0 {
            if self.done_rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for effect completion with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the effects are still running
    /// when the timeout elapses.
    pub async fn wait_with_timeout(self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer execution (serialized at the write lock)
/// 3. Effect execution with the action feedback loop
/// 4. State snapshots and action broadcast for observers
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
    reducer: R,
    environment: E,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// Only effect-produced actions are broadcast, not the actions handed
    /// to `send` directly; observers use this to wait for the terminal
    /// action of a request/response flow.
    action_broadcast: broadcast::Sender<A>,
    /// State snapshot channel; a new snapshot is published after every
    /// reducer run so shells can redraw on change.
    state_watch: watch::Sender<S>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment.
    ///
    /// The action broadcast capacity defaults to 16; use
    /// [`Store::with_broadcast_capacity`] if observers frequently lag.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new store with a custom action broadcast capacity.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);
        let (state_watch, _) = watch::channel(initial_state.clone());

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            action_broadcast,
            state_watch,
        }
    }

    /// Send an action to the store.
    ///
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with `(state, action, environment)`
    /// 3. Publishes a state snapshot to subscribers
    /// 4. Executes returned effects asynchronously
    ///
    /// Effects may produce more actions, which re-enter this loop with the
    /// same tracking, so the returned [`EffectHandle`] covers the whole
    /// chain. Multiple concurrent `send` calls serialize at the reducer.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> EffectHandle {
        let (tracking, done_rx) = EffectTracking::new();
        self.send_tracked(action, tracking.clone()).await;
        EffectHandle { tracking, done_rx }
    }

    /// Send an action and wait for a matching result action.
    ///
    /// Designed for request/response flows: subscribe to the action
    /// broadcast BEFORE sending (avoids the race where the terminal action
    /// fires between send and subscribe), send the initial action, then
    /// return the first effect-produced action matching the predicate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: timeout expired before a match
    /// - [`StoreError::ChannelClosed`]: the store was dropped
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut rx = self.action_broadcast.subscribe();

        self.send(action).await;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Slow consumer; if the terminal action was dropped
                        // the timeout catches it.
                        tracing::warn!(skipped, "action observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    }
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to all actions produced by effects.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Subscribe to state snapshots.
    ///
    /// The receiver holds the latest snapshot; `changed().await` resolves
    /// whenever a reducer run publishes a new one. This is the redraw
    /// signal for shells: recompute the view (including the route guard
    /// decision) from each snapshot.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<S> {
        self.state_watch.subscribe()
    }

    /// Read current state via a closure.
    ///
    /// ```ignore
    /// let count = store.state(|s| s.reservations.list.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Run the reducer for one action and start its effects under the
    /// given tracking.
    async fn send_tracked(&self, action: A, tracking: EffectTracking) {
        let effects = {
            let mut state = self.state.write().await;
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            // Publish while still holding the lock so snapshots are ordered.
            let _ = self.state_watch.send(state.clone());
            effects
        };

        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }
    }

    /// Execute one effect under the given tracking.
    ///
    /// - `None`: no-op
    /// - `Future`: spawns the computation; a produced action is broadcast
    ///   and fed back into the reducer under the same tracking
    /// - `Delay`: waits, then dispatches the action
    /// - `Parallel`: starts all sub-effects concurrently
    /// - `Sequential`: runs sub-effects in order, waiting for each
    ///   sub-effect chain to settle before starting the next
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                tracing::trace!("executing Effect::None (no-op)");
            }
            Effect::Future(fut) => {
                tracing::trace!("executing Effect::Future");
                tracking.increment();

                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking.clone());

                    if let Some(action) = fut.await {
                        store.dispatch_produced(action, tracking.clone()).await;
                    } else {
                        tracing::trace!("Effect::Future completed with no action");
                    }
                });
            }
            Effect::Delay { duration, action } => {
                tracing::trace!(?duration, "executing Effect::Delay");
                tracking.increment();

                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking.clone());

                    tokio::time::sleep(duration).await;
                    store.dispatch_produced(*action, tracking.clone()).await;
                });
            }
            Effect::Parallel(effects) => {
                tracing::trace!(count = effects.len(), "executing Effect::Parallel");
                for effect in effects {
                    self.execute_effect(effect, tracking.clone());
                }
            }
            Effect::Sequential(effects) => {
                tracing::trace!(count = effects.len(), "executing Effect::Sequential");
                tracking.increment();

                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking.clone());

                    for effect in effects {
                        let (sub_tracking, mut sub_rx) = EffectTracking::new();
                        store.execute_effect(effect, sub_tracking.clone());

                        // Wait for this sub-chain to settle before the next
                        // effect starts; this is the ordering guarantee that
                        // mutate-then-refetch flows rely on.
                        while sub_tracking.pending() > 0 {
                            if sub_rx.changed().await.is_err() {
                                break;
                            }
                        }
                    }
                });
            }
        }
    }

    /// Broadcast an effect-produced action and feed it back into the
    /// reducer under the same tracking.
    async fn dispatch_produced(&self, action: A, tracking: EffectTracking) {
        let _ = self.action_broadcast.send(action.clone());
        self.send_tracked(action, tracking).await;
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            action_broadcast: self.action_broadcast.clone(),
            state_watch: self.state_watch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserva_core::{smallvec, SmallVec};
    use std::time::Duration;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TestState {
        count: i32,
        log: Vec<&'static str>,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        StartChain,
        ChainDone,
        OrderedPair,
        First,
        Second,
        DelayedIncrement,
    }

    #[derive(Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                }
                TestAction::StartChain => {
                    smallvec![Effect::future(async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Some(TestAction::ChainDone)
                    })]
                }
                TestAction::ChainDone => {
                    state.count += 100;
                    smallvec![Effect::None]
                }
                TestAction::OrderedPair => {
                    smallvec![Effect::Sequential(vec![
                        Effect::future(async {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Some(TestAction::First)
                        }),
                        Effect::future(async { Some(TestAction::Second) }),
                    ])]
                }
                TestAction::First => {
                    state.log.push("first");
                    smallvec![Effect::None]
                }
                TestAction::Second => {
                    state.log.push("second");
                    smallvec![Effect::None]
                }
                TestAction::DelayedIncrement => {
                    smallvec![Effect::Delay {
                        duration: Duration::from_millis(5),
                        action: Box::new(TestAction::Increment),
                    }]
                }
            }
        }
    }

    #[tokio::test]
    async fn send_runs_reducer_synchronously() {
        let store = Store::new(TestState::default(), TestReducer, ());

        store.send(TestAction::Increment).await;

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn wait_covers_feedback_chain() {
        let store = Store::new(TestState::default(), TestReducer, ());

        store.send(TestAction::StartChain).await.wait().await;

        assert_eq!(store.state(|s| s.count).await, 100);
    }

    #[tokio::test]
    async fn sequential_effects_preserve_order() {
        let store = Store::new(TestState::default(), TestReducer, ());

        store.send(TestAction::OrderedPair).await.wait().await;

        // The slow first effect settles (including its feedback action)
        // before the second starts.
        assert_eq!(store.state(|s| s.log.clone()).await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn send_and_wait_for_matches_terminal_action() {
        let store = Store::new(TestState::default(), TestReducer, ());

        let result = store
            .send_and_wait_for(
                TestAction::StartChain,
                |a| matches!(a, TestAction::ChainDone),
                Duration::from_secs(1),
            )
            .await;

        assert!(matches!(result, Ok(TestAction::ChainDone)));
    }

    #[tokio::test]
    async fn state_subscription_sees_updates() {
        let store = Store::new(TestState::default(), TestReducer, ());
        let mut rx = store.subscribe_state();

        store.send(TestAction::Increment).await;

        rx.changed().await.ok();
        assert_eq!(rx.borrow().count, 1);
    }

    #[tokio::test]
    async fn delay_dispatches_after_the_duration() {
        let store = Store::new(TestState::default(), TestReducer, ());

        store.send(TestAction::DelayedIncrement).await.wait().await;

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn wait_with_timeout_times_out() {
        let store = Store::new(TestState::default(), TestReducer, ());

        let handle = store.send(TestAction::StartChain).await;
        let result = handle.wait_with_timeout(Duration::from_micros(1)).await;

        assert!(matches!(result, Err(StoreError::Timeout)));
    }
}
