//! # Reserva Core
//!
//! Core traits and types for the Reserva client architecture.
//!
//! The Reserva frontend is built as a unidirectional data flow: every view
//! feature (session, router, reservations, catalog) is a reducer over owned
//! state, and all I/O is described as effect values executed by the Store
//! runtime in `reserva-runtime`.
//!
//! ## Core Concepts
//!
//! - **State**: owned, `Clone`-able domain state for a feature
//! - **Action**: all possible inputs to a reducer (user intent and the
//!   results of async operations)
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: side-effect descriptions (not execution)
//! - **Environment**: injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use reserva_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for SessionReducer {
//!     type State = SessionState;
//!     type Action = SessionAction;
//!     type Environment = SessionEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SessionState,
//!         action: SessionAction,
//!         env: &SessionEnvironment,
//!     ) -> SmallVec<[Effect<SessionAction>; 4]> {
//!         // Business logic goes here
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the core trait for view and feature logic
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They contain all state-transition logic and are deterministic and
/// testable without any runtime.
pub mod reducer {
    use super::effect::Effect;
    use super::SmallVec;

    /// The Reducer trait - core abstraction for feature logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: the feature state this reducer operates on
    /// - `Action`: the action type this reducer processes
    /// - `Environment`: the injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the runtime
        ///
        /// Effects may resolve to further actions, which are fed back into
        /// this same function by the Store.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side-effect descriptions
///
/// Effects describe side effects to be performed by the runtime. They are
/// values (not execution) and are composable: `Parallel` for concurrent
/// execution, `Sequential` for strict ordering.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: the action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects in order; a later effect does not start until the
        /// earlier one (including the actions it produced) has completed
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for debounce and scripted flows)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back
        /// into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async computation as an effect
        ///
        /// Convenience constructor so reducers can write
        /// `Effect::future(async move { ... })` instead of spelling out the
        /// pin-box dance at every call site.
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Lift this effect into a parent action type
        ///
        /// Feature reducers return effects over their own action type; the
        /// application reducer wraps them into the app-level action enum
        /// with this.
        pub fn map<Parent, F>(self, f: F) -> Effect<Parent>
        where
            Action: Send + 'static,
            Parent: Send + 'static,
            F: Fn(Action) -> Parent + Send + Sync + Clone + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => Effect::Parallel(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Sequential(effects) => Effect::Sequential(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => {
                    Effect::Future(Box::pin(async move { fut.await.map(f) }))
                }
            }
        }
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected via
/// the Environment parameter, so reducers run at memory speed in tests.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Fixed clock for deterministic tests
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        /// The instant this clock always reports
        pub time: DateTime<Utc>,
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, FixedClock, SystemClock};
    use super::reducer::Reducer;
    use super::{smallvec, SmallVec};

    #[derive(Clone, Debug, Default)]
    struct CounterState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum CounterAction {
        Increment,
        Incremented,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::future(async { Some(CounterAction::Incremented) })]
                }
                CounterAction::Incremented => smallvec![Effect::None],
            }
        }
    }

    #[test]
    fn reducer_updates_state_and_returns_effects() {
        let mut state = CounterState::default();
        let effects = CounterReducer.reduce(&mut state, CounterAction::Increment, &());

        assert_eq!(state.count, 1);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Future(_)));
    }

    #[test]
    fn effect_future_resolves_to_action() {
        let effect: Effect<CounterAction> =
            Effect::future(async { Some(CounterAction::Incremented) });

        let Effect::Future(fut) = effect else {
            unreachable!("constructed a Future effect");
        };
        let action = tokio_test::block_on(fut);
        assert!(matches!(action, Some(CounterAction::Incremented)));
    }

    #[test]
    fn effect_debug_formatting() {
        let effect: Effect<CounterAction> = Effect::Parallel(vec![Effect::None]);
        assert_eq!(format!("{effect:?}"), "Effect::Parallel([Effect::None])");
    }

    #[test]
    fn merge_builds_parallel() {
        let effect: Effect<CounterAction> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(effect, Effect::Parallel(v) if v.len() == 2));
    }

    #[test]
    fn chain_builds_sequential() {
        let effect: Effect<CounterAction> = Effect::chain(vec![Effect::None]);
        assert!(matches!(effect, Effect::Sequential(v) if v.len() == 1));
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ParentAction {
        Counter(i32),
    }

    #[test]
    fn map_lifts_future_actions() {
        let effect: Effect<i32> = Effect::future(async { Some(7) });
        let mapped: Effect<ParentAction> = effect.map(ParentAction::Counter);

        let Effect::Future(fut) = mapped else {
            unreachable!("map preserves the Future variant");
        };
        assert_eq!(tokio_test::block_on(fut), Some(ParentAction::Counter(7)));
    }

    #[test]
    fn map_recurses_into_sequential() {
        let effect: Effect<i32> = Effect::Sequential(vec![
            Effect::future(async { Some(1) }),
            Effect::None,
        ]);
        let mapped = effect.map(ParentAction::Counter);
        assert!(matches!(mapped, Effect::Sequential(v) if v.len() == 2));
    }

    #[test]
    fn fixed_clock_is_deterministic() {
        let time = chrono::Utc::now();
        let clock = FixedClock { time };
        assert_eq!(clock.now(), time);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
