//! # Reserva Testing
//!
//! Testing utilities for the Reserva client architecture.
//!
//! This crate provides the [`ReducerTest`] Given/When/Then harness and
//! assertion helpers for effects. Reducers are pure functions, so every
//! feature of the application core can be tested at memory speed without a
//! Store or a backend.
//!
//! ## Example
//!
//! ```ignore
//! use reserva_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(SessionReducer)
//!     .with_env(test_environment())
//!     .given_state(SessionState::default())
//!     .when_action(SessionAction::Initialize)
//!     .then_state(|state| assert!(state.loading()))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};
