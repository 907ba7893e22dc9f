//! # Reserva App
//!
//! The single-page-application core of the Reserva reservation
//! marketplace: session management, route guarding, and the reservation
//! lifecycle views, composed as reducers over one application state.
//!
//! ## Architecture
//!
//! ```text
//! AppAction → AppReducer → (AppState, Effects) → Store → more AppActions
//! ```
//!
//! The shell (whatever renders the views) drives the [`app::AppStore`]:
//! it sends actions for user intent and redraws from the state snapshots
//! the store publishes. The route guard decision is part of every
//! snapshot, derived by [`router::decide`].
//!
//! ## Example: cold start
//!
//! ```no_run
//! use reserva_app::app::{AppAction, AppReducer, AppState};
//! use reserva_app::environment::{AppEnvironment, AutoConfirm};
//! use reserva_app::session::SessionAction;
//! use reserva_api::HttpBackend;
//! use reserva_runtime::Store;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = HttpBackend::new("http://localhost:8000", Duration::from_secs(10))?;
//! let env = AppEnvironment::new(backend, AutoConfirm);
//! let store = Store::new(AppState::default(), AppReducer::new(), env);
//!
//! // Resolve the session before any protected view renders.
//! store.send(AppAction::Session(SessionAction::Initialize)).await.wait().await;
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod account;
pub mod app;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod reservations;
pub mod router;
pub mod session;

// Re-export main types for convenience
pub use app::{AppAction, AppReducer, AppState, AppStore};
pub use config::Config;
pub use environment::{AppEnvironment, AutoConfirm, ConfirmationPrompt, ScriptedPrompt};
pub use router::{decide, GuardDecision, NavigationMode, Route, RouterAction};
