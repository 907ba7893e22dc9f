//! Session state types.

use reserva_api::User;

/// Progress of the one-shot initial session resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPhase {
    /// Process started; `Initialize` has not been dispatched yet.
    #[default]
    Idle,
    /// The who-am-I call is in flight.
    Resolving,
    /// Resolution finished (with or without a user). Terminal: the phase
    /// never leaves this state, so `loading` becomes false exactly once.
    Resolved,
}

/// Process-wide authentication state.
///
/// # Examples
///
/// ```
/// # use reserva_app::session::SessionState;
/// let state = SessionState::default();
/// assert!(state.user.is_none());
/// assert!(state.loading());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Current identity; `None` means unauthenticated.
    pub user: Option<User>,

    /// Initial-resolution phase.
    pub phase: ResolutionPhase,
}

impl SessionState {
    /// Whether the initial session resolution is still outstanding.
    ///
    /// True from process start until resolution completes; the route guard
    /// must treat this as its own visual state, distinct from "denied".
    #[must_use]
    pub const fn loading(&self) -> bool {
        !matches!(self.phase, ResolutionPhase::Resolved)
    }

    /// Whether someone is logged in.
    #[must_use]
    pub const fn authenticated(&self) -> bool {
        self.user.is_some()
    }
}
