//! Session actions.

use reserva_api::User;

/// All inputs to the session reducer.
///
/// `Initialize` and `Logout` are user/process intent; `Resolved` and
/// `LoggedOut` are the results of the async calls they start. `LoggedIn`
/// is a pure state write invoked by the login flow after its own transport
/// call succeeded - authentication transport is decoupled from state
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Start the one-shot initial session resolution.
    Initialize,

    /// The who-am-I call finished. `user: None` covers every failure mode
    /// (no cookie, expired session, network error) - an expected outcome,
    /// not a reported error.
    Resolved {
        /// The resolved identity, if any.
        user: Option<User>,
    },

    /// An external login call succeeded; store the identity.
    LoggedIn {
        /// The authenticated user.
        user: User,
    },

    /// Invalidate the server-side session and clear local state.
    Logout,

    /// The invalidation call finished (either way); local state clears
    /// unconditionally - logout fails open.
    LoggedOut,
}
