//! Session reducer.

use crate::environment::{AppEnvironment, ConfirmationPrompt};
use crate::session::actions::SessionAction;
use crate::session::state::{ResolutionPhase, SessionState};
use reserva_api::{AuthGateway, Backend};
use reserva_core::effect::Effect;
use reserva_core::reducer::Reducer;
use reserva_core::{smallvec, SmallVec};

/// Reducer for the process-wide session state.
#[derive(Debug, Clone)]
pub struct SessionReducer<B, P> {
    _phantom: std::marker::PhantomData<(B, P)>,
}

impl<B, P> SessionReducer<B, P> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B, P> Default for SessionReducer<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P> Reducer for SessionReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = AppEnvironment<B, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Initialize => {
                // One-shot: a duplicate Initialize (double mount, replayed
                // action) must not re-enter loading after resolution.
                if !matches!(state.phase, ResolutionPhase::Idle) {
                    tracing::debug!("duplicate Initialize ignored");
                    return smallvec![Effect::None];
                }
                state.phase = ResolutionPhase::Resolving;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.resolve_session().await {
                        Ok(user) => Some(SessionAction::Resolved { user: Some(user) }),
                        Err(e) => {
                            // Logged out is the expected cold-start outcome;
                            // nothing is surfaced to the user here.
                            tracing::debug!(error = %e, "session resolution failed, treating as logged out");
                            Some(SessionAction::Resolved { user: None })
                        }
                    }
                })]
            }

            SessionAction::Resolved { user } => {
                // A resolution landing after the phase moved on (it can
                // only happen with replayed actions) must not overwrite a
                // session established by login.
                if !matches!(state.phase, ResolutionPhase::Resolving) {
                    tracing::debug!("stale Resolved ignored");
                    return smallvec![Effect::None];
                }
                state.user = user;
                state.phase = ResolutionPhase::Resolved;
                smallvec![Effect::None]
            }

            SessionAction::LoggedIn { user } => {
                state.user = Some(user);
                smallvec![Effect::None]
            }

            SessionAction::Logout => {
                if state.user.is_none() {
                    return smallvec![Effect::None];
                }

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    // The outcome is deliberately ignored: the user's
                    // intent is to leave, and local state must clear even
                    // when the invalidation call fails.
                    if let Err(e) = api.logout().await {
                        tracing::warn!(error = %e, "logout call failed; clearing local session anyway");
                    }
                    Some(SessionAction::LoggedOut)
                })]
            }

            SessionAction::LoggedOut => {
                state.user = None;
                smallvec![Effect::None]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ScriptedPrompt;
    use reserva_api::{MockBackend, User, UserId};
    use reserva_testing::{assertions, ReducerTest};

    fn user() -> User {
        User {
            id: UserId(1),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            email: "a@b.com".to_string(),
        }
    }

    fn env() -> AppEnvironment<MockBackend, ScriptedPrompt> {
        AppEnvironment::new(MockBackend::new(), ScriptedPrompt::new())
    }

    #[test]
    fn initialize_enters_resolving_and_starts_the_call() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState::default())
            .when_action(SessionAction::Initialize)
            .then_state(|state| {
                assert!(state.loading());
                assert_eq!(state.phase, ResolutionPhase::Resolving);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn duplicate_initialize_is_ignored() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: None,
                phase: ResolutionPhase::Resolved,
            })
            .when_action(SessionAction::Initialize)
            .then_state(|state| {
                // Loading must never revert to true after resolution.
                assert!(!state.loading());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failed_resolution_resolves_to_logged_out() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: None,
                phase: ResolutionPhase::Resolving,
            })
            .when_action(SessionAction::Resolved { user: None })
            .then_state(|state| {
                assert!(!state.loading());
                assert!(!state.authenticated());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn resolution_with_user_authenticates() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: None,
                phase: ResolutionPhase::Resolving,
            })
            .when_action(SessionAction::Resolved { user: Some(user()) })
            .then_state(|state| {
                assert!(!state.loading());
                assert!(state.authenticated());
            })
            .run();
    }

    #[test]
    fn stale_resolution_does_not_overwrite_login() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: Some(user()),
                phase: ResolutionPhase::Resolved,
            })
            .when_action(SessionAction::Resolved { user: None })
            .then_state(|state| {
                assert!(state.authenticated());
            })
            .run();
    }

    #[test]
    fn logged_in_stores_identity_without_touching_phase() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: None,
                phase: ResolutionPhase::Resolved,
            })
            .when_action(SessionAction::LoggedIn { user: user() })
            .then_state(|state| {
                assert!(state.authenticated());
                assert!(!state.loading());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn logout_starts_invalidation_and_logged_out_clears() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: Some(user()),
                phase: ResolutionPhase::Resolved,
            })
            .when_action(SessionAction::Logout)
            .then_state(|state| {
                // Cleared on LoggedOut, not optimistically here.
                assert!(state.authenticated());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();

        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: Some(user()),
                phase: ResolutionPhase::Resolved,
            })
            .when_action(SessionAction::LoggedOut)
            .then_state(|state| {
                assert!(!state.authenticated());
            })
            .run();
    }

    #[test]
    fn logout_without_session_is_a_no_op() {
        ReducerTest::new(SessionReducer::new())
            .with_env(env())
            .given_state(SessionState {
                user: None,
                phase: ResolutionPhase::Resolved,
            })
            .when_action(SessionAction::Logout)
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
