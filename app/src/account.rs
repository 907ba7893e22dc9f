//! Account feature: the login and registration forms.
//!
//! Owns the transport of authentication: the login effect performs the
//! backend call and, on success, hands the identity to the session feature
//! through the application reducer. Session state itself is never written
//! here.

use crate::environment::{AppEnvironment, ConfirmationPrompt};
use reserva_api::{ApiError, AuthGateway, Backend, Credentials, Registration, User};
use reserva_core::effect::Effect;
use reserva_core::reducer::Reducer;
use reserva_core::{smallvec, SmallVec};

/// Feedback line under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFeedback {
    /// The submission succeeded.
    Success(String),
    /// The submission failed.
    Error(String),
}

/// State of the login and registration forms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountState {
    /// Login call in flight.
    pub logging_in: bool,
    /// Feedback under the login form.
    pub login_feedback: Option<FormFeedback>,
    /// Register call in flight.
    pub registering: bool,
    /// Feedback under the registration form.
    pub register_feedback: Option<FormFeedback>,
}

/// All inputs to the account reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountAction {
    /// Submit the login form.
    LoginSubmitted {
        /// Form contents.
        credentials: Credentials,
    },
    /// The login call succeeded.
    LoginSucceeded {
        /// The authenticated user.
        user: User,
    },
    /// The login call failed.
    LoginFailed {
        /// Display message.
        message: String,
    },
    /// Submit the registration form.
    RegisterSubmitted {
        /// Form contents.
        registration: Registration,
    },
    /// The registration call succeeded; the user proceeds to login.
    RegisterSucceeded,
    /// The registration call failed.
    RegisterFailed {
        /// First validation message, server error, or a generic fallback.
        message: String,
    },
}

/// Map a login failure to its display message.
fn login_error_message(error: &ApiError) -> String {
    match error {
        ApiError::Unauthenticated => "Credenciales incorrectas".to_string(),
        ApiError::Rejected { message } => message.clone(),
        _ => "Error de login".to_string(),
    }
}

/// Reducer for the login and registration forms.
#[derive(Debug, Clone)]
pub struct AccountReducer<B, P> {
    _phantom: std::marker::PhantomData<(B, P)>,
}

impl<B, P> AccountReducer<B, P> {
    /// Create a new account reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B, P> Default for AccountReducer<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P> Reducer for AccountReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    type State = AccountState;
    type Action = AccountAction;
    type Environment = AppEnvironment<B, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AccountAction::LoginSubmitted { credentials } => {
                if state.logging_in {
                    return smallvec![Effect::None];
                }
                state.logging_in = true;
                state.login_feedback = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.login(&credentials).await {
                        Ok(user) => Some(AccountAction::LoginSucceeded { user }),
                        Err(e) => {
                            tracing::debug!(error = %e, "login failed");
                            Some(AccountAction::LoginFailed {
                                message: login_error_message(&e),
                            })
                        }
                    }
                })]
            }

            AccountAction::LoginSucceeded { .. } => {
                state.logging_in = false;
                state.login_feedback =
                    Some(FormFeedback::Success("Login correcto".to_string()));
                smallvec![Effect::None]
            }

            AccountAction::LoginFailed { message } => {
                state.logging_in = false;
                state.login_feedback = Some(FormFeedback::Error(message));
                smallvec![Effect::None]
            }

            AccountAction::RegisterSubmitted { registration } => {
                if state.registering {
                    return smallvec![Effect::None];
                }
                state.registering = true;
                state.register_feedback = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.register(&registration).await {
                        Ok(()) => Some(AccountAction::RegisterSucceeded),
                        Err(e) => {
                            let message = match e {
                                ApiError::Rejected { message } => message,
                                _ => "Error al registrar usuario".to_string(),
                            };
                            Some(AccountAction::RegisterFailed { message })
                        }
                    }
                })]
            }

            AccountAction::RegisterSucceeded => {
                state.registering = false;
                state.register_feedback = None;
                smallvec![Effect::None]
            }

            AccountAction::RegisterFailed { message } => {
                state.registering = false;
                state.register_feedback = Some(FormFeedback::Error(message));
                smallvec![Effect::None]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ScriptedPrompt;
    use reserva_api::MockBackend;
    use reserva_testing::{assertions, ReducerTest};

    fn env() -> AppEnvironment<MockBackend, ScriptedPrompt> {
        AppEnvironment::new(MockBackend::new(), ScriptedPrompt::new())
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn login_submit_sets_busy_and_calls_backend() {
        ReducerTest::new(AccountReducer::new())
            .with_env(env())
            .given_state(AccountState::default())
            .when_action(AccountAction::LoginSubmitted {
                credentials: credentials(),
            })
            .then_state(|state| {
                assert!(state.logging_in);
                assert!(state.login_feedback.is_none());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn double_submit_is_dropped() {
        let state = AccountState {
            logging_in: true,
            ..Default::default()
        };

        ReducerTest::new(AccountReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(AccountAction::LoginSubmitted {
                credentials: credentials(),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn wrong_credentials_surface_as_credential_error() {
        assert_eq!(
            login_error_message(&ApiError::Unauthenticated),
            "Credenciales incorrectas"
        );
        assert_eq!(
            login_error_message(&ApiError::Transport("refused".to_string())),
            "Error de login"
        );
    }

    #[test]
    fn login_failure_reenables_form() {
        ReducerTest::new(AccountReducer::new())
            .with_env(env())
            .given_state(AccountState {
                logging_in: true,
                ..Default::default()
            })
            .when_action(AccountAction::LoginFailed {
                message: "Credenciales incorrectas".to_string(),
            })
            .then_state(|state| {
                assert!(!state.logging_in);
                assert_eq!(
                    state.login_feedback,
                    Some(FormFeedback::Error("Credenciales incorrectas".to_string()))
                );
            })
            .run();
    }

    #[test]
    fn register_failure_surfaces_first_message() {
        ReducerTest::new(AccountReducer::new())
            .with_env(env())
            .given_state(AccountState {
                registering: true,
                ..Default::default()
            })
            .when_action(AccountAction::RegisterFailed {
                message: "El correo ya está registrado".to_string(),
            })
            .then_state(|state| {
                assert!(!state.registering);
                assert_eq!(
                    state.register_feedback,
                    Some(FormFeedback::Error(
                        "El correo ya está registrado".to_string()
                    ))
                );
            })
            .run();
    }
}
