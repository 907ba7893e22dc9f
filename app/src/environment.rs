//! Application environment.
//!
//! All external dependencies of the view features are carried here and
//! injected into reducers: the backend gateway and the blocking yes/no
//! confirmation prompt shown before mutating transitions.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Blocking yes/no prompt shown before destructive or mutating actions.
///
/// Confirm and cancel have real server-side effects (stock reduction), so
/// they must not fire on a single click. The shell implements this with a
/// modal dialog; tests script the answers.
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask the user to confirm; resolves to `true` on acceptance.
    fn confirm(&self, message: &str) -> impl Future<Output = bool> + Send;
}

/// Prompt that accepts everything; used by the scripted demo.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmationPrompt for AutoConfirm {
    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, "auto-confirming prompt");
        true
    }
}

/// Prompt with pre-scripted answers, recording every question asked.
///
/// Unanswered prompts resolve to `false`: an unscripted confirmation must
/// never trigger a mutation in a test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<bool>>>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    /// Create a prompt with no scripted answers (everything declined).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next question.
    pub fn push_answer(&self, answer: bool) {
        #[allow(clippy::unwrap_used)] // test infrastructure
        self.answers.lock().unwrap().push_back(answer);
    }

    /// The questions asked so far, in order.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        #[allow(clippy::unwrap_used)] // test infrastructure
        self.asked.lock().unwrap().clone()
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> impl Future<Output = bool> + Send {
        let answers = Arc::clone(&self.answers);
        let asked = Arc::clone(&self.asked);
        let message = message.to_string();

        async move {
            #[allow(clippy::unwrap_used)] // test infrastructure
            asked.lock().unwrap().push(message);
            #[allow(clippy::unwrap_used)] // test infrastructure
            let answer = answers.lock().unwrap().pop_front();
            answer.unwrap_or(false)
        }
    }
}

/// Application environment.
///
/// Contains all external dependencies needed by the feature reducers.
///
/// # Type Parameters
///
/// - `B`: backend gateway ([`reserva_api::HttpBackend`] in production,
///   [`reserva_api::MockBackend`] in tests and the demo)
/// - `P`: confirmation prompt
#[derive(Clone)]
pub struct AppEnvironment<B, P>
where
    B: reserva_api::Backend + Clone,
    P: ConfirmationPrompt + Clone,
{
    /// Backend gateway.
    pub api: B,

    /// Confirmation prompt for mutating transitions.
    pub prompt: P,
}

impl<B, P> AppEnvironment<B, P>
where
    B: reserva_api::Backend + Clone,
    P: ConfirmationPrompt + Clone,
{
    /// Create a new application environment.
    #[must_use]
    pub const fn new(api: B, prompt: P) -> Self {
        Self { api, prompt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_prompt_replays_answers_in_order() {
        let prompt = ScriptedPrompt::new();
        prompt.push_answer(true);
        prompt.push_answer(false);

        assert!(prompt.confirm("¿Confirmar?").await);
        assert!(!prompt.confirm("¿Cancelar?").await);
        assert_eq!(prompt.asked(), vec!["¿Confirmar?", "¿Cancelar?"]);
    }

    #[tokio::test]
    async fn unscripted_prompt_declines() {
        let prompt = ScriptedPrompt::new();
        assert!(!prompt.confirm("¿Seguro?").await);
    }
}
