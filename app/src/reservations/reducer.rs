//! Reservation lifecycle reducer.
//!
//! Implements the transition discipline: a confirm or cancel needs an
//! accepted prompt, sets a per-operation busy flag for the duration of the
//! call, never mutates the status locally, and refreshes the detail from
//! the server only after the mutating call has succeeded.

use crate::environment::{AppEnvironment, ConfirmationPrompt};
use crate::reservations::actions::ReservationsAction;
use crate::reservations::state::{Notice, ReservationsState};
use reserva_api::{ApiError, Backend, ReservationGateway, ReservationId};
use reserva_core::effect::Effect;
use reserva_core::reducer::Reducer;
use reserva_core::{smallvec, SmallVec};

/// Prompt shown before confirming (the transition reduces stock).
const CONFIRM_PROMPT: &str = "¿Confirmar esta reserva? Se reducirá el stock.";

/// Prompt shown before canceling.
const CANCEL_PROMPT: &str = "¿Cancelar esta reserva?";

/// Map a fetch failure to its display message.
///
/// Server-provided reasons pass through verbatim; everything else gets the
/// caller's generic wording. A 401 mid-session surfaces as an expired
/// session rather than a generic failure.
fn fetch_error_message(error: &ApiError, generic: &str) -> String {
    match error {
        ApiError::Rejected { message } => message.clone(),
        ApiError::Unauthenticated => "Sesión expirada. Inicia sesión de nuevo.".to_string(),
        _ => generic.to_string(),
    }
}

/// Map a transition failure to its display message (server reason
/// verbatim, generic fallback otherwise).
fn transition_error_message(error: &ApiError) -> String {
    error
        .server_message()
        .map_or_else(|| "Error desconocido".to_string(), ToString::to_string)
}

/// Reducer for the list and detail reservation views.
#[derive(Debug, Clone)]
pub struct ReservationsReducer<B, P> {
    _phantom: std::marker::PhantomData<(B, P)>,
}

impl<B, P> ReservationsReducer<B, P> {
    /// Create a new reservations reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B, P> Default for ReservationsReducer<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P> ReservationsReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    /// Effect fetching the detail of `id`, feeding back loaded/failed.
    fn fetch_detail_effect(api: B, id: ReservationId) -> Effect<ReservationsAction> {
        Effect::future(async move {
            match api.reservation(id).await {
                Ok(reservation) => Some(ReservationsAction::DetailLoaded {
                    id,
                    reservation: Box::new(reservation),
                }),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "reservation fetch failed");
                    let message = match e {
                        ApiError::NotFound => "Reserva no encontrada".to_string(),
                        other => fetch_error_message(&other, "Error al cargar la reserva"),
                    };
                    Some(ReservationsAction::DetailFailed { id, message })
                }
            }
        })
    }
}

impl<B, P> Reducer for ReservationsReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    type State = ReservationsState;
    type Action = ReservationsAction;
    type Environment = AppEnvironment<B, P>;

    #[allow(clippy::too_many_lines)] // one arm per lifecycle step
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════
            // List view
            // ═══════════════════════════════════════════════════════════
            ReservationsAction::ListRequested => {
                if state.list.loading {
                    return smallvec![Effect::None];
                }
                state.list.loading = true;
                state.list.error = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.my_reservations().await {
                        Ok(rows) => Some(ReservationsAction::ListLoaded { rows }),
                        Err(e) => {
                            tracing::warn!(error = %e, "reservation list fetch failed");
                            Some(ReservationsAction::ListFailed {
                                message: fetch_error_message(&e, "Error al cargar las reservas"),
                            })
                        }
                    }
                })]
            }

            ReservationsAction::ListLoaded { rows } => {
                state.list.loading = false;
                state.list.rows = rows;
                smallvec![Effect::None]
            }

            ReservationsAction::ListFailed { message } => {
                state.list.loading = false;
                state.list.error = Some(message);
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // Detail view
            // ═══════════════════════════════════════════════════════════
            ReservationsAction::DetailRequested { id } => {
                state.detail = crate::reservations::state::DetailState {
                    requested_id: Some(id),
                    loading: true,
                    ..Default::default()
                };

                smallvec![Self::fetch_detail_effect(env.api.clone(), id)]
            }

            ReservationsAction::DetailLoaded { id, reservation } => {
                // A response for a reservation this view no longer shows is
                // stale (the view moved on while the request was in
                // flight); discard it instead of writing to a defunct view.
                if state.detail.requested_id != Some(id) {
                    tracing::debug!(%id, "discarding stale detail response");
                    return smallvec![Effect::None];
                }
                state.detail.loading = false;
                state.detail.reservation = Some(*reservation);
                smallvec![Effect::None]
            }

            ReservationsAction::DetailFailed { id, message } => {
                if state.detail.requested_id != Some(id) {
                    tracing::debug!(%id, "discarding stale detail failure");
                    return smallvec![Effect::None];
                }
                // Never render a partial detail: clear the view and carry
                // the failure over to the list the user lands back on.
                state.detail = Default::default();
                state.list.notice = Some(message);
                smallvec![Effect::None]
            }

            ReservationsAction::DetailClosed => {
                state.detail = Default::default();
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // Confirm transition
            // ═══════════════════════════════════════════════════════════
            ReservationsAction::ConfirmRequested { id } => {
                if !state.detail.can_confirm() || state.detail.requested_id != Some(id) {
                    return smallvec![Effect::None];
                }

                let prompt = env.prompt.clone();
                smallvec![Effect::future(async move {
                    if prompt.confirm(CONFIRM_PROMPT).await {
                        Some(ReservationsAction::ConfirmAccepted { id })
                    } else {
                        Some(ReservationsAction::ConfirmDeclined)
                    }
                })]
            }

            ReservationsAction::ConfirmAccepted { id } => {
                // Repeated clicks while the call is in flight are dropped
                // here, not queued.
                if state.detail.busy() {
                    return smallvec![Effect::None];
                }
                state.detail.confirming = true;
                state.detail.notice = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.confirm(id).await {
                        Ok(()) => Some(ReservationsAction::ConfirmSucceeded { id }),
                        Err(e) => Some(ReservationsAction::ConfirmFailed {
                            id,
                            message: transition_error_message(&e),
                        }),
                    }
                })]
            }

            ReservationsAction::ConfirmDeclined | ReservationsAction::CancelDeclined => {
                smallvec![Effect::None]
            }

            ReservationsAction::ConfirmSucceeded { id } => {
                if state.detail.requested_id != Some(id) {
                    return smallvec![Effect::None];
                }
                state.detail.confirming = false;
                state.detail.notice = Some(Notice::success("Reserva confirmada correctamente"));

                // The displayed status comes from this re-fetch, never from
                // an optimistic local write; it starts only now, after the
                // mutating call's response was observed.
                smallvec![Self::fetch_detail_effect(env.api.clone(), id)]
            }

            ReservationsAction::ConfirmFailed { id, message } => {
                if state.detail.requested_id != Some(id) {
                    return smallvec![Effect::None];
                }
                state.detail.confirming = false;
                state.detail.notice = Some(Notice::error(message));
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // Cancel transition
            // ═══════════════════════════════════════════════════════════
            ReservationsAction::CancelRequested { id } => {
                if !state.detail.can_cancel() || state.detail.requested_id != Some(id) {
                    return smallvec![Effect::None];
                }

                let prompt = env.prompt.clone();
                smallvec![Effect::future(async move {
                    if prompt.confirm(CANCEL_PROMPT).await {
                        Some(ReservationsAction::CancelAccepted { id })
                    } else {
                        Some(ReservationsAction::CancelDeclined)
                    }
                })]
            }

            ReservationsAction::CancelAccepted { id } => {
                if state.detail.busy() {
                    return smallvec![Effect::None];
                }
                state.detail.canceling = true;
                state.detail.notice = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.cancel(id).await {
                        Ok(()) => Some(ReservationsAction::CancelSucceeded { id }),
                        Err(e) => Some(ReservationsAction::CancelFailed {
                            id,
                            message: transition_error_message(&e),
                        }),
                    }
                })]
            }

            ReservationsAction::CancelSucceeded { id } => {
                if state.detail.requested_id != Some(id) {
                    return smallvec![Effect::None];
                }
                state.detail.canceling = false;
                state.detail.notice = Some(Notice::success("Reserva cancelada correctamente"));

                smallvec![Self::fetch_detail_effect(env.api.clone(), id)]
            }

            ReservationsAction::CancelFailed { id, message } => {
                if state.detail.requested_id != Some(id) {
                    return smallvec![Effect::None];
                }
                state.detail.canceling = false;
                state.detail.notice = Some(Notice::error(message));
                smallvec![Effect::None]
            }
        }
    }
}
