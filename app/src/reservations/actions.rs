//! Reservation view actions.

use reserva_api::{Reservation, ReservationId, ReservationSummary};

/// All inputs to the reservations reducer.
///
/// `*Requested` actions are user/navigation intent; the past-tense actions
/// are produced by the effects they start.
#[derive(Debug, Clone, PartialEq)]
pub enum ReservationsAction {
    // ═══════════════════════════════════════════════════════════════════
    // List view
    // ═══════════════════════════════════════════════════════════════════
    /// Fetch the current user's reservations.
    ListRequested,

    /// The list fetch succeeded.
    ListLoaded {
        /// Summary rows, most recent first.
        rows: Vec<ReservationSummary>,
    },

    /// The list fetch failed.
    ListFailed {
        /// Display message.
        message: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Detail view
    // ═══════════════════════════════════════════════════════════════════
    /// Open the detail view and fetch the reservation.
    DetailRequested {
        /// Reservation to show.
        id: ReservationId,
    },

    /// The detail fetch (initial or post-transition refresh) succeeded.
    DetailLoaded {
        /// The id the fetch was issued for; stale ids are discarded.
        id: ReservationId,
        /// The fetched reservation.
        reservation: Box<Reservation>,
    },

    /// The detail fetch failed; the view surfaces the message and the
    /// application navigates back to the list.
    DetailFailed {
        /// The id the fetch was issued for.
        id: ReservationId,
        /// Display message.
        message: String,
    },

    /// The detail view was left; late responses become stale.
    DetailClosed,

    // ═══════════════════════════════════════════════════════════════════
    // Confirm transition
    // ═══════════════════════════════════════════════════════════════════
    /// Ask the user to confirm the stock-reducing transition.
    ConfirmRequested {
        /// Reservation to confirm.
        id: ReservationId,
    },

    /// The user accepted the prompt; issue the call.
    ConfirmAccepted {
        /// Reservation to confirm.
        id: ReservationId,
    },

    /// The user declined the prompt; nothing happens.
    ConfirmDeclined,

    /// The confirm call succeeded; the authoritative status arrives with
    /// the follow-up re-fetch.
    ConfirmSucceeded {
        /// Confirmed reservation.
        id: ReservationId,
    },

    /// The confirm call failed; state is unchanged.
    ConfirmFailed {
        /// Reservation the call was for.
        id: ReservationId,
        /// Server-provided message verbatim, or a generic fallback.
        message: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Cancel transition
    // ═══════════════════════════════════════════════════════════════════
    /// Ask the user to confirm the cancellation.
    CancelRequested {
        /// Reservation to cancel.
        id: ReservationId,
    },

    /// The user accepted the prompt; issue the call.
    CancelAccepted {
        /// Reservation to cancel.
        id: ReservationId,
    },

    /// The user declined the prompt; nothing happens.
    CancelDeclined,

    /// The cancel call succeeded.
    CancelSucceeded {
        /// Canceled reservation.
        id: ReservationId,
    },

    /// The cancel call failed; state is unchanged.
    CancelFailed {
        /// Reservation the call was for.
        id: ReservationId,
        /// Server-provided message verbatim, or a generic fallback.
        message: String,
    },
}
