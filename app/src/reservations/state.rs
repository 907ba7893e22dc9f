//! Reservation view state.

use reserva_api::{Reservation, ReservationId, ReservationSummary};

/// Kind of an inline notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A completed operation.
    Success,
    /// A failed operation; the message may be a verbatim server reason.
    Error,
}

/// Transient inline message shown on the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or error.
    pub kind: NoticeKind,
    /// Display text.
    pub message: String,
}

impl Notice {
    /// Build a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Build an error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// State of the "my reservations" list view.
///
/// Owned by this view alone: the detail view fetches its own copy of any
/// reservation, so the two may be transiently inconsistent until each
/// re-fetches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListState {
    /// Fetched summary rows.
    pub rows: Vec<ReservationSummary>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Fetch failure message, if any; cleared when a new fetch starts.
    pub error: Option<String>,
    /// Message carried over from a failed detail fetch; survives the list
    /// refetch the user lands back on.
    pub notice: Option<String>,
}

/// State of the reservation detail view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    /// The reservation this view currently targets; responses for any
    /// other id are stale and discarded.
    pub requested_id: Option<ReservationId>,
    /// The fetched reservation.
    pub reservation: Option<Reservation>,
    /// Whether the initial fetch is in flight.
    pub loading: bool,
    /// Confirm call in flight; disables both transition controls.
    pub confirming: bool,
    /// Cancel call in flight; disables both transition controls.
    pub canceling: bool,
    /// Inline outcome message of the last transition attempt.
    pub notice: Option<Notice>,
}

impl DetailState {
    /// Whether a transition call is currently in flight.
    #[must_use]
    pub const fn busy(&self) -> bool {
        self.confirming || self.canceling
    }

    /// Whether the confirm control is offered and enabled.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        !self.busy()
            && self
                .reservation
                .as_ref()
                .is_some_and(|r| r.status.can_confirm())
    }

    /// Whether the cancel control is offered and enabled.
    ///
    /// Never true for a canceled reservation.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        !self.busy()
            && self
                .reservation
                .as_ref()
                .is_some_and(|r| r.status.can_cancel())
    }
}

/// Combined state of the reservation views.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReservationsState {
    /// The list view.
    pub list: ListState,
    /// The detail view.
    pub detail: DetailState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reserva_api::{CompanyId, CompanyRef, ReservationStatus};

    fn detail_with_status(status: ReservationStatus) -> DetailState {
        DetailState {
            requested_id: Some(ReservationId(42)),
            reservation: Some(Reservation {
                id: ReservationId(42),
                status,
                company: CompanyRef {
                    id: CompanyId(1),
                    name: "La Terraza".to_string(),
                },
                lines: vec![],
                created_at: Utc::now(),
            }),
            ..DetailState::default()
        }
    }

    #[test]
    fn pending_offers_both_transitions() {
        let state = detail_with_status(ReservationStatus::Pending);
        assert!(state.can_confirm());
        assert!(state.can_cancel());
    }

    #[test]
    fn confirmed_offers_only_cancel() {
        let state = detail_with_status(ReservationStatus::Confirmed);
        assert!(!state.can_confirm());
        assert!(state.can_cancel());
    }

    #[test]
    fn canceled_offers_nothing() {
        let state = detail_with_status(ReservationStatus::Canceled);
        assert!(!state.can_confirm());
        assert!(!state.can_cancel());
    }

    #[test]
    fn busy_disables_controls() {
        let mut state = detail_with_status(ReservationStatus::Pending);
        state.confirming = true;
        assert!(!state.can_confirm());
        assert!(!state.can_cancel());
    }
}
