//! Reservation lifecycle feature: the "my reservations" list and the
//! reservation detail view with its confirm/cancel transitions.
//!
//! The client never fabricates or locally mutates a reservation status:
//! after a successful transition call the detail is re-fetched, and the
//! displayed status is exactly what the server returned.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::ReservationsAction;
pub use reducer::ReservationsReducer;
pub use state::{DetailState, ListState, Notice, NoticeKind, ReservationsState};
