//! Session feature: the single source of truth for "is someone logged in".
//!
//! Every view and the route guard consult this state; it is mutated only
//! through [`SessionAction`] - never written directly by any view.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::SessionAction;
pub use reducer::SessionReducer;
pub use state::{ResolutionPhase, SessionState};
