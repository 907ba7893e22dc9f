//! Client-side routing and the route guard.
//!
//! The guard is a pure function of session state and the requested route;
//! it has no state of its own. The application reducer applies it on every
//! navigation and re-applies it whenever session state changes, so its
//! decision is always current.

use crate::environment::{AppEnvironment, ConfirmationPrompt};
use crate::session::SessionState;
use reserva_api::{Backend, CompanyId, ReservationId};
use reserva_core::effect::Effect;
use reserva_core::reducer::Reducer;
use reserva_core::{smallvec, SmallVec};

/// Maximum retained history entries; older ones fall off the back.
const HISTORY_LIMIT: usize = 32;

/// The client-side routing surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Landing page (`/`).
    #[default]
    Home,
    /// Login form (`/login`).
    Login,
    /// Registration form (`/register`).
    Register,
    /// Company listing (`/companies`).
    Companies,
    /// Products of one company (`/products/:id`).
    Products(CompanyId),
    /// Reservation form over one company's products
    /// (`/products/:id/reserve`).
    Reserve(CompanyId),
    /// The current user's reservations (`/reservations`, protected).
    Reservations,
    /// One reservation with line items (`/reservations/:id`, protected).
    ReservationDetail(ReservationId),
}

impl Route {
    /// Whether this route requires an authenticated session.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Reservations | Self::ReservationDetail(_))
    }

    /// The path this route renders at.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Companies => "/companies".to_string(),
            Self::Products(company) => format!("/products/{}", company.0),
            Self::Reserve(company) => format!("/products/{}/reserve", company.0),
            Self::Reservations => "/reservations".to_string(),
            Self::ReservationDetail(id) => format!("/reservations/{id}"),
        }
    }

    /// Parse a path into a route.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            [""] => Some(Self::Home),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["companies"] => Some(Self::Companies),
            ["products", id] => id.parse().ok().map(|id| Self::Products(CompanyId(id))),
            ["products", id, "reserve"] => {
                id.parse().ok().map(|id| Self::Reserve(CompanyId(id)))
            }
            ["reservations"] => Some(Self::Reservations),
            ["reservations", id] => id
                .parse()
                .ok()
                .map(|id| Self::ReservationDetail(ReservationId(id))),
            _ => None,
        }
    }
}

/// The route guard decision for one requested route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session resolution is still in flight: render a neutral loading
    /// indicator and nothing else. No premature redirect, no premature
    /// content.
    Loading,
    /// Unauthenticated on a protected route: redirect to the login entry
    /// point, replacing the current history entry and preserving the
    /// originally requested route for post-login return.
    RedirectToLogin {
        /// The route the user actually asked for.
        from: Route,
    },
    /// Render the requested view unchanged.
    Allow,
}

/// Pure route-guard function.
///
/// Public routes always render. Protected routes render only once the
/// session has resolved with a user; "resolution in flight" is its own
/// visual state, distinct from "denied".
#[must_use]
pub fn decide(session: &SessionState, requested: &Route) -> GuardDecision {
    if !requested.is_protected() {
        return GuardDecision::Allow;
    }
    if session.loading() {
        return GuardDecision::Loading;
    }
    if session.authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLogin {
            from: requested.clone(),
        }
    }
}

/// History semantics of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Push the previous route onto the history stack.
    Push,
    /// Replace the current entry; back-navigation skips it.
    Replace,
}

/// Router state: the current route plus bounded history bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouterState {
    /// The route currently rendered (or guarded).
    pub current: Route,
    /// Back stack, most recent last.
    pub history: Vec<Route>,
    /// Original destination preserved across a guard redirect, consumed by
    /// the post-login redirect.
    pub return_to: Option<Route>,
}

/// Router actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterAction {
    /// Navigate to a route.
    Navigate {
        /// Destination.
        to: Route,
        /// Push or replace.
        mode: NavigationMode,
    },
    /// Guard-driven redirect to the login entry point; replaces the
    /// current entry so back-navigation does not loop into the guard.
    RedirectToLogin {
        /// The originally requested route.
        from: Route,
    },
    /// Leave the login page after a successful login, returning to the
    /// preserved destination (or home).
    PostLoginRedirect,
    /// Pop the history stack.
    Back,
}

/// Reducer owning all router state transitions.
///
/// Pure bookkeeping; it never consults session state itself - the
/// application reducer feeds it the guard's decisions.
#[derive(Debug, Clone)]
pub struct RouterReducer<B, P> {
    _phantom: std::marker::PhantomData<(B, P)>,
}

impl<B, P> RouterReducer<B, P> {
    /// Create a new router reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B, P> Default for RouterReducer<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P> Reducer for RouterReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    type State = RouterState;
    type Action = RouterAction;
    type Environment = AppEnvironment<B, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RouterAction::Navigate { to, mode } => {
                if to == state.current {
                    return smallvec![Effect::None];
                }
                if matches!(mode, NavigationMode::Push) {
                    state.history.push(state.current.clone());
                    if state.history.len() > HISTORY_LIMIT {
                        state.history.remove(0);
                    }
                }
                tracing::debug!(from = %state.current.path(), to = %to.path(), "navigate");
                state.current = to;
                smallvec![Effect::None]
            }

            RouterAction::RedirectToLogin { from } => {
                tracing::debug!(from = %from.path(), "guard redirect to login");
                state.return_to = Some(from);
                // Replace: the guarded route never becomes a history entry.
                state.current = Route::Login;
                smallvec![Effect::None]
            }

            RouterAction::PostLoginRedirect => {
                let destination = state.return_to.take().unwrap_or_default();
                tracing::debug!(to = %destination.path(), "post-login redirect");
                state.current = destination;
                smallvec![Effect::None]
            }

            RouterAction::Back => {
                state.current = state.history.pop().unwrap_or_default();
                smallvec![Effect::None]
            }
        }
    }
}
