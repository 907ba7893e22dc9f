//! Application composition: one state, one action enum, one reducer.
//!
//! The feature reducers stay self-contained; this module routes actions to
//! them and implements the cross-cutting flows none of them can own alone:
//!
//! - the route guard is applied on every navigation and re-applied
//!   whenever session state changes, so protected views are admitted,
//!   deferred, or redirected with a current decision;
//! - view data is fetched when its route is admitted - for protected
//!   routes that sequences every fetch after session resolution;
//! - a successful login stores the identity and returns to the preserved
//!   destination; a failed detail fetch navigates back to the list.

use crate::account::{AccountAction, AccountReducer, AccountState};
use crate::catalog::{CatalogAction, CatalogReducer, CatalogState};
use crate::environment::{AppEnvironment, ConfirmationPrompt};
use crate::reservations::{ReservationsAction, ReservationsReducer, ReservationsState};
use crate::router::{self, GuardDecision, NavigationMode, Route, RouterAction, RouterReducer, RouterState};
use crate::session::{SessionAction, SessionReducer, SessionState};
use reserva_api::Backend;
use reserva_core::effect::Effect;
use reserva_core::reducer::Reducer;
use reserva_core::SmallVec;
use reserva_runtime::Store;

/// Root application state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Process-wide session state.
    pub session: SessionState,
    /// Current route and history.
    pub router: RouterState,
    /// Reservation list and detail views.
    pub reservations: ReservationsState,
    /// Company and product browsing.
    pub catalog: CatalogState,
    /// Login and registration forms.
    pub account: AccountState,
}

/// Root application action.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Session feature action.
    Session(SessionAction),
    /// Router action.
    Router(RouterAction),
    /// Reservations feature action.
    Reservations(ReservationsAction),
    /// Catalog feature action.
    Catalog(CatalogAction),
    /// Account feature action.
    Account(AccountAction),
}

/// The Store type the shell drives.
pub type AppStore<B, P> = Store<AppState, AppAction, AppEnvironment<B, P>, AppReducer<B, P>>;

/// Lift feature effects into app-level effects.
fn lift<A, F>(
    effects: SmallVec<[Effect<A>; 4]>,
    wrap: F,
) -> SmallVec<[Effect<AppAction>; 4]>
where
    A: Send + 'static,
    F: Fn(A) -> AppAction + Send + Sync + Clone + 'static,
{
    effects.into_iter().map(|e| e.map(wrap.clone())).collect()
}

/// Root application reducer.
#[derive(Debug, Clone)]
pub struct AppReducer<B, P> {
    session: SessionReducer<B, P>,
    router: RouterReducer<B, P>,
    reservations: ReservationsReducer<B, P>,
    catalog: CatalogReducer<B, P>,
    account: AccountReducer<B, P>,
}

impl<B, P> Default for AppReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P> AppReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    /// Create a new application reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: SessionReducer::new(),
            router: RouterReducer::new(),
            reservations: ReservationsReducer::new(),
            catalog: CatalogReducer::new(),
            account: AccountReducer::new(),
        }
    }

    /// Apply the route guard to the current route.
    ///
    /// `Loading` defers: nothing renders, nothing fetches, and the next
    /// session change re-applies the guard. `RedirectToLogin` rewrites the
    /// route (replace semantics, preserving the origin). `Allow` starts
    /// the data fetch the route needs.
    fn apply_guard(
        &self,
        state: &mut AppState,
        env: &AppEnvironment<B, P>,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        match router::decide(&state.session, &state.router.current) {
            GuardDecision::Loading => SmallVec::new(),
            GuardDecision::RedirectToLogin { from } => lift(
                self.router.reduce(
                    &mut state.router,
                    RouterAction::RedirectToLogin { from },
                    env,
                ),
                AppAction::Router,
            ),
            GuardDecision::Allow => self.load_route_data(state, env),
        }
    }

    /// Start the fetch the admitted route needs, if it is not already
    /// satisfied.
    fn load_route_data(
        &self,
        state: &mut AppState,
        env: &AppEnvironment<B, P>,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        match state.router.current.clone() {
            Route::Reservations => lift(
                self.reservations.reduce(
                    &mut state.reservations,
                    ReservationsAction::ListRequested,
                    env,
                ),
                AppAction::Reservations,
            ),
            Route::ReservationDetail(id) => {
                if state.reservations.detail.requested_id == Some(id) {
                    return SmallVec::new();
                }
                lift(
                    self.reservations.reduce(
                        &mut state.reservations,
                        ReservationsAction::DetailRequested { id },
                        env,
                    ),
                    AppAction::Reservations,
                )
            }
            Route::Companies => lift(
                self.catalog.reduce(
                    &mut state.catalog,
                    CatalogAction::CompaniesRequested,
                    env,
                ),
                AppAction::Catalog,
            ),
            Route::Products(company) | Route::Reserve(company) => {
                if state.catalog.products_of == Some(company) {
                    return SmallVec::new();
                }
                lift(
                    self.catalog.reduce(
                        &mut state.catalog,
                        CatalogAction::ProductsRequested { company },
                        env,
                    ),
                    AppAction::Catalog,
                )
            }
            Route::Home | Route::Login | Route::Register => SmallVec::new(),
        }
    }
}

impl<B, P> Reducer for AppReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment<B, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Session(action) => {
                // Resolution completing and logout both change what the
                // guard would decide; re-apply it afterwards.
                let reapply_guard = matches!(
                    action,
                    SessionAction::Resolved { .. } | SessionAction::LoggedOut
                );

                let mut effects = lift(
                    self.session.reduce(&mut state.session, action, env),
                    AppAction::Session,
                );
                if reapply_guard {
                    effects.extend(self.apply_guard(state, env));
                }
                effects
            }

            AppAction::Router(action) => {
                let mut effects = lift(
                    self.router.reduce(&mut state.router, action, env),
                    AppAction::Router,
                );

                // Leaving the detail view closes it, so responses still in
                // flight for it become stale and are discarded.
                if !matches!(state.router.current, Route::ReservationDetail(_))
                    && state.reservations.detail.requested_id.is_some()
                {
                    effects.extend(lift(
                        self.reservations.reduce(
                            &mut state.reservations,
                            ReservationsAction::DetailClosed,
                            env,
                        ),
                        AppAction::Reservations,
                    ));
                }

                effects.extend(self.apply_guard(state, env));
                effects
            }

            AppAction::Reservations(action) => {
                let failed_detail = match &action {
                    ReservationsAction::DetailFailed { id, .. } => Some(*id),
                    _ => None,
                };
                let leave_failed_detail = failed_detail
                    .is_some_and(|id| state.router.current == Route::ReservationDetail(id));

                let mut effects = lift(
                    self.reservations
                        .reduce(&mut state.reservations, action, env),
                    AppAction::Reservations,
                );

                // A broken detail view is never rendered: surface the
                // failure and go back to the list.
                if leave_failed_detail {
                    effects.extend(lift(
                        self.router.reduce(
                            &mut state.router,
                            RouterAction::Navigate {
                                to: Route::Reservations,
                                mode: NavigationMode::Replace,
                            },
                            env,
                        ),
                        AppAction::Router,
                    ));
                    effects.extend(self.apply_guard(state, env));
                }
                effects
            }

            AppAction::Catalog(action) => {
                let accepted = match &action {
                    CatalogAction::DraftAccepted { id } => Some(*id),
                    _ => None,
                };

                let mut effects = lift(
                    self.catalog.reduce(&mut state.catalog, action, env),
                    AppAction::Catalog,
                );

                // A freshly created reservation opens its detail view.
                if let Some(id) = accepted {
                    effects.extend(lift(
                        self.router.reduce(
                            &mut state.router,
                            RouterAction::Navigate {
                                to: Route::ReservationDetail(id),
                                mode: NavigationMode::Push,
                            },
                            env,
                        ),
                        AppAction::Router,
                    ));
                    effects.extend(self.apply_guard(state, env));
                }
                effects
            }

            AppAction::Account(action) => {
                let logged_in = match &action {
                    AccountAction::LoginSucceeded { user } => Some(user.clone()),
                    _ => None,
                };
                let registered = matches!(action, AccountAction::RegisterSucceeded);

                let mut effects = lift(
                    self.account.reduce(&mut state.account, action, env),
                    AppAction::Account,
                );

                if let Some(user) = logged_in {
                    // Store the identity, then return to the destination
                    // the guard preserved (or home), replacing the login
                    // entry.
                    effects.extend(lift(
                        self.session.reduce(
                            &mut state.session,
                            SessionAction::LoggedIn { user },
                            env,
                        ),
                        AppAction::Session,
                    ));
                    effects.extend(lift(
                        self.router.reduce(
                            &mut state.router,
                            RouterAction::PostLoginRedirect,
                            env,
                        ),
                        AppAction::Router,
                    ));
                    effects.extend(self.apply_guard(state, env));
                }

                if registered {
                    effects.extend(lift(
                        self.router.reduce(
                            &mut state.router,
                            RouterAction::Navigate {
                                to: Route::Login,
                                mode: NavigationMode::Push,
                            },
                            env,
                        ),
                        AppAction::Router,
                    ));
                }
                effects
            }
        }
    }
}
