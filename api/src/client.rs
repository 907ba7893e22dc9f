//! Backend gateway traits.
//!
//! The view features never talk HTTP directly; they depend on these traits
//! through their environment, so reducer tests and the demo binary can run
//! against the in-memory mock while production injects [`crate::HttpBackend`].

use crate::error::Result;
use crate::types::{
    Company, CompanyId, Credentials, NewReservation, Product, Registration, Reservation,
    ReservationId, ReservationSummary, User,
};
use std::future::Future;

/// Session and account operations.
pub trait AuthGateway: Send + Sync {
    /// Resolve the current session from the backend ("who am I").
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthenticated` when no session cookie is present or it
    /// has expired; transport and decode failures otherwise. During the
    /// initial resolution, callers treat every failure as "logged out".
    fn resolve_session(&self) -> impl Future<Output = Result<User>> + Send;

    /// Log in with email and password.
    ///
    /// The caller stores the returned identity via the session feature;
    /// this call only performs the transport.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthenticated` on wrong credentials or a stale CSRF
    /// token; `ApiError::Rejected` with the server message on validation
    /// failure.
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<User>> + Send;

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// `ApiError::Rejected` carrying the first validation message when the
    /// form is refused.
    fn register(&self, registration: &Registration) -> impl Future<Output = Result<()>> + Send;

    /// Invalidate the server-side session.
    ///
    /// # Errors
    ///
    /// Transport failures; callers clear local session state regardless of
    /// the outcome (fail-open on logout).
    fn logout(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Company and product browsing.
pub trait CatalogGateway: Send + Sync {
    /// List all companies.
    ///
    /// # Errors
    ///
    /// Transport and decode failures.
    fn companies(&self) -> impl Future<Output = Result<Vec<Company>>> + Send;

    /// List the products of one company.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` for an unknown company; transport and decode
    /// failures otherwise.
    fn products(&self, company: CompanyId) -> impl Future<Output = Result<Vec<Product>>> + Send;
}

/// Reservation queries and lifecycle transitions.
pub trait ReservationGateway: Send + Sync {
    /// Fetch one reservation with its line items.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` when the reservation does not exist or is not
    /// visible to the current user; `ApiError::Unauthenticated` without a
    /// session.
    fn reservation(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Reservation>> + Send;

    /// List the current user's reservations as flat summaries.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthenticated` without a session; transport and decode
    /// failures otherwise.
    fn my_reservations(&self) -> impl Future<Output = Result<Vec<ReservationSummary>>> + Send;

    /// Confirm a pending reservation; the server reduces stock.
    ///
    /// The new status is NOT reported back; callers must re-fetch, because
    /// the server is the sole authority on whether the transition was
    /// legal.
    ///
    /// # Errors
    ///
    /// `ApiError::Rejected` with the server message (e.g. stock changed
    /// concurrently); `ApiError::NotFound` for an unknown reservation.
    fn confirm(&self, id: ReservationId) -> impl Future<Output = Result<()>> + Send;

    /// Cancel a pending or confirmed reservation.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ReservationGateway::confirm`].
    fn cancel(&self, id: ReservationId) -> impl Future<Output = Result<()>> + Send;

    /// Create a reservation; returns the new identifier.
    ///
    /// # Errors
    ///
    /// `ApiError::Rejected` with the server message when the request is
    /// refused (e.g. insufficient stock).
    fn create(
        &self,
        request: &NewReservation,
    ) -> impl Future<Output = Result<ReservationId>> + Send;
}

/// The full backend surface the application environment carries.
///
/// Blanket-implemented for any type providing all three gateways
/// ([`crate::HttpBackend`] in production, [`crate::MockBackend`] in tests).
pub trait Backend: AuthGateway + CatalogGateway + ReservationGateway {}

impl<T> Backend for T where T: AuthGateway + CatalogGateway + ReservationGateway {}
