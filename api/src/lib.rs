//! # Reserva API
//!
//! Backend gateway for the Reserva client: domain types, the REST wire
//! contract, the error taxonomy, gateway traits, the production HTTP
//! transport, and an in-memory mock for tests.
//!
//! ## Architecture
//!
//! View features depend on the gateway traits through their environment;
//! they never see HTTP. The wire contract (Spanish field names, integer
//! status codes, `{success, message}` envelopes) stays inside this crate.
//!
//! ```text
//! reducer → Effect::Future(env.api.confirm(id)) → ApiError | ()
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use reserva_api::{AuthGateway, HttpBackend};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), reserva_api::ApiError> {
//! let backend = HttpBackend::new("https://reserva.example.com", Duration::from_secs(10))?;
//! match backend.resolve_session().await {
//!     Ok(user) => println!("hola, {}", user.first_name),
//!     Err(e) if e.is_unauthenticated() => println!("logged out"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod wire;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use client::{AuthGateway, Backend, CatalogGateway, ReservationGateway};
pub use error::{ApiError, Result};
pub use http::HttpBackend;
pub use types::{
    Company, CompanyId, CompanyRef, Credentials, LineItem, NewReservation, NewReservationItem,
    Product, ProductId, ProductRef, Registration, Reservation, ReservationId, ReservationStatus,
    ReservationSummary, User, UserId,
};

#[cfg(feature = "test-utils")]
pub use mocks::MockBackend;
