//! In-memory mock backend for tests and the demo binary.
//!
//! Behaves like the real backend as far as the view features can observe:
//! auth-gated reservation endpoints, server-authoritative lifecycle
//! transitions, verbatim rejection messages, and summaries projected from
//! the stored reservations.

use crate::client::{AuthGateway, CatalogGateway, ReservationGateway};
use crate::error::{ApiError, Result};
use crate::types::{
    Company, CompanyId, Credentials, NewReservation, Product, Registration, Reservation,
    ReservationId, ReservationStatus, ReservationSummary, User,
};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Internal mutable state of the mock.
#[derive(Debug, Default)]
struct MockState {
    /// Currently authenticated user, as the server would see it.
    session_user: Option<User>,
    /// Registered accounts: email → (password, user).
    accounts: HashMap<String, (String, User)>,
    companies: Vec<Company>,
    products: Vec<Product>,
    reservations: HashMap<u64, Reservation>,
    next_reservation_id: u64,
    /// Message to reject the next confirm call with.
    confirm_rejection: Option<String>,
    /// Error to fail the next matching call with (one-shot).
    fail_next: Option<ApiError>,
    confirm_calls: usize,
    cancel_calls: usize,
    logout_calls: usize,
}

/// Mock backend.
///
/// Uses in-memory storage; cheap to clone, all clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create an empty mock backend with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)] // test infrastructure; a poisoned lock is a failed test
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Seed an already-authenticated session.
    #[must_use]
    pub fn with_session(self, user: User) -> Self {
        self.lock().session_user = Some(user);
        self
    }

    /// Seed an account that [`AuthGateway::login`] will accept.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, user: User) -> Self {
        self.lock()
            .accounts
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    /// Seed a company.
    #[must_use]
    pub fn with_company(self, company: Company) -> Self {
        self.lock().companies.push(company);
        self
    }

    /// Seed a product.
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        self.lock().products.push(product);
        self
    }

    /// Seed a reservation.
    #[must_use]
    pub fn with_reservation(self, reservation: Reservation) -> Self {
        let mut state = self.lock();
        state.next_reservation_id = state.next_reservation_id.max(reservation.id.0 + 1);
        state.reservations.insert(reservation.id.0, reservation);
        drop(state);
        self
    }

    /// Reject the next confirm call with the given message.
    pub fn reject_next_confirm(&self, message: &str) {
        self.lock().confirm_rejection = Some(message.to_string());
    }

    /// Fail the next call with the given error (one-shot, any endpoint).
    pub fn fail_next(&self, error: ApiError) {
        self.lock().fail_next = Some(error);
    }

    /// Current status of a stored reservation (server-side view).
    #[must_use]
    pub fn reservation_status(&self, id: ReservationId) -> Option<ReservationStatus> {
        self.lock().reservations.get(&id.0).map(|r| r.status)
    }

    /// Number of confirm calls received.
    #[must_use]
    pub fn confirm_calls(&self) -> usize {
        self.lock().confirm_calls
    }

    /// Number of cancel calls received.
    #[must_use]
    pub fn cancel_calls(&self) -> usize {
        self.lock().cancel_calls
    }

    /// Number of logout calls received.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.lock().logout_calls
    }

    fn take_failure(state: &mut MockState) -> Result<()> {
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn require_session(state: &MockState) -> Result<()> {
        if state.session_user.is_some() {
            Ok(())
        } else {
            Err(ApiError::Unauthenticated)
        }
    }

    fn summarize(reservation: &Reservation) -> ReservationSummary {
        ReservationSummary {
            id: reservation.id,
            company_name: reservation.company.name.clone(),
            product_summary: reservation
                .lines
                .first()
                .map(|line| line.product.name.clone()),
            item_count: u32::try_from(reservation.lines.len()).unwrap_or(u32::MAX),
            total: reservation.total(),
            date: reservation.created_at.format("%d/%m/%Y").to_string(),
            status: reservation.status,
        }
    }
}

impl AuthGateway for MockBackend {
    fn resolve_session(&self) -> impl Future<Output = Result<User>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;
            state.session_user.clone().ok_or(ApiError::Unauthenticated)
        }
    }

    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<User>> + Send {
        let state = Arc::clone(&self.state);
        let credentials = credentials.clone();

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;

            match state.accounts.get(&credentials.email) {
                Some((password, user)) if *password == credentials.password => {
                    let user = user.clone();
                    state.session_user = Some(user.clone());
                    Ok(user)
                }
                _ => Err(ApiError::Unauthenticated),
            }
        }
    }

    fn register(&self, registration: &Registration) -> impl Future<Output = Result<()>> + Send {
        let state = Arc::clone(&self.state);
        let registration = registration.clone();

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;

            if registration.password != registration.password_confirmation {
                return Err(ApiError::Rejected {
                    message: "Las contraseñas no coinciden".to_string(),
                });
            }
            if state.accounts.contains_key(&registration.email) {
                return Err(ApiError::Rejected {
                    message: "El correo ya está registrado".to_string(),
                });
            }

            let id = state.accounts.len() as u64 + 1;
            let user = User {
                id: crate::types::UserId(id),
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email.clone(),
            };
            state
                .accounts
                .insert(registration.email, (registration.password, user));
            Ok(())
        }
    }

    fn logout(&self) -> impl Future<Output = Result<()>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            state.logout_calls += 1;
            // The session is invalidated even when the call is set up to
            // fail; matches a server that drops the session before the
            // response is lost.
            state.session_user = None;
            Self::take_failure(&mut state)
        }
    }
}

impl CatalogGateway for MockBackend {
    fn companies(&self) -> impl Future<Output = Result<Vec<Company>>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;
            Ok(state.companies.clone())
        }
    }

    fn products(&self, company: CompanyId) -> impl Future<Output = Result<Vec<Product>>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;

            if !state.companies.iter().any(|c| c.id == company) {
                return Err(ApiError::NotFound);
            }
            Ok(state
                .products
                .iter()
                .filter(|p| p.company_id == company)
                .cloned()
                .collect())
        }
    }
}

impl ReservationGateway for MockBackend {
    fn reservation(&self, id: ReservationId) -> impl Future<Output = Result<Reservation>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;
            Self::require_session(&state)?;
            state
                .reservations
                .get(&id.0)
                .cloned()
                .ok_or(ApiError::NotFound)
        }
    }

    fn my_reservations(&self) -> impl Future<Output = Result<Vec<ReservationSummary>>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;
            Self::require_session(&state)?;

            let mut rows: Vec<ReservationSummary> =
                state.reservations.values().map(Self::summarize).collect();
            rows.sort_by_key(|row| std::cmp::Reverse(row.id.0));
            Ok(rows)
        }
    }

    fn confirm(&self, id: ReservationId) -> impl Future<Output = Result<()>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            state.confirm_calls += 1;
            Self::take_failure(&mut state)?;
            Self::require_session(&state)?;

            if let Some(message) = state.confirm_rejection.take() {
                return Err(ApiError::Rejected { message });
            }

            let reservation = state
                .reservations
                .get_mut(&id.0)
                .ok_or(ApiError::NotFound)?;

            if !reservation.status.can_confirm() {
                return Err(ApiError::Rejected {
                    message: "La reserva no se puede confirmar".to_string(),
                });
            }

            reservation.status = ReservationStatus::Confirmed;
            Ok(())
        }
    }

    fn cancel(&self, id: ReservationId) -> impl Future<Output = Result<()>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            state.cancel_calls += 1;
            Self::take_failure(&mut state)?;
            Self::require_session(&state)?;

            let reservation = state
                .reservations
                .get_mut(&id.0)
                .ok_or(ApiError::NotFound)?;

            if !reservation.status.can_cancel() {
                return Err(ApiError::Rejected {
                    message: "La reserva ya está cancelada".to_string(),
                });
            }

            reservation.status = ReservationStatus::Canceled;
            Ok(())
        }
    }

    fn create(&self, request: &NewReservation) -> impl Future<Output = Result<ReservationId>> + Send {
        let state = Arc::clone(&self.state);
        let request = request.clone();

        async move {
            #[allow(clippy::unwrap_used)]
            let mut state = state.lock().unwrap();
            Self::take_failure(&mut state)?;
            Self::require_session(&state)?;

            let company = state
                .companies
                .iter()
                .find(|c| c.id == request.company_id)
                .ok_or(ApiError::NotFound)?
                .clone();

            let mut lines = Vec::with_capacity(request.items.len());
            for item in &request.items {
                let product = state
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .ok_or(ApiError::NotFound)?;

                if item.quantity == 0 || item.quantity > product.stock {
                    return Err(ApiError::Rejected {
                        message: "Stock insuficiente".to_string(),
                    });
                }

                lines.push(crate::types::LineItem {
                    product: crate::types::ProductRef {
                        id: product.id,
                        name: product.name.clone(),
                    },
                    quantity: item.quantity,
                    unit_price: product.unit_price,
                });
            }

            state.next_reservation_id += 1;
            let id = state.next_reservation_id;
            let reservation = Reservation {
                id: ReservationId(id),
                status: ReservationStatus::Pending,
                company: crate::types::CompanyRef {
                    id: company.id,
                    name: company.name,
                },
                lines,
                created_at: Utc::now(),
            };
            state.reservations.insert(id, reservation);
            Ok(ReservationId(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    fn user() -> User {
        User {
            id: UserId(1),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            email: "a@b.com".to_string(),
        }
    }

    fn pending_reservation(id: u64) -> Reservation {
        Reservation {
            id: ReservationId(id),
            status: ReservationStatus::Pending,
            company: crate::types::CompanyRef {
                id: CompanyId(1),
                name: "La Terraza".to_string(),
            },
            lines: vec![crate::types::LineItem {
                product: crate::types::ProductRef {
                    id: crate::types::ProductId(1),
                    name: "Paella".to_string(),
                },
                quantity: 2,
                unit_price: 10.0,
            }],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn resolve_session_without_cookie_is_unauthenticated() {
        let backend = MockBackend::new();
        assert_eq!(
            backend.resolve_session().await,
            Err(ApiError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn login_sets_session() {
        let backend = MockBackend::new().with_account("a@b.com", "secret", user());

        let logged_in = backend
            .login(&Credentials {
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(logged_in.email, "a@b.com");
        assert!(backend.resolve_session().await.is_ok());
    }

    #[tokio::test]
    async fn reservation_endpoints_require_session() {
        let backend = MockBackend::new().with_reservation(pending_reservation(42));

        assert_eq!(
            backend.reservation(ReservationId(42)).await,
            Err(ApiError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn confirm_transitions_server_state() {
        let backend = MockBackend::new()
            .with_session(user())
            .with_reservation(pending_reservation(42));

        backend.confirm(ReservationId(42)).await.unwrap();

        assert_eq!(
            backend.reservation_status(ReservationId(42)),
            Some(ReservationStatus::Confirmed)
        );
    }

    #[tokio::test]
    async fn cancel_after_cancel_is_rejected() {
        let backend = MockBackend::new()
            .with_session(user())
            .with_reservation(pending_reservation(42));

        backend.cancel(ReservationId(42)).await.unwrap();
        let err = backend.cancel(ReservationId(42)).await.unwrap_err();

        assert!(matches!(err, ApiError::Rejected { .. }));
    }

    #[tokio::test]
    async fn rejected_confirm_leaves_status_unchanged() {
        let backend = MockBackend::new()
            .with_session(user())
            .with_reservation(pending_reservation(42));
        backend.reject_next_confirm("Stock insuficiente");

        let err = backend.confirm(ReservationId(42)).await.unwrap_err();

        assert_eq!(err.server_message(), Some("Stock insuficiente"));
        assert_eq!(
            backend.reservation_status(ReservationId(42)),
            Some(ReservationStatus::Pending)
        );
    }

    #[tokio::test]
    async fn create_allocates_ids_and_prices_lines() {
        let backend = MockBackend::new()
            .with_session(user())
            .with_company(Company {
                id: CompanyId(1),
                name: "La Terraza".to_string(),
                description: None,
            })
            .with_product(Product {
                id: crate::types::ProductId(3),
                company_id: CompanyId(1),
                name: "Paella".to_string(),
                unit_price: 12.5,
                stock: 4,
            });

        let id = backend
            .create(&NewReservation {
                company_id: CompanyId(1),
                items: vec![crate::types::NewReservationItem {
                    product_id: crate::types::ProductId(3),
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        let reservation = backend.reservation(id).await.unwrap();
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert!((reservation.total() - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn create_rejects_over_stock() {
        let backend = MockBackend::new()
            .with_session(user())
            .with_company(Company {
                id: CompanyId(1),
                name: "La Terraza".to_string(),
                description: None,
            })
            .with_product(Product {
                id: crate::types::ProductId(3),
                company_id: CompanyId(1),
                name: "Paella".to_string(),
                unit_price: 12.5,
                stock: 1,
            });

        let err = backend
            .create(&NewReservation {
                company_id: CompanyId(1),
                items: vec![crate::types::NewReservationItem {
                    product_id: crate::types::ProductId(3),
                    quantity: 2,
                }],
            })
            .await
            .unwrap_err();

        assert_eq!(err.server_message(), Some("Stock insuficiente"));
    }
}
