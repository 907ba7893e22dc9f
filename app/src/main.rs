//! Scripted walkthrough of the Reserva application core.
//!
//! Drives the full flow against the in-memory mock backend: cold start,
//! guarded navigation, login with post-login return, reservation detail,
//! confirm and cancel transitions, logout. Run with
//! `RESERVA_LOG_LEVEL=debug` to watch the reducers work.

use chrono::Utc;
use reserva_api::{
    Company, CompanyId, CompanyRef, LineItem, MockBackend, Product, ProductId, ProductRef,
    Reservation, ReservationId, ReservationStatus, User, UserId,
};
use reserva_app::app::{AppAction, AppReducer, AppState};
use reserva_app::environment::{AppEnvironment, AutoConfirm};
use reserva_app::reservations::ReservationsAction;
use reserva_app::router::{NavigationMode, Route, RouterAction};
use reserva_app::session::SessionAction;
use reserva_app::Config;
use reserva_runtime::Store;
use tracing_subscriber::EnvFilter;

fn seeded_backend() -> MockBackend {
    MockBackend::new()
        .with_account(
            "a@b.com",
            "secret",
            User {
                id: UserId(1),
                first_name: "Ana".to_string(),
                last_name: "García".to_string(),
                email: "a@b.com".to_string(),
            },
        )
        .with_company(Company {
            id: CompanyId(1),
            name: "La Terraza".to_string(),
            description: Some("Cocina mediterránea".to_string()),
        })
        .with_product(Product {
            id: ProductId(3),
            company_id: CompanyId(1),
            name: "Paella".to_string(),
            unit_price: 10.0,
            stock: 5,
        })
        .with_reservation(Reservation {
            id: ReservationId(42),
            status: ReservationStatus::Pending,
            company: CompanyRef {
                id: CompanyId(1),
                name: "La Terraza".to_string(),
            },
            lines: vec![LineItem {
                product: ProductRef {
                    id: ProductId(3),
                    name: "Paella".to_string(),
                },
                quantity: 2,
                unit_price: 10.0,
            }],
            created_at: Utc::now(),
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .init();

    println!("=== Reserva walkthrough ===\n");

    let env = AppEnvironment::new(seeded_backend(), AutoConfirm);
    let store = Store::new(AppState::default(), AppReducer::new(), env);

    // Cold start: resolve the session before anything renders.
    store
        .send(AppAction::Session(SessionAction::Initialize))
        .await
        .wait()
        .await;
    let logged_in = store.state(|s| s.session.authenticated()).await;
    println!("session resolved, authenticated: {logged_in}");

    // Protected navigation without a session: the guard redirects.
    store
        .send(AppAction::Router(RouterAction::Navigate {
            to: Route::Reservations,
            mode: NavigationMode::Push,
        }))
        .await
        .wait()
        .await;
    let (current, return_to) = store
        .state(|s| (s.router.current.path(), s.router.return_to.clone()))
        .await;
    println!("navigated to /reservations → now at {current} (return to {return_to:?})");

    // Log in; the router returns to the preserved destination.
    store
        .send(AppAction::Account(
            reserva_app::account::AccountAction::LoginSubmitted {
                credentials: reserva_api::Credentials {
                    email: "a@b.com".to_string(),
                    password: "secret".to_string(),
                },
            },
        ))
        .await
        .wait()
        .await;
    let (current, rows) = store
        .state(|s| (s.router.current.path(), s.reservations.list.rows.len()))
        .await;
    println!("logged in → back at {current} with {rows} reservation(s)");

    // Open the detail view.
    store
        .send(AppAction::Router(RouterAction::Navigate {
            to: Route::ReservationDetail(ReservationId(42)),
            mode: NavigationMode::Push,
        }))
        .await
        .wait()
        .await;
    store
        .state(|s| {
            if let Some(r) = &s.reservations.detail.reservation {
                println!(
                    "reserva #{} · {} · {} · total {:.2}€",
                    r.id,
                    r.company.name,
                    r.status,
                    r.total()
                );
            }
        })
        .await;

    // Confirm (the AutoConfirm prompt accepts); the status shown afterwards
    // is the re-fetched one.
    store
        .send(AppAction::Reservations(
            ReservationsAction::ConfirmRequested {
                id: ReservationId(42),
            },
        ))
        .await
        .wait()
        .await;
    let status = store
        .state(|s| {
            s.reservations
                .detail
                .reservation
                .as_ref()
                .map(|r| r.status.to_string())
        })
        .await;
    println!("after confirm: {}", status.unwrap_or_default());

    // Cancel is still offered on a confirmed reservation.
    store
        .send(AppAction::Reservations(
            ReservationsAction::CancelRequested {
                id: ReservationId(42),
            },
        ))
        .await
        .wait()
        .await;
    let (status, can_cancel) = store
        .state(|s| {
            (
                s.reservations
                    .detail
                    .reservation
                    .as_ref()
                    .map(|r| r.status.to_string()),
                s.reservations.detail.can_cancel(),
            )
        })
        .await;
    println!(
        "after cancel: {} (cancel still offered: {can_cancel})",
        status.unwrap_or_default()
    );

    // Log out; the guard pushes the protected view back to login.
    store
        .send(AppAction::Session(SessionAction::Logout))
        .await
        .wait()
        .await;
    let current = store.state(|s| s.router.current.path()).await;
    println!("logged out → now at {current}");

    println!("\n=== Walkthrough complete ===");
    Ok(())
}
