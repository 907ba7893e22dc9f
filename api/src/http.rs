//! HTTP implementation of the backend gateways.
//!
//! Speaks JSON over HTTP against the reservation backend, credentialed via
//! a cookie-based session held in a shared cookie store. CSRF priming
//! (`GET /sanctum/csrf-cookie`, then an `X-XSRF-TOKEN` header derived from
//! the URL-decoded `XSRF-TOKEN` cookie) runs before **every** mutating
//! call, uniformly.

use crate::client::{AuthGateway, CatalogGateway, ReservationGateway};
use crate::error::{ApiError, Result};
use crate::types::{
    Company, CompanyId, Credentials, NewReservation, Product, Registration, Reservation,
    ReservationId, ReservationSummary, User,
};
use crate::wire::{
    CreateReservationItem, CreateReservationRequest, EmpresaDto, ErrorBody, LoginRequest,
    MutationResponse, ProductoDto, RegisterRequest, ReservasEnvelope, ReservationEnvelope,
    UsuarioEnvelope,
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;

/// Name of the CSRF cookie the backend issues.
const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header carrying the CSRF token back on mutating requests.
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// HTTP backend gateway.
///
/// Cheap to clone; the `reqwest` client, connection pool, and cookie store
/// are shared.
///
/// # Example
///
/// ```no_run
/// use reserva_api::HttpBackend;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), reserva_api::ApiError> {
/// let backend = HttpBackend::new("https://reserva.example.com", Duration::from_secs(10))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpBackend {
    base: Url,
    http: Client,
    cookies: Arc<Jar>,
}

impl HttpBackend {
    /// Create a backend gateway against the given base URL.
    ///
    /// # Errors
    ///
    /// `ApiError::Config` when the base URL does not parse or the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ApiError::Config(e.to_string()))?;
        let cookies = Arc::new(Jar::default());

        let http = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            base,
            http,
            cookies,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Config(e.to_string()))
    }

    /// Prime the CSRF cookie and read the token to echo back as a header.
    ///
    /// The original frontend primed only before login/register; the
    /// session-cookie scheme wants it before any mutating call, so it runs
    /// uniformly here.
    async fn csrf_token(&self) -> Result<String> {
        let url = self.url("/sanctum/csrf-cookie")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Transport(format!(
                "csrf priming returned {}",
                response.status()
            )));
        }

        let header = self
            .cookies
            .cookies(&self.base)
            .ok_or_else(|| ApiError::Decode("no cookies after csrf priming".to_string()))?;
        let raw = header
            .to_str()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        // The Cookie header is "name=value; name2=value2"; the token value
        // is URL-encoded by the backend.
        raw.split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == XSRF_COOKIE)
            .map(|(_, value)| urlencoding::decode(value).map(|v| v.into_owned()))
            .transpose()
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .ok_or_else(|| ApiError::Decode("XSRF-TOKEN cookie missing".to_string()))
    }

    /// GET a JSON resource.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    /// POST a JSON body after CSRF priming; returns the checked response.
    async fn post_raw<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let token = self.csrf_token().await?;
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .header(XSRF_HEADER, token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::ensure_success(response).await
    }

    /// POST a JSON body after CSRF priming and decode the JSON response.
    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.post_raw(path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Map error status codes to the taxonomy; pass successes through.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthenticated),
            // 419 is the backend's "CSRF token mismatch / session expired"
            s if s.as_u16() == 419 => Err(ApiError::Unauthenticated),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            _ => {
                let body: ErrorBody = response.json().await.unwrap_or_default();
                match body.first_message() {
                    Some(message) => Err(ApiError::Rejected { message }),
                    None => Err(ApiError::Transport(format!("http status {status}"))),
                }
            }
        }
    }

    /// Map status codes to the error taxonomy and decode the body.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        Self::ensure_success(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Interpret a mutation envelope: HTTP success with `success: false`
    /// is a rejection carrying the same verbatim message as an error
    /// status would.
    fn mutation_outcome(response: MutationResponse) -> Result<MutationResponse> {
        if response.success {
            Ok(response)
        } else {
            Err(ApiError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| "Error desconocido".to_string()),
            })
        }
    }
}

impl AuthGateway for HttpBackend {
    async fn resolve_session(&self) -> Result<User> {
        let envelope: UsuarioEnvelope = self.get_json("/api/user").await?;
        Ok(envelope.usuario.into())
    }

    async fn login(&self, credentials: &Credentials) -> Result<User> {
        let body = LoginRequest {
            correo: credentials.email.clone(),
            pass: credentials.password.clone(),
        };
        let envelope: UsuarioEnvelope = self.post_json("/api/login", &body).await?;
        Ok(envelope.usuario.into())
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        let body = RegisterRequest {
            nombre: registration.first_name.clone(),
            apellido: registration.last_name.clone(),
            correo: registration.email.clone(),
            pass: registration.password.clone(),
            pass_confirmation: registration.password_confirmation.clone(),
        };
        // The response body is not interesting, only the status.
        self.post_raw("/api/register", &body).await.map(|_| ())
    }

    async fn logout(&self) -> Result<()> {
        self.post_raw("/api/logout", &()).await.map(|_| ())
    }
}

impl CatalogGateway for HttpBackend {
    async fn companies(&self) -> Result<Vec<Company>> {
        let rows: Vec<EmpresaDto> = self.get_json("/api/companies").await?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn products(&self, company: CompanyId) -> Result<Vec<Product>> {
        let rows: Vec<ProductoDto> = self
            .get_json(&format!("/api/companies/{}/products", company.0))
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

impl ReservationGateway for HttpBackend {
    async fn reservation(&self, id: ReservationId) -> Result<Reservation> {
        let envelope: ReservationEnvelope =
            self.get_json(&format!("/api/reservations/{id}")).await?;
        envelope.reservation.try_into()
    }

    async fn my_reservations(&self) -> Result<Vec<ReservationSummary>> {
        let envelope: ReservasEnvelope = self.get_json("/api/reservations").await?;

        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "Error al cargar las reservas".to_string()),
            });
        }

        envelope
            .reservas
            .into_iter()
            .map(ReservationSummary::try_from)
            .collect()
    }

    async fn confirm(&self, id: ReservationId) -> Result<()> {
        let response: MutationResponse = self
            .post_json(&format!("/api/reservations/{id}/confirm"), &())
            .await?;
        Self::mutation_outcome(response).map(|_| ())
    }

    async fn cancel(&self, id: ReservationId) -> Result<()> {
        let response: MutationResponse = self
            .post_json(&format!("/api/reservations/{id}/cancel"), &())
            .await?;
        Self::mutation_outcome(response).map(|_| ())
    }

    async fn create(&self, request: &NewReservation) -> Result<ReservationId> {
        let body = CreateReservationRequest {
            empresa_id: request.company_id.0,
            items: request
                .items
                .iter()
                .map(|item| CreateReservationItem {
                    producto_id: item.product_id.0,
                    cantidad: item.quantity,
                })
                .collect(),
        };
        let response: MutationResponse = self.post_json("/api/reservations", &body).await?;
        let response = Self::mutation_outcome(response)?;

        response
            .reservation_id
            .map(ReservationId)
            .ok_or_else(|| ApiError::Decode("missing reservation_id".to_string()))
    }
}
