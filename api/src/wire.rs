//! Wire representation of the backend REST API.
//!
//! The backend speaks Spanish field names and integer status codes; these
//! DTOs mirror that contract exactly and are converted to the domain types
//! in [`crate::types`] at the gateway boundary. Nothing outside this crate
//! sees a DTO.

use crate::error::ApiError;
use crate::types::{
    Company, CompanyId, CompanyRef, LineItem, Product, ProductId, ProductRef, Reservation,
    ReservationId, ReservationStatus, ReservationSummary, UserId, User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════════

/// Body of `POST /api/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    /// Email address.
    pub correo: String,
    /// Password.
    pub pass: String,
}

/// Body of `POST /api/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    /// Given name.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// Email address.
    pub correo: String,
    /// Chosen password.
    pub pass: String,
    /// Password repeated.
    pub pass_confirmation: String,
}

/// Body of `POST /api/reservations`.
#[derive(Debug, Serialize)]
pub struct CreateReservationRequest {
    /// Owning company.
    pub empresa_id: u64,
    /// Requested items.
    pub items: Vec<CreateReservationItem>,
}

/// One item of [`CreateReservationRequest`].
#[derive(Debug, Serialize)]
pub struct CreateReservationItem {
    /// Product to reserve.
    pub producto_id: u64,
    /// Units requested.
    pub cantidad: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════════════

/// The user record as the backend serializes it.
#[derive(Debug, Deserialize)]
pub struct UsuarioDto {
    /// Unique identifier.
    pub id: u64,
    /// Given name.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// Email address.
    pub correo: String,
}

/// Envelope of the login and session-resolution endpoints.
#[derive(Debug, Deserialize)]
pub struct UsuarioEnvelope {
    /// The authenticated user.
    pub usuario: UsuarioDto,
}

/// One company row of `GET /api/companies`.
#[derive(Debug, Deserialize)]
pub struct EmpresaDto {
    /// Unique identifier.
    pub id: u64,
    /// Display name.
    pub nombre: String,
    /// Optional blurb.
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// One product row of `GET /api/companies/{id}/products`.
#[derive(Debug, Deserialize)]
pub struct ProductoDto {
    /// Unique identifier.
    pub id: u64,
    /// Owning company.
    pub empresa_id: u64,
    /// Display name.
    pub nombre: String,
    /// Unit price in euros.
    pub precio: f64,
    /// Units available.
    pub stock: u32,
}

/// Envelope of `GET /api/reservations/{id}`.
#[derive(Debug, Deserialize)]
pub struct ReservationEnvelope {
    /// The reservation detail.
    pub reservation: ReservationDto,
}

/// Full reservation detail as serialized by the backend.
#[derive(Debug, Deserialize)]
pub struct ReservationDto {
    /// Unique identifier.
    pub id: u64,
    /// Lifecycle status code (1 pending, 2 confirmed, 3 canceled).
    pub estado_id: u8,
    /// Owning company.
    pub empresa: EmpresaRefDto,
    /// Line items.
    #[serde(default)]
    pub lineas: Vec<LineaDto>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Company reference inside a reservation.
#[derive(Debug, Deserialize)]
pub struct EmpresaRefDto {
    /// Company identifier.
    pub id: u64,
    /// Company display name.
    pub nombre: String,
}

/// One line item of a reservation detail.
#[derive(Debug, Deserialize)]
pub struct LineaDto {
    /// The reserved product.
    pub producto: ProductoRefDto,
    /// Units reserved.
    pub cantidad: u32,
    /// Price per unit in euros.
    pub precio_unitario: f64,
    /// Server-computed subtotal; carried on the wire but recomputed
    /// client-side for display.
    #[serde(default)]
    pub subtotal: f64,
}

/// Product reference inside a line item.
#[derive(Debug, Deserialize)]
pub struct ProductoRefDto {
    /// Product identifier.
    pub id: u64,
    /// Product display name.
    pub nombre: String,
}

/// Envelope of `GET /api/reservations`.
#[derive(Debug, Deserialize)]
pub struct ReservasEnvelope {
    /// Whether the query succeeded.
    pub success: bool,
    /// The reservation rows.
    #[serde(default)]
    pub reservas: Vec<ReservaRowDto>,
    /// Failure reason when `success` is false.
    #[serde(default)]
    pub message: Option<String>,
}

/// One row of the "my reservations" list.
#[derive(Debug, Deserialize)]
pub struct ReservaRowDto {
    /// Unique identifier.
    pub id: u64,
    /// Owning company display name.
    pub empresa: String,
    /// Short product summary for the row title.
    #[serde(default)]
    pub producto: Option<String>,
    /// Number of line items.
    pub items_count: u32,
    /// Server-computed display total.
    #[serde(default)]
    pub total: f64,
    /// Server-formatted date string.
    pub fecha: String,
    /// Lifecycle status code.
    pub estado_id: u8,
}

/// Envelope of the mutating reservation endpoints (confirm, cancel,
/// create).
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    /// Whether the mutation was applied.
    pub success: bool,
    /// Failure reason when `success` is false; shown verbatim.
    #[serde(default)]
    pub message: Option<String>,
    /// Identifier of a newly created reservation.
    #[serde(default)]
    pub reservation_id: Option<u64>,
}

/// Body shape of backend error responses.
///
/// Validation errors arrive as a field-to-messages map; other failures as
/// a single `message` or `error` string.
#[derive(Debug, Deserialize, Default)]
pub struct ErrorBody {
    /// Single failure reason.
    #[serde(default)]
    pub message: Option<String>,
    /// Alternative failure reason key used by the register endpoint.
    #[serde(default)]
    pub error: Option<String>,
    /// Per-field validation messages.
    #[serde(default)]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ErrorBody {
    /// The first human-readable message in the body, if any.
    ///
    /// Mirrors the precedence of the original consumers: field validation
    /// messages first, then `error`, then `message`.
    #[must_use]
    pub fn first_message(&self) -> Option<String> {
        if let Some(errors) = &self.errors {
            let mut fields: Vec<&String> = errors.keys().collect();
            fields.sort();
            for field in fields {
                if let Some(message) = errors.get(field).and_then(|m| m.first()) {
                    return Some(message.clone());
                }
            }
        }
        self.error.clone().or_else(|| self.message.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════

impl From<UsuarioDto> for User {
    fn from(dto: UsuarioDto) -> Self {
        Self {
            id: UserId(dto.id),
            first_name: dto.nombre,
            last_name: dto.apellido,
            email: dto.correo,
        }
    }
}

impl From<EmpresaDto> for Company {
    fn from(dto: EmpresaDto) -> Self {
        Self {
            id: CompanyId(dto.id),
            name: dto.nombre,
            description: dto.descripcion,
        }
    }
}

impl From<ProductoDto> for Product {
    fn from(dto: ProductoDto) -> Self {
        Self {
            id: ProductId(dto.id),
            company_id: CompanyId(dto.empresa_id),
            name: dto.nombre,
            unit_price: dto.precio,
            stock: dto.stock,
        }
    }
}

impl TryFrom<ReservationDto> for Reservation {
    type Error = ApiError;

    fn try_from(dto: ReservationDto) -> Result<Self, Self::Error> {
        let status = ReservationStatus::from_code(dto.estado_id)
            .ok_or_else(|| ApiError::Decode(format!("unknown estado_id {}", dto.estado_id)))?;

        Ok(Self {
            id: ReservationId(dto.id),
            status,
            company: CompanyRef {
                id: CompanyId(dto.empresa.id),
                name: dto.empresa.nombre,
            },
            lines: dto
                .lineas
                .into_iter()
                .map(|linea| LineItem {
                    product: ProductRef {
                        id: ProductId(linea.producto.id),
                        name: linea.producto.nombre,
                    },
                    quantity: linea.cantidad,
                    unit_price: linea.precio_unitario,
                })
                .collect(),
            created_at: dto.created_at,
        })
    }
}

impl TryFrom<ReservaRowDto> for ReservationSummary {
    type Error = ApiError;

    fn try_from(dto: ReservaRowDto) -> Result<Self, Self::Error> {
        let status = ReservationStatus::from_code(dto.estado_id)
            .ok_or_else(|| ApiError::Decode(format!("unknown estado_id {}", dto.estado_id)))?;

        Ok(Self {
            id: ReservationId(dto.id),
            company_name: dto.empresa,
            product_summary: dto.producto,
            item_count: dto.items_count,
            total: dto.total,
            date: dto.fecha,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_dto_converts_and_recomputes_subtotals() {
        let json = r#"{
            "reservation": {
                "id": 42,
                "estado_id": 1,
                "empresa": {"id": 7, "nombre": "La Terraza"},
                "lineas": [
                    {
                        "producto": {"id": 3, "nombre": "Paella"},
                        "cantidad": 2,
                        "precio_unitario": 10.0,
                        "subtotal": 999.0
                    }
                ],
                "created_at": "2025-06-01T12:00:00Z"
            }
        }"#;

        let envelope: ReservationEnvelope =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("decode: {e}"));
        let reservation = Reservation::try_from(envelope.reservation)
            .unwrap_or_else(|e| panic!("convert: {e}"));

        assert_eq!(reservation.id, ReservationId(42));
        assert_eq!(reservation.status, ReservationStatus::Pending);
        // The bogus wire subtotal is ignored; the client derives its own.
        assert!((reservation.total() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_status_code_is_a_decode_error() {
        let dto = ReservationDto {
            id: 1,
            estado_id: 9,
            empresa: EmpresaRefDto {
                id: 1,
                nombre: "X".to_string(),
            },
            lineas: vec![],
            created_at: chrono::Utc::now(),
        };
        assert!(matches!(
            Reservation::try_from(dto),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn error_body_prefers_validation_messages() {
        let json = r#"{
            "errors": {"correo": ["El correo ya está registrado"]},
            "message": "The given data was invalid."
        }"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap_or_else(|e| panic!("decode: {e}"));
        assert_eq!(
            body.first_message().as_deref(),
            Some("El correo ya está registrado")
        );
    }

    #[test]
    fn error_body_falls_back_to_message() {
        let body = ErrorBody {
            message: Some("Stock insuficiente".to_string()),
            ..ErrorBody::default()
        };
        assert_eq!(body.first_message().as_deref(), Some("Stock insuficiente"));
    }
}
