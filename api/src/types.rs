//! Domain types for the reservation marketplace.
//!
//! These are the client-side shapes the view features work with. The wire
//! representation (Spanish field names, integer status codes) lives in
//! [`crate::wire`] and is converted at the gateway boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique identifier for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub u64);

/// Unique identifier for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

/// Unique identifier for a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub u64);

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// The authenticated user, as returned by the session and login endpoints.
///
/// The session core only cares about existence; the fields are carried for
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address (the login identifier).
    pub email: String,
}

/// Login form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Password, sent once to the login endpoint and not retained.
    pub password: String,
}

/// Registration form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password repeated; the server validates the match.
    pub password_confirmation: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog
// ═══════════════════════════════════════════════════════════════════════

/// A company offering products for reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Optional blurb shown on the company card.
    pub description: Option<String>,
}

/// A product offered by one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Unit price in euros.
    pub unit_price: f64,
    /// Units currently available; bounds the quantity selector.
    pub stock: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// Reservations
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of a reservation.
///
/// Wire-encoded as integer codes (1/2/3). `Canceled` is terminal; the
/// client never sets this locally - every transition is confirmed by
/// re-fetching from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Created but not yet confirmed; stock is not yet reduced.
    Pending,
    /// Confirmed by the user; stock has been reduced server-side.
    Confirmed,
    /// Canceled; terminal.
    Canceled,
}

impl ReservationStatus {
    /// The integer code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pending => 1,
            Self::Confirmed => 2,
            Self::Canceled => 3,
        }
    }

    /// Decode a wire status code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Pending),
            2 => Some(Self::Confirmed),
            3 => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Whether the confirm transition is offered.
    #[must_use]
    pub const fn can_confirm(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the cancel transition is offered.
    ///
    /// A canceled reservation is terminal and must not offer cancel again.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "Pendiente",
            Self::Confirmed => "Confirmada",
            Self::Canceled => "Cancelada",
        };
        write!(f, "{label}")
    }
}

/// Reference to a company inside a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    /// Company identifier.
    pub id: CompanyId,
    /// Company display name.
    pub name: String,
}

/// Reference to a product inside a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product identifier.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
}

/// One product-quantity-price entry within a reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The reserved product.
    pub product: ProductRef,
    /// Units reserved; positive.
    pub quantity: u32,
    /// Price per unit in euros; non-negative.
    pub unit_price: f64,
}

impl LineItem {
    /// Line subtotal, recomputed client-side for display.
    ///
    /// The wire carries a subtotal too, but it is only trusted for display
    /// and never for billing, so the client derives its own.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Full reservation detail, as fetched for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier.
    pub id: ReservationId,
    /// Current lifecycle status, authoritative from the server.
    pub status: ReservationStatus,
    /// Owning company.
    pub company: CompanyRef,
    /// Ordered line items.
    pub lines: Vec<LineItem>,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Display total: the sum of line subtotals.
    ///
    /// Never authoritative for billing.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(LineItem::subtotal).sum()
    }
}

/// Flat row for the "my reservations" list; no line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    /// Unique identifier.
    pub id: ReservationId,
    /// Owning company display name.
    pub company_name: String,
    /// Short product summary for the row title, when the server provides
    /// one.
    pub product_summary: Option<String>,
    /// Number of line items.
    pub item_count: u32,
    /// Server-computed display total in euros.
    pub total: f64,
    /// Server-formatted date string.
    pub date: String,
    /// Current lifecycle status.
    pub status: ReservationStatus,
}

/// Request to create a reservation for products of one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// The company all items belong to.
    pub company_id: CompanyId,
    /// Requested items.
    pub items: Vec<NewReservationItem>,
}

/// One requested item in a new reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservationItem {
    /// The product to reserve.
    pub product_id: ProductId,
    /// Units requested; positive, bounded by the product stock client-side
    /// and validated again server-side.
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, unit_price: f64) -> LineItem {
        LineItem {
            product: ProductRef {
                id: ProductId(1),
                name: "Menú degustación".to_string(),
            },
            quantity,
            unit_price,
        }
    }

    #[test]
    fn subtotal_is_quantity_times_unit_price() {
        assert!((line(2, 10.0).subtotal() - 20.0).abs() < f64::EPSILON);
        assert!((line(3, 7.5).subtotal() - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let reservation = Reservation {
            id: ReservationId(42),
            status: ReservationStatus::Pending,
            company: CompanyRef {
                id: CompanyId(1),
                name: "La Terraza".to_string(),
            },
            lines: vec![line(2, 10.0), line(1, 5.25)],
            created_at: Utc::now(),
        };
        assert!((reservation.total() - 25.25).abs() < 1e-9);
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Canceled,
        ] {
            assert_eq!(ReservationStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ReservationStatus::from_code(0), None);
        assert_eq!(ReservationStatus::from_code(4), None);
    }

    #[test]
    fn canceled_is_terminal() {
        assert!(!ReservationStatus::Canceled.can_cancel());
        assert!(!ReservationStatus::Canceled.can_confirm());
        assert!(ReservationStatus::Pending.can_confirm());
        assert!(ReservationStatus::Pending.can_cancel());
        assert!(!ReservationStatus::Confirmed.can_confirm());
        assert!(ReservationStatus::Confirmed.can_cancel());
    }
}
