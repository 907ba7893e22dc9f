//! Catalog feature: company listing, product browsing, and the
//! create-reservation form.
//!
//! Fetch-and-render views with one piece of real logic: the quantity
//! selector of the reservation form is clamped to the product's stock
//! client-side, and the server validates again on submission.

use crate::environment::{AppEnvironment, ConfirmationPrompt};
use reserva_api::{
    ApiError, Backend, CatalogGateway, Company, CompanyId, NewReservation, NewReservationItem,
    Product, ProductId, ReservationGateway, ReservationId,
};
use reserva_core::effect::Effect;
use reserva_core::reducer::Reducer;
use reserva_core::{smallvec, SmallVec};

/// Draft of a reservation being composed on the reserve form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDraft {
    /// The product being reserved.
    pub product: Product,
    /// Requested quantity, kept within `1..=stock`.
    pub quantity: u32,
}

impl ReservationDraft {
    /// Preview subtotal shown under the quantity selector.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.product.unit_price
    }
}

/// State of the catalog views.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    /// Fetched companies.
    pub companies: Vec<Company>,
    /// Products of the company currently browsed.
    pub products: Vec<Product>,
    /// Which company `products` belongs to.
    pub products_of: Option<CompanyId>,
    /// Whether a catalog fetch is in flight.
    pub loading: bool,
    /// Fetch or submission failure message.
    pub error: Option<String>,
    /// The reservation form draft, when open.
    pub draft: Option<ReservationDraft>,
    /// Create call in flight; disables the submit control.
    pub submitting: bool,
}

/// All inputs to the catalog reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    /// Fetch the company list.
    CompaniesRequested,
    /// The company list arrived.
    CompaniesLoaded {
        /// All companies.
        companies: Vec<Company>,
    },
    /// Fetch the products of one company.
    ProductsRequested {
        /// The company to browse.
        company: CompanyId,
    },
    /// The product list arrived.
    ProductsLoaded {
        /// The company the products belong to.
        company: CompanyId,
        /// Its products.
        products: Vec<Product>,
    },
    /// A catalog fetch failed.
    CatalogFailed {
        /// Display message.
        message: String,
    },
    /// Open the reservation form for a product.
    DraftStarted {
        /// The product to reserve.
        product: ProductId,
    },
    /// Change the requested quantity (clamped to stock).
    QuantityChanged {
        /// Requested quantity.
        quantity: u32,
    },
    /// Submit the draft to the backend.
    DraftSubmitted,
    /// The reservation was created.
    DraftAccepted {
        /// Identifier of the new reservation.
        id: ReservationId,
    },
    /// The backend refused the reservation.
    DraftRejected {
        /// Server message verbatim, or a generic fallback.
        message: String,
    },
    /// Close the reservation form.
    DraftClosed,
}

/// Reducer for the catalog views.
#[derive(Debug, Clone)]
pub struct CatalogReducer<B, P> {
    _phantom: std::marker::PhantomData<(B, P)>,
}

impl<B, P> CatalogReducer<B, P> {
    /// Create a new catalog reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B, P> Default for CatalogReducer<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P> Reducer for CatalogReducer<B, P>
where
    B: Backend + Clone + 'static,
    P: ConfirmationPrompt + Clone + 'static,
{
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = AppEnvironment<B, P>;

    #[allow(clippy::too_many_lines)] // one arm per catalog interaction
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::CompaniesRequested => {
                state.loading = true;
                state.error = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.companies().await {
                        Ok(companies) => Some(CatalogAction::CompaniesLoaded { companies }),
                        Err(e) => {
                            tracing::warn!(error = %e, "company list fetch failed");
                            Some(CatalogAction::CatalogFailed {
                                message: "Error al cargar las empresas".to_string(),
                            })
                        }
                    }
                })]
            }

            CatalogAction::CompaniesLoaded { companies } => {
                state.loading = false;
                state.companies = companies;
                smallvec![Effect::None]
            }

            CatalogAction::ProductsRequested { company } => {
                state.loading = true;
                state.error = None;
                state.products_of = Some(company);
                state.products.clear();

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.products(company).await {
                        Ok(products) => Some(CatalogAction::ProductsLoaded { company, products }),
                        Err(e) => {
                            tracing::warn!(error = %e, "product list fetch failed");
                            Some(CatalogAction::CatalogFailed {
                                message: "Error al cargar los productos".to_string(),
                            })
                        }
                    }
                })]
            }

            CatalogAction::ProductsLoaded { company, products } => {
                if state.products_of != Some(company) {
                    tracing::debug!("discarding stale product response");
                    return smallvec![Effect::None];
                }
                state.loading = false;
                state.products = products;
                smallvec![Effect::None]
            }

            CatalogAction::CatalogFailed { message } => {
                state.loading = false;
                state.submitting = false;
                state.error = Some(message);
                smallvec![Effect::None]
            }

            CatalogAction::DraftStarted { product } => {
                let Some(product) = state.products.iter().find(|p| p.id == product).cloned()
                else {
                    return smallvec![Effect::None];
                };
                if product.stock == 0 {
                    state.error = Some("Stock máximo disponible: 0".to_string());
                    return smallvec![Effect::None];
                }
                state.error = None;
                state.draft = Some(ReservationDraft {
                    product,
                    quantity: 1,
                });
                smallvec![Effect::None]
            }

            CatalogAction::QuantityChanged { quantity } => {
                let Some(draft) = state.draft.as_mut() else {
                    return smallvec![Effect::None];
                };
                if quantity > draft.product.stock {
                    // Leave the quantity as it was; only the message changes.
                    state.error = Some(format!(
                        "Stock máximo disponible: {}",
                        draft.product.stock
                    ));
                } else {
                    draft.quantity = quantity.max(1);
                    state.error = None;
                }
                smallvec![Effect::None]
            }

            CatalogAction::DraftSubmitted => {
                let Some(draft) = state.draft.as_ref() else {
                    return smallvec![Effect::None];
                };
                if state.submitting {
                    return smallvec![Effect::None];
                }
                state.submitting = true;
                state.error = None;

                let request = NewReservation {
                    company_id: draft.product.company_id,
                    items: vec![NewReservationItem {
                        product_id: draft.product.id,
                        quantity: draft.quantity,
                    }],
                };
                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.create(&request).await {
                        Ok(id) => Some(CatalogAction::DraftAccepted { id }),
                        Err(e) => {
                            let message = match e {
                                ApiError::Rejected { message } => message,
                                _ => "Error al crear la reserva".to_string(),
                            };
                            Some(CatalogAction::DraftRejected { message })
                        }
                    }
                })]
            }

            CatalogAction::DraftAccepted { .. } => {
                state.submitting = false;
                state.draft = None;
                smallvec![Effect::None]
            }

            CatalogAction::DraftRejected { message } => {
                state.submitting = false;
                state.error = Some(message);
                smallvec![Effect::None]
            }

            CatalogAction::DraftClosed => {
                state.draft = None;
                state.error = None;
                smallvec![Effect::None]
            }
        }
    }
}
