//! # Checkout Orchestration
//!
//! The sequence from "complete sale" to a settled document.
//!
//! ## Settlement Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  1. recompute totals from the lines   (never trust cached numbers)  │
//! │  2. validate the sale draft locally   (items, payments, total > 0)  │
//! │  3. translate lines/tenders to the procedure's row shapes           │
//! │  4. ONE call to the atomic remote procedure                         │
//! │  5. failure → notify, return error, touch nothing                   │
//! │  6. success → build immutable Sale, invalidate stats/stock views,   │
//! │     notify "Sale B001-… completed"                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock validation runs strictly before settlement, never concurrently
//! with it: fail fast while the customer is still at the counter. The
//! check is inherently racy (stock can move between the two calls);
//! the atomic procedure is the real guard.
//!
//! The caller resets the register only after `complete_sale` returns Ok.
//! Receipt generation is downstream of the committed sale and can never
//! roll it back.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use caja_backend::{PosBackend, SaleLineRow, SaleRequest, StockCheckRow, TenderRow};
use caja_core::{
    validation::validate_sale_draft, Cart, CoreError, Sale, SaleStatus, TenderLedger,
    DEFAULT_DOC_TYPE, DEFAULT_SERIES,
};

use crate::cache::{CachedView, ViewCache};
use crate::error::{PosError, PosResult};
use crate::notify::Notifier;

// =============================================================================
// Checkout Service
// =============================================================================

/// Orchestrates stock validation and sale settlement.
pub struct CheckoutService {
    backend: Arc<dyn PosBackend>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn ViewCache>,
}

impl CheckoutService {
    pub fn new(
        backend: Arc<dyn PosBackend>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn ViewCache>,
    ) -> Self {
        CheckoutService {
            backend,
            notifier,
            cache,
        }
    }

    /// Pre-flight stock check for the assembled cart.
    ///
    /// An empty cart passes trivially. Insufficiency names the offending
    /// products and blocks settlement; so does a failed check itself,
    /// because "cannot confirm" is treated as "not sufficient".
    pub async fn validate_stock(&self, warehouse_id: &str, cart: &Cart) -> PosResult<()> {
        if cart.is_empty() {
            return Ok(());
        }

        let rows: Vec<StockCheckRow> = cart.lines().iter().map(StockCheckRow::from).collect();
        debug!(warehouse_id, lines = rows.len(), "validating cart stock");

        let validation = match self.backend.validate_cart_stock(warehouse_id, rows).await {
            Ok(v) => v,
            Err(e) => {
                error!(?e, "stock validation call failed");
                self.notifier.error("Could not verify stock availability");
                return Err(PosError::StockUnverified);
            }
        };

        if validation.has_stock_errors {
            let products = validation.insufficient_names();
            warn!(?products, "stock validation rejected cart");
            self.notifier
                .error(&format!("Insufficient stock for: {}", products.join(", ")));
            return Err(PosError::InsufficientStock { products });
        }

        Ok(())
    }

    /// Invokes the atomic sale procedure and maps the response into an
    /// immutable [`Sale`].
    ///
    /// On any failure the cart and tenders are left exactly as they
    /// were (this method borrows them immutably on purpose) so the
    /// operator can correct and retry.
    pub async fn complete_sale(
        &self,
        session_id: &str,
        customer_id: &str,
        cart: &Cart,
        tenders: &TenderLedger,
        notes: Option<String>,
    ) -> PosResult<Sale> {
        // defensive recomputation from the lines themselves
        let totals = cart.totals();
        validate_sale_draft(cart.line_count(), tenders.len(), totals.total_cents)
            .map_err(CoreError::from)?;

        let request = SaleRequest {
            session_id: session_id.to_string(),
            customer_id: customer_id.to_string(),
            lines: cart.lines().iter().map(SaleLineRow::from).collect(),
            tenders: tenders.tenders().iter().map(TenderRow::from).collect(),
            notes: notes.clone(),
        };

        debug!(
            session_id,
            customer_id,
            total_cents = totals.total_cents,
            "invoking sale procedure"
        );

        let outcome = match self.backend.process_sale(request).await {
            Ok(o) => o,
            Err(e) => {
                error!(?e, "sale procedure transport failure");
                self.notifier.error("Could not complete the sale");
                return Err(e.into());
            }
        };

        if !outcome.success {
            let message = outcome
                .error
                .unwrap_or_else(|| "the sale was rejected".to_string());
            warn!(%message, "sale procedure rejected the sale");
            self.notifier.error(&message);
            return Err(PosError::SaleRejected { message });
        }

        // echo the backend-assigned document identity
        let document_number = outcome.document_number.unwrap_or_default();
        let number = document_number
            .strip_prefix(&format!("{}-", DEFAULT_SERIES))
            .unwrap_or(&document_number)
            .to_string();

        let sale = Sale {
            id: outcome.sales_doc_id.unwrap_or_default(),
            session_id: session_id.to_string(),
            customer_id: customer_id.to_string(),
            doc_type: DEFAULT_DOC_TYPE.to_string(),
            series: DEFAULT_SERIES.to_string(),
            number,
            sale_date: Utc::now(),
            lines: cart.lines().to_vec(),
            tenders: tenders.tenders().to_vec(),
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            status: SaleStatus::Completed,
            notes,
        };

        // dependent displays refetch ahead of their polling schedule
        self.cache.invalidate(CachedView::SessionStats);
        self.cache.invalidate(CachedView::WarehouseStock);

        info!(
            sale_id = %sale.id,
            document = %sale.document_reference(),
            total_cents = sale.total_cents,
            "sale completed"
        );
        self.notifier
            .success(&format!("Sale {} completed", sale.document_reference()));

        Ok(sale)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
