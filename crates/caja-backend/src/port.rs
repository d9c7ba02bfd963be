//! # The PosBackend Port
//!
//! Every remote call the POS core is allowed to make, as one trait.
//! Services receive it as `Arc<dyn PosBackend>`, so production can plug
//! an RPC client and tests plug [`crate::MemoryBackend`] without the
//! orchestration code noticing.
//!
//! No method retries on its own: every call either succeeds once or
//! surfaces an error for the operator to retry manually. Timeouts are
//! the transport's concern.

use async_trait::async_trait;

use caja_core::{PosProduct, Session, SessionStats};

use crate::error::BackendResult;
use crate::types::{ExpectedCash, SaleOutcome, SaleRequest, StockCheckRow, StockValidation};

/// The remote backend as seen by the POS core.
#[async_trait]
pub trait PosBackend: Send + Sync {
    // --- Catalog ---

    /// Free-text/SKU search scoped to a warehouse, priced from the
    /// default price list, at most a page of results.
    async fn search_products(
        &self,
        query: &str,
        warehouse_id: &str,
    ) -> BackendResult<Vec<PosProduct>>;

    // --- Settlement ---

    /// Read-then-decide stock check for the assembled cart.
    ///
    /// Advisory: stock may change between this call and settlement. The
    /// atomic procedure re-checks; this exists so the operator gets an
    /// early, named rejection.
    async fn validate_cart_stock(
        &self,
        warehouse_id: &str,
        lines: Vec<StockCheckRow>,
    ) -> BackendResult<StockValidation>;

    /// The single atomic sale procedure: deduct stock, post ledger
    /// entries, assign the document number, and record payments,
    /// indivisibly. The system's only true transaction boundary.
    async fn process_sale(&self, request: SaleRequest) -> BackendResult<SaleOutcome>;

    // --- Sessions ---

    /// The at-most-one OPEN session for this user and warehouse.
    async fn current_open_session(
        &self,
        user_id: &str,
        warehouse_id: &str,
    ) -> BackendResult<Option<Session>>;

    /// Creates an OPEN session. Rejects with a conflict when one is
    /// already open for the same user and warehouse.
    async fn open_session(
        &self,
        user_id: &str,
        warehouse_id: &str,
        opening_cents: i64,
        notes: Option<String>,
    ) -> BackendResult<Session>;

    /// Persists the CLOSED state with the client-computed expectation
    /// and variance.
    async fn close_session(
        &self,
        session_id: &str,
        closing_cents: i64,
        expected_cents: i64,
        difference_cents: i64,
        notes: Option<String>,
    ) -> BackendResult<Session>;

    /// Cash sales accumulated during the session; queried only at close.
    async fn expected_cash(&self, session_id: &str) -> BackendResult<ExpectedCash>;

    /// Today's totals, top products, and payment breakdown for the
    /// session's dashboard panel.
    async fn session_stats(&self, session_id: &str) -> BackendResult<SessionStats>;
}
