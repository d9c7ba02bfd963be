//! # Session Lifecycle Service
//!
//! Opens and closes a cashier's cash-drawer session against the backend.
//!
//! ## Close Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  close(session, counted)                                            │
//! │     │                                                               │
//! │     ├─ must be OPEN, counted >= 0                                   │
//! │     │                                                               │
//! │     ├─ remote: cash sales since open                                │
//! │     │                                                               │
//! │     ├─ expected  = opening + cash sales                             │
//! │     ├─ variance  = counted − expected                               │
//! │     │                                                               │
//! │     └─ persist CLOSED with both figures (terminal)                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The client never prevents two tabs racing to open sessions; the
//! backend's uniqueness constraint does. This service only re-checks by
//! query to give the second tab a friendly rejection.

use std::sync::Arc;

use tracing::{debug, error, info};

use caja_backend::PosBackend;
use caja_core::{
    session::{expected_cash_cents, variance_cents},
    validation::validate_cash_amount,
    CoreError, Session,
};

use crate::error::PosResult;
use crate::notify::Notifier;

// =============================================================================
// Session Service
// =============================================================================

/// Session open/close orchestration.
pub struct SessionService {
    backend: Arc<dyn PosBackend>,
    notifier: Arc<dyn Notifier>,
}

impl SessionService {
    pub fn new(backend: Arc<dyn PosBackend>, notifier: Arc<dyn Notifier>) -> Self {
        SessionService { backend, notifier }
    }

    /// The at-most-one OPEN session for this user and warehouse.
    pub async fn current(&self, user_id: &str, warehouse_id: &str) -> PosResult<Option<Session>> {
        Ok(self
            .backend
            .current_open_session(user_id, warehouse_id)
            .await?)
    }

    /// Opens a session with the counted opening float.
    pub async fn open(
        &self,
        user_id: &str,
        warehouse_id: &str,
        opening_cents: i64,
        notes: Option<String>,
    ) -> PosResult<Session> {
        validate_cash_amount("opening amount", opening_cents).map_err(CoreError::from)?;

        if self.current(user_id, warehouse_id).await?.is_some() {
            self.notifier.error("A session is already open");
            return Err(CoreError::SessionAlreadyOpen.into());
        }

        debug!(user_id, warehouse_id, opening_cents, "opening session");
        let session = match self
            .backend
            .open_session(user_id, warehouse_id, opening_cents, notes)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                error!(?e, "failed to open session");
                self.notifier.error("Could not open the session");
                return Err(e.into());
            }
        };

        info!(session_id = %session.id, "session opened");
        self.notifier.success("Session opened");
        Ok(session)
    }

    /// Closes an OPEN session, reconciling the drawer.
    pub async fn close(
        &self,
        session: &Session,
        closing_cents: i64,
        notes: Option<String>,
    ) -> PosResult<Session> {
        session.ensure_open()?;
        validate_cash_amount("closing amount", closing_cents).map_err(CoreError::from)?;

        let cash = match self.backend.expected_cash(&session.id).await {
            Ok(c) => c,
            Err(e) => {
                error!(?e, "failed to compute expected cash");
                self.notifier.error("Could not close the session");
                return Err(e.into());
            }
        };

        let expected = expected_cash_cents(session.opening_cents, cash.cash_sales_cents);
        let difference = variance_cents(closing_cents, expected);

        debug!(
            session_id = %session.id,
            closing_cents,
            expected,
            difference,
            "closing session"
        );

        let closed = match self
            .backend
            .close_session(&session.id, closing_cents, expected, difference, notes)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                error!(?e, "failed to close session");
                self.notifier.error("Could not close the session");
                return Err(e.into());
            }
        };

        info!(session_id = %closed.id, difference, "session closed");
        self.notifier.success("Session closed");
        Ok(closed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PosError;
    use crate::notify::MemoryNotifier;
    use caja_backend::{MemoryBackend, SaleLineRow, SaleRequest, TenderRow};
    use caja_core::{PosProduct, SessionStatus, TenderKind};

    fn service() -> (Arc<MemoryBackend>, Arc<MemoryNotifier>, SessionService) {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_products(
            "wh-1",
            vec![PosProduct {
                id: "p1".to_string(),
                sku: "TEC-01".to_string(),
                name: "Teclado USB".to_string(),
                brand_name: None,
                category_name: None,
                unit_code: "NIU".to_string(),
                price_cents: 25000,
                available_stock: 50,
                min_stock: 0,
                is_serialized: false,
                tax_rate_bps: 0,
                image_url: None,
            }],
        );
        let notifier = Arc::new(MemoryNotifier::new());
        let session_service = SessionService::new(backend.clone(), notifier.clone());
        (backend, notifier, session_service)
    }

    /// Settles one cash sale of `amount_cents` inside the session.
    async fn cash_sale(backend: &MemoryBackend, session_id: &str, amount_cents: i64) {
        let outcome = backend
            .process_sale(SaleRequest {
                session_id: session_id.to_string(),
                customer_id: "c1".to_string(),
                lines: vec![SaleLineRow {
                    product_id: "p1".to_string(),
                    quantity: 1,
                    unit_price_cents: amount_cents,
                    discount_bps: 0,
                }],
                tenders: vec![TenderRow {
                    kind: TenderKind::Cash,
                    amount_cents,
                    reference: None,
                    card_type: None,
                    auth_code: None,
                }],
                notes: None,
            })
            .await
            .unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_open_then_current() {
        let (_, _, service) = service();

        assert!(service.current("u1", "wh-1").await.unwrap().is_none());
        let session = service.open("u1", "wh-1", 10000, None).await.unwrap();
        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.opening_cents, 10000);

        let current = service.current("u1", "wh-1").await.unwrap().unwrap();
        assert_eq!(current.id, session.id);
    }

    #[tokio::test]
    async fn test_open_rejects_negative_float() {
        let (_, _, service) = service();
        let err = service.open("u1", "wh-1", -1, None).await.unwrap_err();
        assert!(matches!(err, PosError::Core(_)));
    }

    #[tokio::test]
    async fn test_open_twice_rejected() {
        let (_, notifier, service) = service();
        service.open("u1", "wh-1", 0, None).await.unwrap();

        let err = service.open("u1", "wh-1", 0, None).await.unwrap_err();
        assert!(matches!(
            err,
            PosError::Core(CoreError::SessionAlreadyOpen)
        ));
        assert_eq!(notifier.last().unwrap().title, "A session is already open");
    }

    #[tokio::test]
    async fn test_close_reconciles_drawer() {
        // open 100.00, one cash sale of 250.00, counted 345.00:
        // expected 350.00, drawer short by 5.00
        let (backend, _, service) = service();
        let session = service.open("u1", "wh-1", 10000, None).await.unwrap();
        cash_sale(&backend, &session.id, 25000).await;

        let closed = service.close(&session, 34500, None).await.unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.expected_cents, Some(35000));
        assert_eq!(closed.difference_cents, Some(-500));
        assert_eq!(closed.closing_cents, Some(34500));
        assert!(closed.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_close_requires_open_session() {
        let (_, _, service) = service();
        let session = service.open("u1", "wh-1", 0, None).await.unwrap();
        let closed = service.close(&session, 0, None).await.unwrap();

        let err = service.close(&closed, 0, None).await.unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::SessionNotOpen)));
    }

    #[tokio::test]
    async fn test_close_rejects_negative_count() {
        let (_, _, service) = service();
        let session = service.open("u1", "wh-1", 0, None).await.unwrap();

        let err = service.close(&session, -100, None).await.unwrap_err();
        assert!(matches!(err, PosError::Core(_)));
        // still open
        assert!(service.current("u1", "wh-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_close_transport_failure_leaves_session_open() {
        let (backend, _, service) = service();
        let session = service.open("u1", "wh-1", 0, None).await.unwrap();

        backend.go_offline(true);
        let err = service.close(&session, 0, None).await.unwrap_err();
        assert!(matches!(err, PosError::Backend(_)));

        backend.go_offline(false);
        assert!(service.current("u1", "wh-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_new_session_after_close() {
        let (_, _, service) = service();
        let first = service.open("u1", "wh-1", 0, None).await.unwrap();
        service.close(&first, 0, None).await.unwrap();

        let second = service.open("u1", "wh-1", 5000, None).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.opening_cents, 5000);
    }
}
