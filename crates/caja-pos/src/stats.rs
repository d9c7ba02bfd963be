//! # Session Statistics Poller
//!
//! Background refresh of the open session's statistics panel.
//!
//! ## Poller Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          StatsPoller                                │
//! │                                                                     │
//! │   interval tick (30s) ──┐                                           │
//! │   refresh poke ─────────┼──► fetch session_stats ──► snapshot       │
//! │                         │         │                                 │
//! │   shutdown ──► break    │     error: log, keep previous snapshot    │
//! │                         │     (figures are eventually consistent)   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Displayed figures lag the latest sale by up to one interval; checkout
//! shortens the lag by invalidating through the handle, which pokes an
//! immediate refetch. Shut the poller down when the session closes or
//! the view goes away.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use caja_backend::PosBackend;
use caja_core::{SessionStats, STATS_POLL_INTERVAL_SECS};

use crate::cache::{CachedView, ViewCache};

// =============================================================================
// Stats Poller
// =============================================================================

/// Polls session statistics on a fixed interval; spawn [`run`] as a
/// background task.
///
/// [`run`]: StatsPoller::run
pub struct StatsPoller {
    backend: Arc<dyn PosBackend>,
    session_id: String,
    snapshot: Arc<RwLock<Option<SessionStats>>>,
    refresh_rx: mpsc::Receiver<()>,
    shutdown_rx: mpsc::Receiver<()>,
    poll_interval: Duration,
}

/// Cloneable handle to the poller: read the latest snapshot, poke an
/// immediate refresh, or shut the task down.
#[derive(Clone)]
pub struct StatsHandle {
    snapshot: Arc<RwLock<Option<SessionStats>>>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl StatsPoller {
    /// Creates a poller on the standard 30-second interval.
    pub fn new(backend: Arc<dyn PosBackend>, session_id: impl Into<String>) -> (Self, StatsHandle) {
        Self::with_interval(
            backend,
            session_id,
            Duration::from_secs(STATS_POLL_INTERVAL_SECS),
        )
    }

    /// Creates a poller with an explicit interval.
    pub fn with_interval(
        backend: Arc<dyn PosBackend>,
        session_id: impl Into<String>,
        poll_interval: Duration,
    ) -> (Self, StatsHandle) {
        let snapshot = Arc::new(RwLock::new(None));
        let (refresh_tx, refresh_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let poller = StatsPoller {
            backend,
            session_id: session_id.into(),
            snapshot: snapshot.clone(),
            refresh_rx,
            shutdown_rx,
            poll_interval,
        };

        let handle = StatsHandle {
            snapshot,
            refresh_tx,
            shutdown_tx,
        };

        (poller, handle)
    }

    /// Runs the poll loop until shut down (or every handle is dropped).
    /// The first fetch happens immediately.
    pub async fn run(mut self) {
        info!(session_id = %self.session_id, "stats poller starting");

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.fetch().await;
                }

                Some(()) = self.refresh_rx.recv() => {
                    debug!("stats refresh requested");
                    self.fetch().await;
                }

                _ = self.shutdown_rx.recv() => {
                    break;
                }
            }
        }

        info!(session_id = %self.session_id, "stats poller stopped");
    }

    async fn fetch(&self) {
        match self.backend.session_stats(&self.session_id).await {
            Ok(stats) => {
                *self.snapshot.write().await = Some(stats);
            }
            Err(e) => {
                // keep the previous snapshot; the panel shows stale
                // figures until the next successful poll
                warn!(?e, session_id = %self.session_id, "stats fetch failed");
            }
        }
    }
}

impl StatsHandle {
    /// The most recent successfully fetched statistics.
    pub async fn latest(&self) -> Option<SessionStats> {
        self.snapshot.read().await.clone()
    }

    /// Requests an immediate refetch.
    pub async fn refresh(&self) {
        let _ = self.refresh_tx.send(()).await;
    }

    /// Stops the poller task.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Settlement invalidates the stats view through this impl; the poke is
/// best-effort and never blocks the checkout path.
impl ViewCache for StatsHandle {
    fn invalidate(&self, view: CachedView) {
        if view == CachedView::SessionStats {
            let _ = self.refresh_tx.try_send(());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caja_backend::{MemoryBackend, SaleLineRow, SaleRequest, TenderRow};
    use caja_core::{PosProduct, Session, TenderKind};

    async fn backend_with_session() -> (Arc<MemoryBackend>, Session) {
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
                price_cents: 1000,
                available_stock: 100,
                min_stock: 0,
                is_serialized: false,
                tax_rate_bps: 0,
                image_url: None,
            }],
        );
        let session = backend.open_session("u1", "wh-1", 0, None).await.unwrap();
        (backend, session)
    }

    async fn cash_sale(backend: &MemoryBackend, session_id: &str) {
        let outcome = backend
            .process_sale(SaleRequest {
                session_id: session_id.to_string(),
                customer_id: "c1".to_string(),
                lines: vec![SaleLineRow {
                    product_id: "p1".to_string(),
                    quantity: 1,
                    unit_price_cents: 1000,
                    discount_bps: 0,
                }],
                tenders: vec![TenderRow {
                    kind: TenderKind::Cash,
                    amount_cents: 1000,
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

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_on_start() {
        let (backend, session) = backend_with_session().await;
        let (poller, handle) = StatsPoller::new(backend.clone(), &session.id);
        tokio::spawn(poller.run());

        tokio::time::sleep(Duration::from_millis(1)).await;

        let stats = handle.latest().await.unwrap();
        assert_eq!(stats.today_transactions, 0);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_refetches() {
        let (backend, session) = backend_with_session().await;
        let (poller, handle) = StatsPoller::new(backend.clone(), &session.id);
        tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(1)).await;

        cash_sale(&backend, &session.id).await;
        // nothing until the next tick
        assert_eq!(handle.latest().await.unwrap().today_transactions, 0);

        tokio::time::sleep(Duration::from_secs(STATS_POLL_INTERVAL_SECS)).await;
        // settle: let the poller's tick run before asserting
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(handle.latest().await.unwrap().today_transactions, 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_pokes_immediate_refresh() {
        let (backend, session) = backend_with_session().await;
        let (poller, handle) = StatsPoller::new(backend.clone(), &session.id);
        tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(1)).await;

        cash_sale(&backend, &session.id).await;
        handle.invalidate(CachedView::SessionStats);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(handle.latest().await.unwrap().today_transactions, 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_views_ignored() {
        let (backend, session) = backend_with_session().await;
        let (poller, handle) = StatsPoller::new(backend.clone(), &session.id);
        tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(1)).await;

        cash_sale(&backend, &session.id).await;
        handle.invalidate(CachedView::WarehouseStock);
        tokio::time::sleep(Duration::from_millis(1)).await;

        // no refetch happened
        assert_eq!(handle.latest().await.unwrap().today_transactions, 0);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_keeps_previous_snapshot() {
        let (backend, session) = backend_with_session().await;
        let (poller, handle) = StatsPoller::new(backend.clone(), &session.id);
        tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(handle.latest().await.is_some());

        backend.go_offline(true);
        handle.refresh().await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        // the stale snapshot survives the failed poll
        assert!(handle.latest().await.is_some());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_polling() {
        let (backend, session) = backend_with_session().await;
        let (poller, handle) = StatsPoller::new(backend.clone(), &session.id);
        let task = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(1)).await;

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(task.is_finished());

        // sales after shutdown never reach the snapshot
        cash_sale(&backend, &session.id).await;
        tokio::time::sleep(Duration::from_secs(STATS_POLL_INTERVAL_SECS * 2)).await;
        assert_eq!(handle.latest().await.unwrap().today_transactions, 0);
    }
}
