//! # In-Memory Reference Backend
//!
//! A complete [`PosBackend`] implementation over in-memory tables. It
//! exists for two reasons:
//!
//! 1. It is the test double every orchestration test runs against, with
//!    levers to simulate a dead transport (`go_offline`) and a
//!    structured settlement rejection (`fail_next_sale`).
//! 2. It documents, in executable form, what the remote procedures are
//!    assumed to do: the atomic re-check-deduct-number-record settlement
//!    and the one-OPEN-session-per-(user, warehouse) constraint live
//!    here exactly as the hosted backend enforces them.
//!
//! State sits behind one `std::sync::Mutex`; no lock is ever held across
//! an await point.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use caja_core::{
    Money, PosProduct, Rate, Session, SessionStats, SessionStatus, TenderBreakdown, TenderKind,
    TopProduct, DEFAULT_SERIES, SEARCH_PAGE_SIZE, STANDARD_TAX_RATE_BPS,
};

use crate::error::{BackendError, BackendResult};
use crate::port::PosBackend;
use crate::types::{
    ExpectedCash, SaleLineRow, SaleOutcome, SaleRequest, StockCheckItem, StockCheckRow,
    StockValidation, TenderRow,
};

// =============================================================================
// Tables
// =============================================================================

/// A settled sale as the backend records it.
struct RecordedSale {
    session_id: String,
    document_number: String,
    lines: Vec<SaleLineRow>,
    tenders: Vec<TenderRow>,
    total_cents: i64,
    sold_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    products: Vec<PosProduct>,
    /// (warehouse_id, product_id) → on-hand quantity.
    stock: HashMap<(String, String), i64>,
    sessions: Vec<Session>,
    sales: Vec<RecordedSale>,
    next_doc_number: u64,
    /// Test lever: the next process_sale returns this structured error.
    fail_next_sale: Option<String>,
    /// Test lever: every call fails with a transport error.
    offline: bool,
}

// =============================================================================
// Memory Backend
// =============================================================================

/// In-memory [`PosBackend`].
pub struct MemoryBackend {
    tables: Mutex<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend {
            tables: Mutex::new(Tables {
                next_doc_number: 1,
                ..Tables::default()
            }),
        }
    }

    /// Seeds products into a warehouse, taking each product's
    /// `available_stock` as the initial on-hand quantity.
    pub fn seed_products(&self, warehouse_id: &str, products: Vec<PosProduct>) {
        let mut t = self.lock();
        for product in products {
            t.stock.insert(
                (warehouse_id.to_string(), product.id.clone()),
                product.available_stock,
            );
            t.products.push(product);
        }
    }

    /// Overrides the on-hand quantity for one product.
    pub fn set_stock(&self, warehouse_id: &str, product_id: &str, quantity: i64) {
        self.lock()
            .stock
            .insert((warehouse_id.to_string(), product_id.to_string()), quantity);
    }

    /// Current on-hand quantity, for test assertions.
    pub fn stock_of(&self, warehouse_id: &str, product_id: &str) -> i64 {
        self.lock()
            .stock
            .get(&(warehouse_id.to_string(), product_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Simulates a dead transport: every call fails until turned off.
    pub fn go_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Makes the next `process_sale` return a structured rejection.
    pub fn fail_next_sale(&self, message: impl Into<String>) {
        self.lock().fail_next_sale = Some(message.into());
    }

    /// Number of settled sales, for test assertions.
    pub fn sales_count(&self) -> usize {
        self.lock().sales.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory backend mutex poisoned")
    }

    fn ensure_online(t: &Tables) -> BackendResult<()> {
        if t.offline {
            Err(BackendError::Transport("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    /// Line revenue the way the procedure prices it: discounted gross
    /// plus tax at the product's rate.
    fn line_total_cents(t: &Tables, line: &SaleLineRow) -> i64 {
        let tax_rate = t
            .products
            .iter()
            .find(|p| p.id == line.product_id)
            .map(|p| p.tax_rate_bps)
            .unwrap_or(STANDARD_TAX_RATE_BPS);

        let subtotal = Money::from_cents(line.unit_price_cents)
            .times(line.quantity)
            .less_discount(Rate::from_bps(line.discount_bps));
        (subtotal + subtotal.tax(Rate::from_bps(tax_rate))).cents()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Port Implementation
// =============================================================================

#[async_trait]
impl PosBackend for MemoryBackend {
    async fn search_products(
        &self,
        query: &str,
        warehouse_id: &str,
    ) -> BackendResult<Vec<PosProduct>> {
        let t = self.lock();
        Self::ensure_online(&t)?;

        let needle = query.trim().to_lowercase();
        debug!(query = %needle, warehouse_id, "product search");

        let results: Vec<PosProduct> = t
            .products
            .iter()
            .filter(|p| {
                p.sku.to_lowercase().contains(&needle) || p.name.to_lowercase().contains(&needle)
            })
            .filter_map(|p| {
                // only products stocked in this warehouse, with live quantity
                let on_hand = t
                    .stock
                    .get(&(warehouse_id.to_string(), p.id.clone()))
                    .copied()?;
                let mut row = p.clone();
                row.available_stock = on_hand;
                Some(row)
            })
            .take(SEARCH_PAGE_SIZE)
            .collect();

        Ok(results)
    }

    async fn validate_cart_stock(
        &self,
        warehouse_id: &str,
        lines: Vec<StockCheckRow>,
    ) -> BackendResult<StockValidation> {
        let t = self.lock();
        Self::ensure_online(&t)?;

        let items: Vec<StockCheckItem> = lines
            .iter()
            .map(|row| {
                let on_hand = t
                    .stock
                    .get(&(warehouse_id.to_string(), row.product_id.clone()))
                    .copied()
                    .unwrap_or(0);
                let product_name = t
                    .products
                    .iter()
                    .find(|p| p.id == row.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| row.product_id.clone());
                StockCheckItem {
                    product_name,
                    is_sufficient: on_hand >= row.quantity,
                }
            })
            .collect();

        Ok(StockValidation {
            has_stock_errors: items.iter().any(|i| !i.is_sufficient),
            items,
        })
    }

    async fn process_sale(&self, request: SaleRequest) -> BackendResult<SaleOutcome> {
        let mut t = self.lock();
        Self::ensure_online(&t)?;

        if let Some(message) = t.fail_next_sale.take() {
            return Ok(SaleOutcome {
                success: false,
                error: Some(message),
                sales_doc_id: None,
                document_number: None,
            });
        }

        let session = t
            .sessions
            .iter()
            .find(|s| s.id == request.session_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                entity: "Session".to_string(),
                id: request.session_id.clone(),
            })?;

        if !session.is_open() {
            return Ok(SaleOutcome {
                success: false,
                error: Some("session is not open".to_string()),
                sales_doc_id: None,
                document_number: None,
            });
        }

        // atomic re-check: all lines must be satisfiable before any
        // deduction happens
        let warehouse_id = session.warehouse_id.clone();
        let mut short: Vec<String> = Vec::new();
        for line in &request.lines {
            let on_hand = t
                .stock
                .get(&(warehouse_id.clone(), line.product_id.clone()))
                .copied()
                .unwrap_or(0);
            if on_hand < line.quantity {
                let name = t
                    .products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| line.product_id.clone());
                short.push(name);
            }
        }
        if !short.is_empty() {
            return Ok(SaleOutcome {
                success: false,
                error: Some(format!("insufficient stock for: {}", short.join(", "))),
                sales_doc_id: None,
                document_number: None,
            });
        }

        for line in &request.lines {
            let key = (warehouse_id.clone(), line.product_id.clone());
            if let Some(on_hand) = t.stock.get_mut(&key) {
                *on_hand -= line.quantity;
            }
        }

        let document_number = format!("{}-{:08}", DEFAULT_SERIES, t.next_doc_number);
        t.next_doc_number += 1;

        let total_cents: i64 = request
            .lines
            .iter()
            .map(|l| Self::line_total_cents(&t, l))
            .sum();

        let sale_id = Uuid::new_v4().to_string();
        t.sales.push(RecordedSale {
            session_id: request.session_id.clone(),
            document_number: document_number.clone(),
            lines: request.lines,
            tenders: request.tenders,
            total_cents,
            sold_at: Utc::now(),
        });

        info!(sale_id = %sale_id, document_number = %document_number, total_cents, "sale settled");

        Ok(SaleOutcome {
            success: true,
            error: None,
            sales_doc_id: Some(sale_id),
            document_number: Some(document_number),
        })
    }

    async fn current_open_session(
        &self,
        user_id: &str,
        warehouse_id: &str,
    ) -> BackendResult<Option<Session>> {
        let t = self.lock();
        Self::ensure_online(&t)?;

        Ok(t.sessions
            .iter()
            .find(|s| s.user_id == user_id && s.warehouse_id == warehouse_id && s.is_open())
            .cloned())
    }

    async fn open_session(
        &self,
        user_id: &str,
        warehouse_id: &str,
        opening_cents: i64,
        notes: Option<String>,
    ) -> BackendResult<Session> {
        let mut t = self.lock();
        Self::ensure_online(&t)?;

        // the uniqueness constraint the hosted backend enforces with a
        // partial unique index
        let already_open = t
            .sessions
            .iter()
            .any(|s| s.user_id == user_id && s.warehouse_id == warehouse_id && s.is_open());
        if already_open {
            return Err(BackendError::Conflict {
                message: format!("open session already exists for user {user_id}"),
            });
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            warehouse_id: warehouse_id.to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cents,
            closing_cents: None,
            expected_cents: None,
            difference_cents: None,
            status: SessionStatus::Open,
            notes,
        };
        t.sessions.push(session.clone());

        info!(session_id = %session.id, opening_cents, "session opened");
        Ok(session)
    }

    async fn close_session(
        &self,
        session_id: &str,
        closing_cents: i64,
        expected_cents: i64,
        difference_cents: i64,
        notes: Option<String>,
    ) -> BackendResult<Session> {
        let mut t = self.lock();
        Self::ensure_online(&t)?;

        let session = t
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| BackendError::NotFound {
                entity: "Session".to_string(),
                id: session_id.to_string(),
            })?;

        if !session.is_open() {
            return Err(BackendError::Conflict {
                message: format!("session {session_id} is already closed"),
            });
        }

        session.status = SessionStatus::Closed;
        session.closed_at = Some(Utc::now());
        session.closing_cents = Some(closing_cents);
        session.expected_cents = Some(expected_cents);
        session.difference_cents = Some(difference_cents);
        if notes.is_some() {
            session.notes = notes;
        }

        info!(session_id, closing_cents, difference_cents, "session closed");
        Ok(session.clone())
    }

    async fn expected_cash(&self, session_id: &str) -> BackendResult<ExpectedCash> {
        let t = self.lock();
        Self::ensure_online(&t)?;

        let cash_sales_cents = t
            .sales
            .iter()
            .filter(|s| s.session_id == session_id)
            .flat_map(|s| s.tenders.iter())
            .filter(|p| p.kind == TenderKind::Cash)
            .map(|p| p.amount_cents)
            .sum();

        Ok(ExpectedCash { cash_sales_cents })
    }

    async fn session_stats(&self, session_id: &str) -> BackendResult<SessionStats> {
        let t = self.lock();
        Self::ensure_online(&t)?;

        let today = Utc::now().date_naive();
        let sales: Vec<&RecordedSale> = t
            .sales
            .iter()
            .filter(|s| s.session_id == session_id && s.sold_at.date_naive() == today)
            .collect();

        let today_transactions = sales.len() as i64;
        let today_sales_cents: i64 = sales.iter().map(|s| s.total_cents).sum();
        let average_ticket_cents = if today_transactions > 0 {
            today_sales_cents / today_transactions
        } else {
            0
        };

        // best sellers by revenue
        let mut by_product: HashMap<String, (i64, i64)> = HashMap::new();
        for sale in &sales {
            for line in &sale.lines {
                let entry = by_product.entry(line.product_id.clone()).or_insert((0, 0));
                entry.0 += line.quantity;
                entry.1 += Self::line_total_cents(&t, line);
            }
        }
        let mut top_products: Vec<TopProduct> = by_product
            .into_iter()
            .map(|(product_id, (quantity, revenue_cents))| {
                let name = t
                    .products
                    .iter()
                    .find(|p| p.id == product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| product_id.clone());
                TopProduct {
                    product_id,
                    name,
                    quantity,
                    revenue_cents,
                }
            })
            .collect();
        top_products.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
        top_products.truncate(5);

        // takings by payment method
        let mut by_kind: HashMap<TenderKind, i64> = HashMap::new();
        for sale in &sales {
            for tender in &sale.tenders {
                *by_kind.entry(tender.kind).or_insert(0) += tender.amount_cents;
            }
        }
        let tendered_total: i64 = by_kind.values().sum();
        let mut tender_breakdown: Vec<TenderBreakdown> = by_kind
            .into_iter()
            .map(|(kind, amount_cents)| TenderBreakdown {
                kind,
                amount_cents,
                percentage: if tendered_total > 0 {
                    amount_cents as f64 / tendered_total as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        tender_breakdown.sort_by(|a, b| b.amount_cents.cmp(&a.amount_cents));

        Ok(SessionStats {
            today_sales_cents,
            today_transactions,
            average_ticket_cents,
            top_products,
            tender_breakdown,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
