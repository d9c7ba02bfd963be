//! # Domain Types
//!
//! Shared domain types for the POS workflow: the product row the search
//! surface returns, the customer a sale is billed to, the immutable sale
//! record settlement produces, and the session statistics the dashboard
//! panel polls.
//!
//! All of these cross the UI boundary, so they derive ts-rs bindings the
//! same way the rest of the workspace does. Wire-format rows for the
//! remote procedures live in caja-backend, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::{Money, Rate};
use crate::tender::{Tender, TenderKind};

// =============================================================================
// Product
// =============================================================================

/// A product as returned by warehouse-scoped search, priced from the
/// default price list and carrying a live stock snapshot.
///
/// `available_stock` is advisory: it caps cart quantities client-side,
/// but the backend's atomic procedure is the real guard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosProduct {
    /// Unique identifier (UUID).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Brand name, when the catalog has one.
    pub brand_name: Option<String>,

    /// Category name, when the catalog has one.
    pub category_name: Option<String>,

    /// Unit of measure code (NIU, KGM, ...).
    pub unit_code: String,

    /// Unit price in cents from the default price list.
    pub price_cents: i64,

    /// Stock on hand in the selected warehouse at search time.
    pub available_stock: i64,

    /// Reorder threshold; display-only in the POS.
    pub min_stock: i64,

    /// Serialized products require per-unit tracking downstream.
    pub is_serialized: bool,

    /// Tax rate in basis points; defaults to the standard IGV rate.
    pub tax_rate_bps: u32,

    /// Optional catalog image.
    pub image_url: Option<String>,
}

impl PosProduct {
    /// The unit price as [`Money`].
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// The product's tax rate.
    #[inline]
    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// The party a sale is billed to.
///
/// Completion requires a selected customer; a walk-in default customer is
/// an ordinary row resolved by the caller, not a special case here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    /// Identity document type (DNI, RUC, ...).
    pub document_type: String,
    pub document_number: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Frequent customers sort first in lookup UIs.
    pub is_frequent: bool,
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a settled sale document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Settled and posted by the backend.
    Completed,
    /// Voided after completion.
    Cancelled,
}

/// An immutable record of a completed transaction.
///
/// Constructed only from a successful settlement response; the document
/// number inside is the one the backend assigned, never one invented
/// client-side. Lines and tenders are snapshots of the cart at the moment
/// of settlement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Sales document id assigned by the backend.
    pub id: String,
    pub session_id: String,
    pub customer_id: String,
    /// Document type code ("03" = boleta).
    pub doc_type: String,
    /// Document series ("B001").
    pub series: String,
    /// Number within the series, assigned by the backend.
    pub number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    /// Cart lines frozen at settlement.
    pub lines: Vec<CartLine>,
    /// Tenders frozen at settlement.
    pub tenders: Vec<Tender>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub notes: Option<String>,
}

impl Sale {
    /// The full document reference, e.g. `B001-00000042`.
    pub fn document_reference(&self) -> String {
        format!("{}-{}", self.series, self.number)
    }

    /// The grand total as [`Money`].
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Session Statistics
// =============================================================================

/// Aggregates for the open session's dashboard panel, computed remotely
/// and polled on a fixed interval.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub today_sales_cents: i64,
    pub today_transactions: i64,
    pub average_ticket_cents: i64,
    pub top_products: Vec<TopProduct>,
    pub tender_breakdown: Vec<TenderBreakdown>,
}

/// One row of the best-sellers list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// One row of the payment-method breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderBreakdown {
    pub kind: TenderKind,
    pub amount_cents: i64,
    /// Share of the day's takings; display-only.
    pub percentage: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
