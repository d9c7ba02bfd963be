//! # caja-core: Pure Business Logic for Caja POS
//!
//! This crate is the heart of the point-of-sale workflow. It owns every
//! rule that can be decided without talking to the backend: cart pricing,
//! tender accumulation, the sale-completion gate, and cash-session
//! arithmetic.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                      Browser UI (ERP frontend)                │  │
//! │  │    Search ──► Cart ──► Tenders ──► Complete ──► Receipt       │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │                caja-pos (services / orchestration)            │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │               ★ caja-core (THIS CRATE) ★                      │  │
//! │  │                                                               │  │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐  │  │
//! │  │   │  money  │ │  cart   │ │ tender  │ │ session │ │ types/ │  │  │
//! │  │   │  Money  │ │  Cart   │ │ Ledger  │ │  math   │ │ valid. │  │  │
//! │  │   │  Rate   │ │CartLine │ │  gate   │ │         │ │        │  │  │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └────────┘  │  │
//! │  │                                                               │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │          caja-backend (remote procedure contracts)            │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer [`Money`] and basis-point [`Rate`] arithmetic
//! - [`types`] - Domain types shared with the UI (Product, Customer, Sale)
//! - [`cart`] - The cart manager: stock-bound lines and price aggregates
//! - [`tender`] - Payment tender tracking and the completion gate
//! - [`session`] - Cash-session lifecycle arithmetic
//! - [`validation`] - Field-level business rule validation
//! - [`error`] - Typed domain errors
//!
//! ## Design Principles
//!
//! 1. **Pure**: same input, same output; no hidden state
//! 2. **No I/O**: the backend boundary lives in caja-backend, not here
//! 3. **Integer money**: every amount is i64 cents, every rate is u32
//!    basis points; no floating point in the settlement path
//! 4. **Typed errors**: rejections are enum variants, never strings

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod session;
pub mod tender;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use session::{Session, SessionStatus};
pub use tender::{can_complete_sale, Tender, TenderKind, TenderLedger};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Standard tax rate applied when a product carries no explicit rate,
/// in basis points (1800 = 18%, the IGV value-added rate).
pub const STANDARD_TAX_RATE_BPS: u32 = 1800;

/// Overpayment tolerance applied when adding tenders, in basis points.
///
/// Cumulative tendered amount may exceed the cart total by at most 10%,
/// covering cash rounding and change scenarios. The constant is inherited
/// from the business rules as-is; widen or narrow it only with the
/// stakeholders who own cash handling.
pub const OVERPAYMENT_TOLERANCE_BPS: u32 = 1000;

/// Maximum number of distinct lines in a single cart.
///
/// Prevents runaway carts and keeps settlement payloads bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line.
///
/// Guards against fat-finger quantities (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Product search returns at most this many rows.
pub const SEARCH_PAGE_SIZE: usize = 20;

/// Product search requires at least this many characters.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Maximum accepted search query length.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

/// Session statistics are refreshed on this fixed interval while a
/// session is open.
pub const STATS_POLL_INTERVAL_SECS: u64 = 30;

/// Document type code for POS sales documents (boleta).
pub const DEFAULT_DOC_TYPE: &str = "03";

/// Document series assigned to POS sales; the backend numbers within it.
pub const DEFAULT_SERIES: &str = "B001";
