//! # caja-backend: Remote Backend Contracts
//!
//! The POS core never talks to the hosted database directly: everything
//! goes through the [`PosBackend`] port defined here. The port mirrors
//! the remote procedures the backend exposes: warehouse-scoped product
//! search, pre-flight stock validation, the atomic sale procedure,
//! session CRUD, and the session statistics/expected-cash computations.
//!
//! ## The Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   client (caja-pos)                 backend (remote)                │
//! │                                                                     │
//! │   validate_cart_stock ───────────►  read-only stock check          │
//! │        │ (advisory, racy)                                           │
//! │        ▼                                                            │
//! │   process_sale ──────────────────►  ONE atomic procedure:          │
//! │                                     deduct stock, post ledger,      │
//! │                                     assign document number,         │
//! │                                     record payments                 │
//! │                                                                     │
//! │   The client holds no transaction semantics of its own. A          │
//! │   structured failure or transport error leaves client state        │
//! │   untouched; the operator retries.                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`MemoryBackend`] implements the full port in memory and is the test
//! double the orchestration crate runs against.

pub mod error;
pub mod memory;
pub mod port;
pub mod types;

pub use error::{BackendError, BackendResult};
pub use memory::MemoryBackend;
pub use port::PosBackend;
pub use types::{
    ExpectedCash, SaleLineRow, SaleOutcome, SaleRequest, StockCheckItem, StockCheckRow,
    StockValidation, TenderRow,
};
