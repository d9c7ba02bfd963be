//! # Orchestration Error Types
//!
//! What the UI layer sees when a service call does not go through.
//! Local validation failures arrive as [`caja_core::CoreError`], remote
//! failures as [`caja_backend::BackendError`]; the variants in between
//! are the settlement-specific outcomes the operator acts on.

use thiserror::Error;

use caja_backend::BackendError;
use caja_core::CoreError;

/// Errors surfaced by the POS services.
#[derive(Debug, Error)]
pub enum PosError {
    /// Local validation or business rule rejection; never reached the
    /// network.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Remote or transport failure from the backend port.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Pre-flight stock check named products that cannot be satisfied.
    /// The cart is preserved for correction.
    #[error("insufficient stock for: {}", products.join(", "))]
    InsufficientStock { products: Vec<String> },

    /// The stock check itself failed, so sufficiency is unknown.
    /// Settlement is blocked conservatively.
    #[error("stock availability could not be verified")]
    StockUnverified,

    /// The atomic procedure ran and rejected the sale. Cart and tenders
    /// are untouched; the operator may retry.
    #[error("sale rejected: {message}")]
    SaleRejected { message: String },
}

/// Convenience alias for Results with [`PosError`].
pub type PosResult<T> = Result<T, PosError>;
