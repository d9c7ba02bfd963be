//! # Error Types
//!
//! Typed domain errors for caja-core.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ValidationError   field-level input failures (quantity, rates)     │
//! │        │                                                            │
//! │        ▼ #[from]                                                    │
//! │  CoreError         business rule violations (stock cap, tolerance)  │
//! │        │                                                            │
//! │        ▼ #[from]  (in caja-pos)                                     │
//! │  PosError          orchestration failures seen by the UI layer      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant maps to a user-facing notification; none of them is a
//! crash state. A rejected operation always leaves state unchanged.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by cart, tender, and session logic.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the advisory stock snapshot.
    ///
    /// Raised on every cart mutation, not only at line creation, so a
    /// quantity edit can never sneak past the cap.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The cart already holds the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartFull { max: usize },

    /// The product has no line in the cart.
    #[error("Product {product_id} is not in the cart")]
    LineNotFound { product_id: String },

    /// Adding the tender would exceed the overpayment tolerance.
    #[error("Tendered {tendered_cents} exceeds the allowed maximum of {limit_cents}")]
    OverpaymentExceeded { tendered_cents: i64, limit_cents: i64 },

    /// An OPEN session already exists for this user and warehouse.
    #[error("A session is already open")]
    SessionAlreadyOpen,

    /// The operation requires an OPEN session.
    #[error("No open session")]
    SessionNotOpen,

    /// Field-level validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. a malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience alias for Results with [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
