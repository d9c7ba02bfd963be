//! # Cash Session
//!
//! A cashier's bounded working period with an opening and closing cash
//! count.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   NO SESSION ──open──►  OPEN  ──close──►  CLOSED (terminal)         │
//! │                                                                     │
//! │   open:  opening_cents >= 0, no OPEN session for (user, warehouse)  │
//! │   close: expected = opening + cash sales during the session         │
//! │          difference = closing − expected                            │
//! │                                                                     │
//! │   A closed session is never reopened; a new one is created.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module holds only the pure decisions: status, arithmetic, and
//! the open/close guards. Persistence and the remote expected-cash query
//! live behind the backend port; the uniqueness of the OPEN session is
//! ultimately the backend's constraint, not a client-side lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Session Status
// =============================================================================

/// Session state; transitions OPEN → CLOSED only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

// =============================================================================
// Session
// =============================================================================

/// One cash-drawer working period.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub warehouse_id: String,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Cash counted into the drawer at open.
    pub opening_cents: i64,

    /// Cash counted out at close.
    pub closing_cents: Option<i64>,

    /// opening + cash sales during the session; computed at close.
    pub expected_cents: Option<i64>,

    /// closing − expected; negative means the drawer is short.
    /// Meaningful only once the session is CLOSED.
    pub difference_cents: Option<i64>,

    pub status: SessionStatus,
    pub notes: Option<String>,
}

impl Session {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Guards operations that require an OPEN session.
    pub fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::SessionNotOpen)
        }
    }
}

// =============================================================================
// Session Arithmetic
// =============================================================================

/// Cash expected in the drawer: opening amount plus cash sales.
#[inline]
pub fn expected_cash_cents(opening_cents: i64, cash_sales_cents: i64) -> i64 {
    opening_cents + cash_sales_cents
}

/// Drawer variance at close: counted minus expected.
#[inline]
pub fn variance_cents(closing_cents: i64, expected_cents: i64) -> i64 {
    closing_cents - expected_cents
}

// =============================================================================
// Derived Guards
// =============================================================================

/// A new session may open only when none is currently open.
pub fn can_open_session(current: Option<&Session>) -> bool {
    !matches!(current, Some(s) if s.is_open())
}

/// A session may close only while one is open.
pub fn can_close_session(current: Option<&Session>) -> bool {
    matches!(current, Some(s) if s.is_open())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session() -> Session {
        Session {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            warehouse_id: "w1".to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cents: 10000,
            closing_cents: None,
            expected_cents: None,
            difference_cents: None,
            status: SessionStatus::Open,
            notes: None,
        }
    }

    #[test]
    fn test_variance_math() {
        // open 100.00, cash sales 250.00, counted 345.00 → expected
        // 350.00, drawer short by 5.00
        let expected = expected_cash_cents(10000, 25000);
        assert_eq!(expected, 35000);
        assert_eq!(variance_cents(34500, expected), -500);
    }

    #[test]
    fn test_variance_over() {
        let expected = expected_cash_cents(5000, 1000);
        assert_eq!(variance_cents(6100, expected), 100);
    }

    #[test]
    fn test_guards() {
        let open = open_session();
        let mut closed = open_session();
        closed.status = SessionStatus::Closed;

        assert!(can_open_session(None));
        assert!(can_open_session(Some(&closed)));
        assert!(!can_open_session(Some(&open)));

        assert!(can_close_session(Some(&open)));
        assert!(!can_close_session(Some(&closed)));
        assert!(!can_close_session(None));
    }

    #[test]
    fn test_ensure_open() {
        let open = open_session();
        assert!(open.ensure_open().is_ok());

        let mut closed = open_session();
        closed.status = SessionStatus::Closed;
        assert!(matches!(
            closed.ensure_open().unwrap_err(),
            CoreError::SessionNotOpen
        ));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Open).unwrap(),
            "\"OPEN\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Closed).unwrap(),
            "\"CLOSED\""
        );
    }
}
