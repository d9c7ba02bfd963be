//! # Payment Tenders
//!
//! Accumulation of payment instruments against the cart total, and the
//! derived completion gate.
//!
//! ## Split Tendering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Cart total: 23.60                                                  │
//! │                                                                     │
//! │  CASH  20.00   ──►  remaining  3.60   change 0.00                   │
//! │  CARD   5.00   ──►  remaining  0.00   change 1.40                   │
//! │                                                                     │
//! │  Cumulative tendered may exceed the total by at most 10%            │
//! │  (OVERPAYMENT_TOLERANCE_BPS) to cover cash rounding; anything       │
//! │  beyond that rejects and leaves the ledger unchanged.               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::types::Customer;
use crate::validation::validate_tender_amount;
use crate::OVERPAYMENT_TOLERANCE_BPS;

// =============================================================================
// Tender Types
// =============================================================================

/// A payment instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderKind {
    Cash,
    Card,
    Transfer,
}

/// One payment applied toward the current cart's total.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub kind: TenderKind,

    /// Amount in cents; always positive.
    pub amount_cents: i64,

    /// External reference (transfer operation number, voucher).
    pub reference: Option<String>,

    /// Card brand, for card tenders.
    pub card_type: Option<String>,

    /// Terminal authorization code, for card tenders.
    pub auth_code: Option<String>,
}

impl Tender {
    /// A bare cash tender.
    pub fn cash(amount_cents: i64) -> Self {
        Tender {
            kind: TenderKind::Cash,
            amount_cents,
            reference: None,
            card_type: None,
            auth_code: None,
        }
    }

    /// A card tender with its authorization trail.
    pub fn card(amount_cents: i64, card_type: impl Into<String>, auth_code: impl Into<String>) -> Self {
        Tender {
            kind: TenderKind::Card,
            amount_cents,
            reference: None,
            card_type: Some(card_type.into()),
            auth_code: Some(auth_code.into()),
        }
    }

    /// The amount as [`Money`].
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn is_cash(&self) -> bool {
        self.kind == TenderKind::Cash
    }
}

// =============================================================================
// Tender Ledger
// =============================================================================

/// The ordered list of tenders applied to the sale in progress.
///
/// Cleared together with the cart and the selected customer by the
/// register's reset; never on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderLedger {
    tenders: Vec<Tender>,
}

impl TenderLedger {
    pub fn new() -> Self {
        TenderLedger::default()
    }

    /// Read access to the tenders, in the order applied.
    #[inline]
    pub fn tenders(&self) -> &[Tender] {
        &self.tenders
    }

    /// Appends a tender.
    ///
    /// Rejects non-positive amounts, and rejects any tender that would
    /// push the cumulative amount past the cart total plus the
    /// overpayment tolerance. On rejection the ledger is unchanged.
    pub fn add(&mut self, tender: Tender, cart_total: Money) -> CoreResult<()> {
        validate_tender_amount(tender.amount_cents)?;

        let limit = cart_total.with_tolerance(Rate::from_bps(OVERPAYMENT_TOLERANCE_BPS));
        let after = self.total_tendered() + tender.amount();
        if after > limit {
            return Err(CoreError::OverpaymentExceeded {
                tendered_cents: after.cents(),
                limit_cents: limit.cents(),
            });
        }

        self.tenders.push(tender);
        Ok(())
    }

    /// Removes the tender at `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.tenders.len() {
            self.tenders.remove(index);
            true
        } else {
            false
        }
    }

    /// Empties the ledger.
    pub fn clear(&mut self) {
        self.tenders.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tenders.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tenders.len()
    }

    /// Σ tender amounts.
    pub fn total_tendered(&self) -> Money {
        self.tenders.iter().map(|t| t.amount()).sum()
    }

    /// Σ cash tender amounts; feeds the session's expected-cash math.
    pub fn cash_tendered(&self) -> Money {
        self.tenders
            .iter()
            .filter(|t| t.is_cash())
            .map(|t| t.amount())
            .sum()
    }

    /// Change owed to the customer: max(0, tendered − total).
    pub fn change_due(&self, cart_total: Money) -> Money {
        let tendered = self.total_tendered();
        if tendered > cart_total {
            tendered - cart_total
        } else {
            Money::zero()
        }
    }

    /// Amount still to collect: max(0, total − tendered).
    pub fn remaining(&self, cart_total: Money) -> Money {
        let tendered = self.total_tendered();
        if cart_total > tendered {
            cart_total - tendered
        } else {
            Money::zero()
        }
    }
}

// =============================================================================
// Completion Gate
// =============================================================================

/// Whether the "complete sale" action may be offered.
///
/// True iff the cart is non-empty, a customer is selected, and the sale
/// is fully paid. Purely derived; recompute whenever cart, tenders, or
/// customer change. Advisory only: the backend re-validates stock and
/// totals and remains the final authority.
pub fn can_complete_sale(cart: &Cart, customer: Option<&Customer>, tenders: &TenderLedger) -> bool {
    !cart.is_empty() && customer.is_some() && tenders.total_tendered() >= cart.total()
}

// =============================================================================
// Unit Tests
// =============================================================================
