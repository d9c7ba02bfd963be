//! # Cart Manager
//!
//! The ordered collection of cart lines and the pricing math over it.
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  add_product(p, qty)     qty <= 0, over stock, over max → reject    │
//! │                          same product already in cart → merge,      │
//! │                          re-validating the summed quantity          │
//! │  set_quantity(id, qty)   qty <= 0 → remove line (Ok)                │
//! │                          over stock / over max → reject, unchanged  │
//! │  set_discount(id, rate)  rate > 100% → reject, unchanged            │
//! │  remove_product(id)      absent → no-op, not an error               │
//! │  clear()                 lines only; tenders and customer are the   │
//! │                          register's to reset                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rejection leaves the cart exactly as it was. The stock cap uses
//! the `available_stock` snapshot taken when the product was added; it is
//! advisory (the backend re-checks atomically at settlement), but it is
//! enforced on every mutation so the operator hears about shortages while
//! the customer is still at the counter.
//!
//! ## Line Pricing
//!
//! ```text
//! gross    = unit_price × quantity
//! subtotal = gross − discount portion
//! tax      = subtotal × tax rate        (tax applies after discount)
//! total    = subtotal + tax
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::types::PosProduct;
use crate::validation::{validate_cart_size, validate_discount_bps, validate_quantity};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the active cart.
///
/// Price, tax rate, and the stock snapshot are frozen at add time: a
/// catalog update after the product is in the cart does not reprice the
/// line the customer was quoted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product id (UUID), unique within the cart.
    pub product_id: String,

    /// SKU at add time (frozen).
    pub sku: String,

    /// Product name at add time (frozen).
    pub name: String,

    /// Quantity in the cart; always positive.
    pub quantity: i64,

    /// Unit price in cents at add time (frozen).
    pub unit_price_cents: i64,

    /// Line discount in basis points, 0 to 10000.
    pub discount_bps: u32,

    /// Tax rate in basis points at add time (frozen).
    pub tax_rate_bps: u32,

    /// Stock on hand when the product was added; advisory quantity cap.
    pub available_stock: i64,

    /// When the line was created.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &PosProduct, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            quantity,
            unit_price_cents: product.price_cents,
            discount_bps: 0,
            tax_rate_bps: product.tax_rate_bps,
            available_stock: product.available_stock,
            added_at: Utc::now(),
        }
    }

    /// Unit price as [`Money`].
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line amount before discount: unit price × quantity.
    pub fn gross(&self) -> Money {
        self.unit_price().times(self.quantity)
    }

    /// Line amount after discount, before tax.
    pub fn subtotal(&self) -> Money {
        self.gross().less_discount(Rate::from_bps(self.discount_bps))
    }

    /// The amount actually deducted by this line's discount.
    pub fn discount(&self) -> Money {
        self.gross() - self.subtotal()
    }

    /// Tax on the discounted subtotal.
    pub fn tax(&self) -> Money {
        self.subtotal().tax(Rate::from_bps(self.tax_rate_bps))
    }

    /// Line total: subtotal plus tax.
    pub fn total(&self) -> Money {
        self.subtotal() + self.tax()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The active cart: ordered lines, unique by product id.
///
/// Owned exclusively by the register; not persisted (there is no cart
/// abandonment recovery; the whole cart dies with the screen).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created or last cleared.
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Read access to the lines, in insertion order.
    #[inline]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Adds a product, merging into an existing line of the same product.
    ///
    /// A merge re-validates the *summed* quantity against stock, so two
    /// small adds cannot sneak past a cap one large add would hit.
    pub fn add_product(&mut self, product: &PosProduct, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.find_mut(&product.id) {
            let merged = line.quantity + quantity;
            validate_quantity(merged)?;
            if merged > product.available_stock {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.available_stock,
                    requested: merged,
                });
            }
            line.quantity = merged;
            return Ok(());
        }

        if quantity > product.available_stock {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.available_stock,
                requested: quantity,
            });
        }

        validate_cart_size(self.lines.len())?;
        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets a line's quantity.
    ///
    /// Zero or negative removes the line; a quantity above the stock
    /// snapshot rejects and leaves the line unchanged.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_product(product_id);
            return Ok(());
        }

        validate_quantity(quantity)?;

        let line = self
            .find_mut(product_id)
            .ok_or_else(|| CoreError::LineNotFound {
                product_id: product_id.to_string(),
            })?;

        if quantity > line.available_stock {
            return Err(CoreError::InsufficientStock {
                name: line.name.clone(),
                available: line.available_stock,
                requested: quantity,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Sets a line's discount rate.
    pub fn set_discount(&mut self, product_id: &str, rate: Rate) -> CoreResult<()> {
        validate_discount_bps(rate.bps())?;

        let line = self
            .find_mut(product_id)
            .ok_or_else(|| CoreError::LineNotFound {
                product_id: product_id.to_string(),
            })?;

        line.discount_bps = rate.bps();
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed; a missing
    /// line is a no-op, not an error.
    pub fn remove_product(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line subtotal (post-discount, pre-tax).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal()).sum()
    }

    /// Σ line tax.
    pub fn tax_amount(&self) -> Money {
        self.lines.iter().map(|l| l.tax()).sum()
    }

    /// Σ amount actually deducted by line discounts.
    pub fn discount_amount(&self) -> Money {
        self.lines.iter().map(|l| l.discount()).sum()
    }

    /// Grand total: Σ line total. Discounts are already inside the
    /// subtotal, so nothing is deducted twice.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.total()).sum()
    }

    /// All aggregates in one pass, for the UI summary panel.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: self.line_count(),
            total_quantity: self.total_quantity(),
            subtotal_cents: self.subtotal().cents(),
            tax_cents: self.tax_amount().cents(),
            discount_cents: self.discount_amount().cents(),
            total_cents: self.total().cents(),
        }
    }

    fn find_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart aggregate summary handed to the UI.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, stock: i64) -> PosProduct {
        PosProduct {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            brand_name: None,
            category_name: None,
            unit_code: "NIU".to_string(),
            price_cents,
            available_stock: stock,
            min_stock: 0,
            is_serialized: false,
            tax_rate_bps: crate::STANDARD_TAX_RATE_BPS,
            image_url: None,
        }
    }

    #[test]
    fn test_line_pricing() {
        // price 10.00 × 2 at 18% tax: subtotal 20.00, tax 3.60, total 23.60
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.subtotal().cents(), 2000);
        assert_eq!(line.tax().cents(), 360);
        assert_eq!(line.total().cents(), 2360);
        assert_eq!(cart.total().cents(), 2360);
    }

    #[test]
    fn test_line_pricing_with_discount() {
        // gross 20.00, 10% discount → subtotal 18.00, tax 3.24, total 21.24
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();
        cart.set_discount("abc", Rate::from_bps(1000)).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.gross().cents(), 2000);
        assert_eq!(line.subtotal().cents(), 1800);
        assert_eq!(line.discount().cents(), 200);
        assert_eq!(line.tax().cents(), 324);
        assert_eq!(line.total().cents(), 2124);
    }

    #[test]
    fn test_discount_aggregate_equals_deducted_amount() {
        // The aggregate reports what was actually taken off, and the
        // grand total never deducts it a second time.
        let mut cart = Cart::new();
        cart.add_product(&product("a", 1000, 10), 2).unwrap();
        cart.add_product(&product("b", 500, 10), 4).unwrap();
        cart.set_discount("a", Rate::from_bps(1000)).unwrap();

        assert_eq!(cart.discount_amount().cents(), 200);
        assert_eq!(cart.subtotal().cents(), 1800 + 2000);
        assert_eq!(
            cart.total().cents(),
            cart.subtotal().cents() + cart.tax_amount().cents()
        );
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let p = product("abc", 999, 10);

        cart.add_product(&p, 2).unwrap();
        cart.add_product(&p, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_rejects_over_stock() {
        let mut cart = Cart::new();
        let p = product("abc", 1000, 5);

        let err = cart.add_product(&p, 6).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_rejects_over_stock() {
        // Two adds that together exceed stock must fail on the second.
        let mut cart = Cart::new();
        let p = product("abc", 1000, 5);

        cart.add_product(&p, 3).unwrap();
        let err = cart.add_product(&p, 3).unwrap_err();

        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_rejects_nonpositive_quantity() {
        let mut cart = Cart::new();
        let p = product("abc", 1000, 5);

        assert!(cart.add_product(&p, 0).is_err());
        assert!(cart.add_product(&p, -1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_rejects_over_stock_and_keeps_line() {
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();

        let err = cart.set_quantity("abc", 6).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();

        cart.set_quantity("abc", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_line() {
        let mut cart = Cart::new();
        let err = cart.set_quantity("nope", 1).unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound { .. }));
    }

    #[test]
    fn test_set_discount_rejects_over_hundred_percent() {
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();

        let err = cart.set_discount("abc", Rate::from_bps(10001)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(cart.lines()[0].discount_bps, 0);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.remove_product("ghost"));
    }

    #[test]
    fn test_cart_full() {
        let mut cart = Cart::new();
        for i in 0..crate::MAX_CART_LINES {
            cart.add_product(&product(&format!("p{}", i), 100, 99), 1)
                .unwrap();
        }

        let err = cart
            .add_product(&product("one-too-many", 100, 99), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_quantity_cap_on_merge() {
        let mut cart = Cart::new();
        let p = product("abc", 100, 100_000);

        cart.add_product(&p, crate::MAX_LINE_QUANTITY).unwrap();
        assert!(cart.add_product(&p, 1).is_err());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total().cents(), 0);
    }

    #[test]
    fn test_totals_summary() {
        let mut cart = Cart::new();
        cart.add_product(&product("abc", 1000, 5), 2).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.subtotal_cents, 2000);
        assert_eq!(totals.tax_cents, 360);
        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.total_cents, 2360);
    }
}
