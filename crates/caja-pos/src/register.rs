//! # Register State
//!
//! The POS screen's exclusive in-memory state: the cart, the tenders
//! applied against it, the selected customer, and the selected
//! warehouse. No other part of the system mutates these.
//!
//! ## Mutation Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  UI event ──► Register method ──► caja-core rule check              │
//! │                     │                                               │
//! │          Ok ────────┼──────── Err                                   │
//! │           │                    │                                    │
//! │   state mutated,        state untouched,                            │
//! │   success/info toast    error toast with the rule's message         │
//! │                                                                     │
//! │  Methods return bool (did the mutation land), not Result: a         │
//! │  rejection is terminal here: the operator was told, the UI          │
//! │  moves on.                                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `reset` clears cart, tenders, and customer in one operation. The
//! three are one lifecycle: a partially-cleared register (empty cart,
//! stale tenders) must be unrepresentable between UI events.

use std::sync::{Arc, Mutex};

use tracing::debug;

use caja_core::{
    can_complete_sale, Cart, CartTotals, Customer, Money, PosProduct, Rate, Tender, TenderLedger,
};

use crate::notify::Notifier;

// =============================================================================
// Register
// =============================================================================

/// One POS screen's working state.
pub struct Register {
    cart: Cart,
    tenders: TenderLedger,
    customer: Option<Customer>,
    warehouse_id: Option<String>,
    notifier: Arc<dyn Notifier>,
}

impl Register {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Register {
            cart: Cart::new(),
            tenders: TenderLedger::new(),
            customer: None,
            warehouse_id: None,
            notifier,
        }
    }

    // --- Selection ---

    /// Selects the warehouse searches and stock checks are scoped to.
    pub fn select_warehouse(&mut self, warehouse_id: impl Into<String>) {
        self.warehouse_id = Some(warehouse_id.into());
    }

    #[inline]
    pub fn warehouse_id(&self) -> Option<&str> {
        self.warehouse_id.as_deref()
    }

    pub fn select_customer(&mut self, customer: Customer) {
        debug!(customer_id = %customer.id, "customer selected");
        self.customer = Some(customer);
    }

    pub fn clear_customer(&mut self) {
        self.customer = None;
    }

    #[inline]
    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    // --- Cart Mutations ---

    /// Adds a product to the cart; merges into an existing line.
    pub fn add_product(&mut self, product: &PosProduct, quantity: i64) -> bool {
        match self.cart.add_product(product, quantity) {
            Ok(()) => {
                self.notifier.success("Product added to cart");
                true
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        match self.cart.set_quantity(product_id, quantity) {
            Ok(()) => true,
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    /// Sets a line's discount rate.
    pub fn set_discount(&mut self, product_id: &str, rate: Rate) -> bool {
        match self.cart.set_discount(product_id, rate) {
            Ok(()) => true,
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    /// Removes a line; absent lines are a silent no-op.
    pub fn remove_product(&mut self, product_id: &str) -> bool {
        let removed = self.cart.remove_product(product_id);
        if removed {
            self.notifier.info("Product removed from cart");
        }
        removed
    }

    // --- Tender Mutations ---

    /// Applies a tender against the current cart total.
    pub fn add_tender(&mut self, tender: Tender) -> bool {
        match self.tenders.add(tender, self.cart.total()) {
            Ok(()) => {
                self.notifier.success("Payment added");
                true
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    /// Removes the tender at `index`; out of range is a silent no-op.
    pub fn remove_tender(&mut self, index: usize) -> bool {
        let removed = self.tenders.remove(index);
        if removed {
            self.notifier.info("Payment removed");
        }
        removed
    }

    // --- Derived State ---

    #[inline]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    #[inline]
    pub fn tenders(&self) -> &TenderLedger {
        &self.tenders
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn change_due(&self) -> Money {
        self.tenders.change_due(self.cart.total())
    }

    pub fn remaining(&self) -> Money {
        self.tenders.remaining(self.cart.total())
    }

    /// The completion gate: non-empty cart, selected customer, fully
    /// paid. Recomputed on demand; never cached.
    pub fn can_complete_sale(&self) -> bool {
        can_complete_sale(&self.cart, self.customer.as_ref(), &self.tenders)
    }

    // --- Lifecycle ---

    /// Clears cart, tenders, and customer atomically. Idempotent.
    ///
    /// Called after settlement succeeds or the operator cancels; the
    /// warehouse selection survives because the next sale happens at the
    /// same counter.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.tenders.clear();
        self.customer = None;
        debug!("register reset");
    }
}

// =============================================================================
// Shared Register State
// =============================================================================

/// `Register` behind `Arc<Mutex>` for concurrent UI commands.
///
/// Operations on the register are quick and mostly writes, so a plain
/// Mutex with scoped accessors is enough.
#[derive(Clone)]
pub struct RegisterState {
    inner: Arc<Mutex<Register>>,
}

impl RegisterState {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        RegisterState {
            inner: Arc::new(Mutex::new(Register::new(notifier))),
        }
    }

    /// Runs `f` with read access to the register.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Register) -> R,
    {
        let register = self.inner.lock().expect("register mutex poisoned");
        f(&register)
    }

    /// Runs `f` with write access to the register.
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Register) -> R,
    {
        let mut register = self.inner.lock().expect("register mutex poisoned");
        f(&mut register)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

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
            tax_rate_bps: caja_core::STANDARD_TAX_RATE_BPS,
            image_url: None,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: "c1".to_string(),
            document_type: "DNI".to_string(),
            document_number: "12345678".to_string(),
            name: "Cliente Varios".to_string(),
            email: None,
            phone: None,
            address: None,
            is_frequent: false,
        }
    }

    fn register_with(notifier: Arc<MemoryNotifier>) -> Register {
        Register::new(notifier)
    }

    #[test]
    fn test_add_product_notifies_success() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier.clone());

        assert!(register.add_product(&product("p1", 1000, 5), 2));
        assert_eq!(notifier.titles(), vec!["Product added to cart"]);
        assert_eq!(register.totals().total_cents, 2360);
    }

    #[test]
    fn test_rejection_notifies_and_leaves_state() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier.clone());
        register.add_product(&product("p1", 1000, 5), 2);

        // scenario: stock is 5, asking for 6 must bounce
        assert!(!register.set_quantity("p1", 6));
        assert_eq!(register.cart().lines()[0].quantity, 2);

        let last = notifier.last().unwrap();
        assert!(last.title.contains("Insufficient stock"));
    }

    #[test]
    fn test_full_payment_flow() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier);

        register.add_product(&product("p1", 1000, 5), 2);
        register.select_customer(customer());
        assert!(!register.can_complete_sale());

        assert!(register.add_tender(Tender::cash(2500)));
        assert_eq!(register.change_due().cents(), 140);
        assert_eq!(register.remaining().cents(), 0);
        assert!(register.can_complete_sale());
    }

    #[test]
    fn test_gate_requires_customer() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier);

        register.add_product(&product("p1", 1000, 5), 2);
        register.add_tender(Tender::cash(2360));
        assert!(!register.can_complete_sale());

        register.select_customer(customer());
        assert!(register.can_complete_sale());
    }

    #[test]
    fn test_overpayment_rejected() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier.clone());

        register.add_product(&product("p1", 1000, 5), 2);
        assert!(!register.add_tender(Tender::cash(2600)));
        assert!(register.tenders().is_empty());
    }

    #[test]
    fn test_reset_clears_everything_and_is_idempotent() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier);

        register.select_warehouse("wh-1");
        register.add_product(&product("p1", 1000, 5), 2);
        register.select_customer(customer());
        register.add_tender(Tender::cash(2500));

        register.reset();
        assert!(register.cart().is_empty());
        assert!(register.tenders().is_empty());
        assert!(register.customer().is_none());
        // the counter keeps its warehouse
        assert_eq!(register.warehouse_id(), Some("wh-1"));

        // calling twice has the same effect as once
        register.reset();
        assert!(register.cart().is_empty());
        assert!(register.tenders().is_empty());
        assert!(register.customer().is_none());
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut register = register_with(notifier.clone());

        assert!(!register.remove_product("ghost"));
        assert!(!register.remove_tender(3));
        assert!(notifier.titles().is_empty());
    }

    #[test]
    fn test_register_state_accessors() {
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let state = RegisterState::new(notifier);

        state.with_mut(|r| r.add_product(&product("p1", 1000, 5), 1));
        let total = state.with(|r| r.totals().total_cents);
        assert_eq!(total, 1180);
    }
}
