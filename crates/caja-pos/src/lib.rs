//! # caja-pos: Point-of-Sale Orchestration
//!
//! The services that drive a sale from first scan to printed receipt.
//!
//! ## A Sale, End to End
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │  SessionService.open ──► Register (cart + tenders + customer)       │
//! │                               │                                     │
//! │                     add products, tenders                           │
//! │                               │                                     │
//! │                 can_complete_sale() == true                         │
//! │                               │                                     │
//! │                               ▼                                     │
//! │  CheckoutService.validate_stock ──► insufficient? name products,    │
//! │                               │     keep cart, stop                 │
//! │                               ▼                                     │
//! │  CheckoutService.complete_sale ──► atomic remote procedure          │
//! │                │ success                 │ failure                  │
//! │                ▼                         ▼                          │
//! │  Sale record + receipt            cart/tenders preserved,           │
//! │  Register.reset()                 operator retries                  │
//! │                │                                                    │
//! │                ▼                                                    │
//! │  StatsPoller refreshes; SessionService.close reconciles the drawer  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations commit client-side only after a successful response, so an
//! unmounted view or dropped future never leaves half a sale behind.

pub mod cache;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod notify;
pub mod receipt;
pub mod register;
pub mod session;
pub mod stats;

pub use cache::{CachedView, NullCache, ViewCache};
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use error::{PosError, PosResult};
pub use notify::{MemoryNotifier, Notification, Notifier, NotifyKind, NullNotifier};
pub use receipt::{render_html, Company, ReceiptData};
pub use register::{Register, RegisterState};
pub use session::SessionService;
pub use stats::{StatsHandle, StatsPoller};
