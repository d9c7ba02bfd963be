//! # Cached View Invalidation
//!
//! Dependent displays (the session statistics panel, the warehouse stock
//! view) read cached remote data. Settlement success invalidates those
//! caches so they refetch ahead of their normal schedule; everything else
//! tolerates the staleness.
//!
//! Like the notification sink, this is an injected capability: the UI
//! shell wires it to its query cache, [`crate::StatsHandle`] implements
//! it to poke the poller, and tests record the calls.

/// A cached remote view the services may invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedView {
    /// The open session's statistics panel.
    SessionStats,
    /// Warehouse stock figures shown in search results.
    WarehouseStock,
}

/// Receives invalidation signals. Implementations must be cheap and
/// non-blocking; a refetch happens later, on the owner's schedule.
pub trait ViewCache: Send + Sync {
    fn invalidate(&self, view: CachedView);
}

/// Ignores invalidations; for contexts with no cached views.
pub struct NullCache;

impl ViewCache for NullCache {
    fn invalidate(&self, _view: CachedView) {}
}
