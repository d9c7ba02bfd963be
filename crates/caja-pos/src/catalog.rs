//! # Catalog Search
//!
//! Warehouse-scoped product search for the POS screen.
//!
//! Queries shorter than the minimum never reach the network: the search
//! box fires on every keystroke and one-character lookups are noise, so
//! they resolve to an empty page locally. A failed remote search also
//! degrades to an empty page: search is a read surface, not a mutation,
//! and the operator simply types again.

use std::sync::Arc;

use tracing::{debug, warn};

use caja_backend::PosBackend;
use caja_core::{
    validation::validate_search_query, CoreError, PosProduct, ValidationError,
};

use crate::error::PosResult;

// =============================================================================
// Catalog Service
// =============================================================================

/// Product search against the selected warehouse.
pub struct CatalogService {
    backend: Arc<dyn PosBackend>,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn PosBackend>) -> Self {
        CatalogService { backend }
    }

    /// Searches products by SKU or name within a warehouse.
    ///
    /// A too-short query returns an empty page without a remote call;
    /// an over-long query is a validation error.
    pub async fn search(&self, query: &str, warehouse_id: &str) -> PosResult<Vec<PosProduct>> {
        let query = match validate_search_query(query) {
            Ok(q) => q,
            Err(ValidationError::TooShort { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::from(e).into()),
        };

        debug!(query = %query, warehouse_id, "searching catalog");
        match self.backend.search_products(&query, warehouse_id).await {
            Ok(products) => Ok(products),
            Err(e) => {
                warn!(?e, "product search failed");
                Ok(Vec::new())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
