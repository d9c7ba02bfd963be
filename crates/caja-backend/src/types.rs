//! # Wire Row Types
//!
//! Row shapes for the remote procedures, serialized with the snake_case
//! keys the stored procedures expect. These are deliberately separate
//! from the UI-facing types in caja-core: the wire format is the
//! backend's contract and does not move when the UI types do.

use serde::{Deserialize, Serialize};

use caja_core::{CartLine, Tender, TenderKind};

// =============================================================================
// Stock Validation
// =============================================================================

/// One cart line in the pre-flight stock check request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheckRow {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl From<&CartLine> for StockCheckRow {
    fn from(line: &CartLine) -> Self {
        StockCheckRow {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        }
    }
}

/// Per-line verdict from the stock check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheckItem {
    pub product_name: String,
    pub is_sufficient: bool,
}

/// The stock check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockValidation {
    pub has_stock_errors: bool,
    pub items: Vec<StockCheckItem>,
}

impl StockValidation {
    /// Names of the products that cannot be satisfied, for the operator
    /// notification.
    pub fn insufficient_names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| !i.is_sufficient)
            .map(|i| i.product_name.clone())
            .collect()
    }
}

// =============================================================================
// Sale Settlement
// =============================================================================

/// One cart line in the atomic sale procedure's expected shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineRow {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
}

impl From<&CartLine> for SaleLineRow {
    fn from(line: &CartLine) -> Self {
        SaleLineRow {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            discount_bps: line.discount_bps,
        }
    }
}

/// One payment row in the atomic sale procedure's expected shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderRow {
    #[serde(rename = "type")]
    pub kind: TenderKind,
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub card_type: Option<String>,
    pub auth_code: Option<String>,
}

impl From<&Tender> for TenderRow {
    fn from(tender: &Tender) -> Self {
        TenderRow {
            kind: tender.kind,
            amount_cents: tender.amount_cents,
            reference: tender.reference.clone(),
            card_type: tender.card_type.clone(),
            auth_code: tender.auth_code.clone(),
        }
    }
}

/// The assembled settlement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub session_id: String,
    pub customer_id: String,
    pub lines: Vec<SaleLineRow>,
    pub tenders: Vec<TenderRow>,
    pub notes: Option<String>,
}

/// Structured result of the atomic sale procedure.
///
/// `success = false` is a business rejection the operator can act on;
/// it is distinct from a transport error, after which nothing is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub sales_doc_id: Option<String>,
    pub document_number: Option<String>,
}

// =============================================================================
// Session Queries
// =============================================================================

/// Cash sales accumulated during a session, used only at close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedCash {
    pub cash_sales_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tender_row_wire_shape() {
        let row = TenderRow {
            kind: TenderKind::Card,
            amount_cents: 1500,
            reference: None,
            card_type: Some("VISA".to_string()),
            auth_code: Some("A1B2".to_string()),
        };

        let json = serde_json::to_value(&row).unwrap();
        // the procedure expects the discriminator under "type"
        assert_eq!(json["type"], "CARD");
        assert_eq!(json["amount_cents"], 1500);
        assert_eq!(json["card_type"], "VISA");
    }

    #[test]
    fn test_stock_row_wire_shape() {
        let row = StockCheckRow {
            product_id: "p1".to_string(),
            quantity: 2,
            unit_price_cents: 1000,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["product_id"], "p1");
        assert_eq!(json["unit_price_cents"], 1000);
    }

    #[test]
    fn test_insufficient_names() {
        let validation = StockValidation {
            has_stock_errors: true,
            items: vec![
                StockCheckItem {
                    product_name: "Teclado".to_string(),
                    is_sufficient: false,
                },
                StockCheckItem {
                    product_name: "Mouse".to_string(),
                    is_sufficient: true,
                },
            ],
        };

        assert_eq!(validation.insufficient_names(), vec!["Teclado"]);
    }
}
