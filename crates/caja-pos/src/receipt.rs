//! # Receipt Formatting
//!
//! Downstream, non-transactional document assembly for a committed sale.
//! Rendering is infallible by construction; if the physical printer
//! fails, the caller reports it and the sale stays committed. Nothing
//! here can roll a settlement back.

use serde::{Deserialize, Serialize};

use caja_core::{Customer, Money, Sale};

// =============================================================================
// Receipt Data
// =============================================================================

/// Issuing company identity printed on the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub legal_name: String,
    /// Taxpayer registration number (RUC).
    pub tax_id: String,
    pub address: String,
    pub phone: Option<String>,
}

/// Everything a receipt needs: the committed sale, the billed customer,
/// and the issuing company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    pub sale: Sale,
    pub customer: Customer,
    pub company: Company,
}

impl ReceiptData {
    /// The pipe-separated payload encoded into the electronic-invoicing
    /// QR code: issuer, document identity, amounts, date, and the
    /// customer's identity document.
    pub fn qr_payload(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.company.tax_id,
            self.sale.doc_type,
            self.sale.series,
            self.sale.number,
            fmt_cents(self.sale.tax_cents),
            fmt_cents(self.sale.total_cents),
            self.sale.sale_date.format("%Y-%m-%d"),
            self.customer.document_type,
            self.customer.document_number,
        )
    }
}

fn fmt_cents(cents: i64) -> String {
    Money::from_cents(cents).to_string()
}

// =============================================================================
// HTML Rendering
// =============================================================================

/// Renders the 80mm monospace receipt document for browser printing.
pub fn render_html(receipt: &ReceiptData) -> String {
    let ReceiptData {
        sale,
        customer,
        company,
    } = receipt;

    let mut html = String::with_capacity(2048);

    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Receipt</title>\n<style>\n",
    );
    html.push_str(
        "body { font-family: monospace; font-size: 12px; margin: 0; padding: 10px; }\n\
         .header { text-align: center; margin-bottom: 10px; }\n\
         .company-name { font-weight: bold; font-size: 14px; }\n\
         .line { border-bottom: 1px dashed #000; margin: 5px 0; }\n\
         .row { display: flex; justify-content: space-between; }\n\
         .total { font-weight: bold; font-size: 14px; }\n\
         .footer { text-align: center; margin-top: 10px; font-size: 10px; }\n",
    );
    html.push_str("</style>\n</head>\n<body>\n");

    // header
    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!(
        "<div class=\"company-name\">{}</div>\n<div>RUC: {}</div>\n<div>{}</div>\n",
        company.legal_name, company.tax_id, company.address
    ));
    if let Some(phone) = &company.phone {
        html.push_str(&format!("<div>Tel: {}</div>\n", phone));
    }
    html.push_str("</div>\n<div class=\"line\"></div>\n");

    // document identity and customer
    html.push_str(&format!(
        "<div><strong>{} {}</strong></div>\n<div>Date: {}</div>\n<div>Customer: {}</div>\n<div>{}: {}</div>\n",
        sale.doc_type,
        sale.document_reference(),
        sale.sale_date.format("%Y-%m-%d %H:%M"),
        customer.name,
        customer.document_type,
        customer.document_number
    ));
    html.push_str("<div class=\"line\"></div>\n");

    // lines
    for line in &sale.lines {
        html.push_str(&format!("<div class=\"row\"><div>{}</div></div>\n", line.name));
        html.push_str(&format!(
            "<div class=\"row\"><div>{} x {}</div><div>{}</div></div>\n",
            line.quantity,
            line.unit_price(),
            line.total()
        ));
    }
    html.push_str("<div class=\"line\"></div>\n");

    // totals
    html.push_str(&format!(
        "<div class=\"row\"><div>Subtotal:</div><div>{}</div></div>\n",
        fmt_cents(sale.subtotal_cents)
    ));
    if sale.discount_cents > 0 {
        html.push_str(&format!(
            "<div class=\"row\"><div>Discount:</div><div>-{}</div></div>\n",
            fmt_cents(sale.discount_cents)
        ));
    }
    html.push_str(&format!(
        "<div class=\"row\"><div>IGV:</div><div>{}</div></div>\n",
        fmt_cents(sale.tax_cents)
    ));
    html.push_str(&format!(
        "<div class=\"row total\"><div>TOTAL:</div><div>{}</div></div>\n",
        fmt_cents(sale.total_cents)
    ));
    html.push_str("<div class=\"line\"></div>\n");

    // tenders
    html.push_str("<div><strong>Payments:</strong>\n");
    for tender in &sale.tenders {
        html.push_str(&format!(
            "<div class=\"row\"><div>{:?}:</div><div>{}</div></div>\n",
            tender.kind,
            tender.amount()
        ));
    }
    html.push_str("</div>\n");

    // footer
    html.push_str(&format!(
        "<div class=\"footer\"><div>Thank you for your purchase!</div><div>{}</div></div>\n",
        receipt.qr_payload()
    ));
    html.push_str("</body>\n</html>\n");

    html
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::{Cart, PosProduct, SaleStatus, Tender};
    use chrono::TimeZone;

    fn receipt() -> ReceiptData {
        let mut cart = Cart::new();
        cart.add_product(
            &PosProduct {
                id: "p1".to_string(),
                sku: "TEC-01".to_string(),
                name: "Teclado USB".to_string(),
                brand_name: None,
                category_name: None,
                unit_code: "NIU".to_string(),
                price_cents: 1000,
                available_stock: 5,
                min_stock: 0,
                is_serialized: false,
                tax_rate_bps: caja_core::STANDARD_TAX_RATE_BPS,
                image_url: None,
            },
            2,
        )
        .unwrap();

        let sale = Sale {
            id: "doc-1".to_string(),
            session_id: "s1".to_string(),
            customer_id: "c1".to_string(),
            doc_type: "03".to_string(),
            series: "B001".to_string(),
            number: "00000042".to_string(),
            sale_date: chrono::Utc.with_ymd_and_hms(2024, 6, 1, 15, 30, 0).unwrap(),
            lines: cart.lines().to_vec(),
            tenders: vec![Tender::cash(2500)],
            subtotal_cents: 2000,
            tax_cents: 360,
            discount_cents: 0,
            total_cents: 2360,
            status: SaleStatus::Completed,
            notes: None,
        };

        ReceiptData {
            sale,
            customer: Customer {
                id: "c1".to_string(),
                document_type: "DNI".to_string(),
                document_number: "12345678".to_string(),
                name: "Cliente Varios".to_string(),
                email: None,
                phone: None,
                address: None,
                is_frequent: false,
            },
            company: Company {
                legal_name: "Comercial Andina SAC".to_string(),
                tax_id: "20123456789".to_string(),
                address: "Av. Principal 123, Lima".to_string(),
                phone: None,
            },
        }
    }

    #[test]
    fn test_qr_payload_shape() {
        assert_eq!(
            receipt().qr_payload(),
            "20123456789|03|B001|00000042|3.60|23.60|2024-06-01|DNI|12345678"
        );
    }

    #[test]
    fn test_html_contains_document_and_totals() {
        let html = render_html(&receipt());

        assert!(html.contains("B001-00000042"));
        assert!(html.contains("Comercial Andina SAC"));
        assert!(html.contains("Teclado USB"));
        assert!(html.contains("23.60"));
        assert!(html.contains("Cliente Varios"));
    }

    #[test]
    fn test_html_omits_zero_discount_row() {
        let html = render_html(&receipt());
        assert!(!html.contains("Discount:"));
    }
}
