//! Sample documents shared by the matching tests.

use chrono::NaiveDate;
use matchbook_shared::types::Currency;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{DocumentLine, GoodsReceipt, GoodsReceiptLine, Invoice, PurchaseOrder};

const ITEMS: [(&str, &str, &str); 6] = [
    ("CNC-TOOL-001", "Carbide End Mill 10mm", "EA"),
    ("CNC-TOOL-002", "Ball Nose Cutter 8mm", "EA"),
    ("CNC-INSERT-001", "Turning Insert CNMG", "EA"),
    ("CNC-HOLDER-001", "Tool Holder BT40", "EA"),
    ("CNC-COOL-001", "Coolant Nozzle Assembly", "SET"),
    ("CNC-ALIGN-001", "Alignment Fixture Kit", "KIT"),
];

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn declared_total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Builds a document line for one of the sample items (1-based).
pub fn line(line_number: u32, quantity: Decimal, unit_price: Decimal) -> DocumentLine {
    let (item_code, description, uom) = ITEMS[(line_number as usize - 1) % ITEMS.len()];
    DocumentLine {
        line_number,
        item_code: item_code.to_string(),
        description: description.to_string(),
        quantity,
        unit_price,
        total_amount: quantity.checked_mul(unit_price).unwrap_or_default(),
        uom: uom.to_string(),
    }
}

/// Builds a goods receipt line with no rejections.
pub fn gr_line(line_number: u32, accepted: Decimal, unit_price: Decimal) -> GoodsReceiptLine {
    gr_line_with_rejects(line_number, accepted, Decimal::ZERO, unit_price)
}

/// Builds a goods receipt line where `received = accepted + rejected`.
pub fn gr_line_with_rejects(
    line_number: u32,
    accepted: Decimal,
    rejected: Decimal,
    unit_price: Decimal,
) -> GoodsReceiptLine {
    let base = line(line_number, accepted + rejected, unit_price);
    GoodsReceiptLine {
        line_number,
        item_code: base.item_code,
        description: base.description,
        quantity: base.quantity,
        unit_price,
        total_amount: base.total_amount,
        uom: base.uom,
        received_qty: accepted + rejected,
        accepted_qty: accepted,
        rejected_qty: rejected,
    }
}

/// Wraps lines in a purchase order.
pub fn purchase_order(lines: Vec<DocumentLine>) -> PurchaseOrder {
    let total_amount = declared_total(lines.iter().filter_map(DocumentLine::extended_amount));
    PurchaseOrder {
        id: "PO-2024-001234".to_string(),
        number: "PO-2024-001234".to_string(),
        date: date(2024, 1, 10),
        vendor: "Precision Components Inc.".to_string(),
        currency: Currency::Usd,
        lines,
        total_amount,
    }
}

/// Wraps lines in a goods receipt.
pub fn goods_receipt(lines: Vec<GoodsReceiptLine>) -> GoodsReceipt {
    let total_amount = declared_total(
        lines
            .iter()
            .filter_map(|l| l.accepted_qty.checked_mul(l.unit_price)),
    );
    GoodsReceipt {
        id: "GRN-2024-000456".to_string(),
        number: "GRN-2024-000456".to_string(),
        date: date(2024, 1, 17),
        received_by: "Mike Wilson".to_string(),
        lines,
        total_amount,
    }
}

/// Wraps lines in an invoice.
pub fn invoice(lines: Vec<DocumentLine>) -> Invoice {
    let total_amount = declared_total(lines.iter().filter_map(DocumentLine::extended_amount));
    Invoice {
        id: "INV-PC-2024-789".to_string(),
        number: "INV-PC-2024-789".to_string(),
        date: date(2024, 1, 18),
        due_date: date(2024, 3, 3),
        lines,
        total_amount,
        tax_amount: dec!(1143.00),
    }
}

/// The six-line CNC tooling order: lines 1, 4, 5 match; line 2 is short
/// delivered; line 3 is short with a price increase; line 6 is overpriced.
pub fn sample_documents() -> (PurchaseOrder, GoodsReceipt, Invoice) {
    let po = purchase_order(vec![
        line(1, dec!(50), dec!(45.50)),
        line(2, dec!(30), dec!(62.00)),
        line(3, dec!(100), dec!(28.50)),
        line(4, dec!(5), dec!(385.00)),
        line(5, dec!(10), dec!(166.50)),
        line(6, dec!(2), dec!(1000.00)),
    ]);
    let gr = goods_receipt(vec![
        gr_line(1, dec!(50), dec!(45.50)),
        gr_line(2, dec!(28), dec!(62.00)),
        gr_line_with_rejects(3, dec!(97), dec!(3), dec!(28.50)),
        gr_line(4, dec!(5), dec!(385.00)),
        gr_line(5, dec!(10), dec!(166.50)),
        gr_line(6, dec!(2), dec!(1000.00)),
    ]);
    let inv = invoice(vec![
        line(1, dec!(50), dec!(45.50)),
        line(2, dec!(30), dec!(62.00)),
        line(3, dec!(100), dec!(29.00)),
        line(4, dec!(5), dec!(385.00)),
        line(5, dec!(10), dec!(166.50)),
        line(6, dec!(2), dec!(1037.50)),
    ]);
    (po, gr, inv)
}
