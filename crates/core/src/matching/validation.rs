//! Structural validation of match inputs.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::error::MatchError;
use super::evaluator::line_variance;
use super::types::{DocumentKind, GoodsReceipt, Invoice, LineNumber, PurchaseOrder, Tolerance};

/// Validates the three documents before matching.
///
/// # Errors
///
/// Returns `MatchError::EmptyPurchaseOrder` if the PO has no lines,
/// `MatchError::DuplicateLine` if a line number repeats within a document,
/// `MatchError::NegativeQuantity` / `MatchError::NegativePrice` for negative values,
/// `MatchError::OverAccepted` if accepted + rejected exceeds received, and
/// `MatchError::AmountOutOfRange` if a line amount or variance would overflow.
pub fn validate_documents(
    po: &PurchaseOrder,
    goods_receipt: &GoodsReceipt,
    invoice: &Invoice,
) -> Result<(), MatchError> {
    if po.lines.is_empty() {
        return Err(MatchError::EmptyPurchaseOrder(po.number.clone()));
    }

    check_unique(
        DocumentKind::PurchaseOrder,
        po.lines.iter().map(|l| l.line_number),
    )?;
    check_unique(
        DocumentKind::GoodsReceipt,
        goods_receipt.lines.iter().map(|l| l.line_number),
    )?;
    check_unique(
        DocumentKind::Invoice,
        invoice.lines.iter().map(|l| l.line_number),
    )?;

    for line in &po.lines {
        check_amounts(
            DocumentKind::PurchaseOrder,
            line.line_number,
            &[line.quantity],
            line.unit_price,
        )?;
    }

    for line in &goods_receipt.lines {
        check_amounts(
            DocumentKind::GoodsReceipt,
            line.line_number,
            &[
                line.quantity,
                line.received_qty,
                line.accepted_qty,
                line.rejected_qty,
            ],
            line.unit_price,
        )?;

        let inspected = line.accepted_qty.checked_add(line.rejected_qty).ok_or(
            MatchError::AmountOutOfRange {
                document: DocumentKind::GoodsReceipt,
                line_number: line.line_number,
            },
        )?;
        if inspected > line.received_qty {
            return Err(MatchError::OverAccepted {
                line_number: line.line_number,
                accepted: line.accepted_qty,
                rejected: line.rejected_qty,
                received: line.received_qty,
            });
        }
    }

    for line in &invoice.lines {
        check_amounts(
            DocumentKind::Invoice,
            line.line_number,
            &[line.quantity],
            line.unit_price,
        )?;
    }

    check_ranges(po, goods_receipt, invoice)
}

/// Validates that both tolerance percentages are non-negative.
///
/// # Errors
///
/// Returns `MatchError::NegativeTolerance` naming the offending dimension.
pub fn validate_tolerance(tolerance: &Tolerance) -> Result<(), MatchError> {
    if tolerance.quantity < Decimal::ZERO {
        return Err(MatchError::NegativeTolerance {
            dimension: "quantity",
            value: tolerance.quantity,
        });
    }
    if tolerance.price < Decimal::ZERO {
        return Err(MatchError::NegativeTolerance {
            dimension: "price",
            value: tolerance.price,
        });
    }
    Ok(())
}

fn check_unique(
    document: DocumentKind,
    line_numbers: impl Iterator<Item = LineNumber>,
) -> Result<(), MatchError> {
    let mut seen = HashSet::new();
    for line_number in line_numbers {
        if !seen.insert(line_number) {
            return Err(MatchError::DuplicateLine {
                document,
                line_number,
            });
        }
    }
    Ok(())
}

fn check_amounts(
    document: DocumentKind,
    line_number: LineNumber,
    quantities: &[Decimal],
    unit_price: Decimal,
) -> Result<(), MatchError> {
    if quantities.iter().any(|q| *q < Decimal::ZERO) {
        return Err(MatchError::NegativeQuantity {
            document,
            line_number,
        });
    }
    if unit_price < Decimal::ZERO {
        return Err(MatchError::NegativePrice {
            document,
            line_number,
        });
    }
    Ok(())
}

/// Every line total, line variance and their absolute sum must fit in a `Decimal`.
fn check_ranges(
    po: &PurchaseOrder,
    goods_receipt: &GoodsReceipt,
    invoice: &Invoice,
) -> Result<(), MatchError> {
    let out_of_range = |document, line_number| MatchError::AmountOutOfRange {
        document,
        line_number,
    };

    for (document, lines) in [
        (DocumentKind::PurchaseOrder, &po.lines),
        (DocumentKind::Invoice, &invoice.lines),
    ] {
        if let Some(line) = lines.iter().find(|l| l.extended_amount().is_none()) {
            return Err(out_of_range(document, line.line_number));
        }
    }

    let mut gross = Decimal::ZERO;
    for po_line in &po.lines {
        let n = po_line.line_number;
        let gr_qty = goods_receipt.line(n).map_or(Decimal::ZERO, |l| l.accepted_qty);
        let invoice_price = invoice.line(n).map_or(po_line.unit_price, |l| l.unit_price);

        gross = line_variance(po_line.quantity, po_line.unit_price, gr_qty, invoice_price)
            .and_then(|v| gross.checked_add(v.total.abs()))
            .ok_or_else(|| out_of_range(DocumentKind::PurchaseOrder, n))?;
    }

    for gr_line in &goods_receipt.lines {
        let n = gr_line.line_number;
        if po.line(n).is_some() {
            continue;
        }
        let invoice_price = invoice.line(n).map_or(Decimal::ZERO, |l| l.unit_price);

        gross = invoice_price
            .checked_mul(gr_line.accepted_qty)
            .and_then(|total| gross.checked_add(total))
            .ok_or_else(|| out_of_range(DocumentKind::GoodsReceipt, n))?;
    }

    Ok(())
}
