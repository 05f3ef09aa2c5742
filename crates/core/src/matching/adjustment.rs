//! Manual line adjustments applied before a re-match.
//!
//! Adjustments never mutate the inputs; they return corrected copies of the
//! goods receipt and invoice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::MatchError;
use super::types::{DocumentKind, GoodsReceipt, Invoice, LineNumber};

/// Field an adjustment overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentField {
    /// Accepted quantity on the goods receipt. Rejected quantity is rebalanced
    /// to `received - accepted`.
    AcceptedQuantity,
    /// Quantity on the invoice.
    InvoiceQuantity,
    /// Unit price on the invoice.
    InvoiceUnitPrice,
}

/// One correction to a goods receipt or invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdjustment {
    /// Target line number.
    pub line_number: LineNumber,
    /// Field to override.
    pub field: AdjustmentField,
    /// New value.
    pub value: Decimal,
}

/// Applies adjustments in order and returns the corrected documents.
///
/// Invoice line totals and the invoice total are recomputed when an invoice
/// line changes.
///
/// # Errors
///
/// Returns `MatchError::NegativeAdjustment` for a negative value,
/// `MatchError::UnknownLine` if the target line does not exist,
/// `MatchError::OverAccepted` if an accepted quantity exceeds the received quantity,
/// and `MatchError::AmountOutOfRange` if a recomputed invoice total overflows.
pub fn apply_adjustments(
    goods_receipt: &GoodsReceipt,
    invoice: &Invoice,
    adjustments: &[LineAdjustment],
) -> Result<(GoodsReceipt, Invoice), MatchError> {
    let mut goods_receipt = goods_receipt.clone();
    let mut invoice = invoice.clone();
    let mut invoice_touched = false;

    for adjustment in adjustments {
        if adjustment.value < Decimal::ZERO {
            return Err(MatchError::NegativeAdjustment {
                line_number: adjustment.line_number,
                value: adjustment.value,
            });
        }

        match adjustment.field {
            AdjustmentField::AcceptedQuantity => {
                let line = goods_receipt
                    .lines
                    .iter_mut()
                    .find(|l| l.line_number == adjustment.line_number)
                    .ok_or(MatchError::UnknownLine {
                        document: DocumentKind::GoodsReceipt,
                        line_number: adjustment.line_number,
                    })?;

                if adjustment.value > line.received_qty {
                    return Err(MatchError::OverAccepted {
                        line_number: line.line_number,
                        accepted: adjustment.value,
                        rejected: Decimal::ZERO,
                        received: line.received_qty,
                    });
                }
                line.accepted_qty = adjustment.value;
                line.rejected_qty = line.received_qty - adjustment.value;
            }
            AdjustmentField::InvoiceQuantity | AdjustmentField::InvoiceUnitPrice => {
                let line = invoice
                    .lines
                    .iter_mut()
                    .find(|l| l.line_number == adjustment.line_number)
                    .ok_or(MatchError::UnknownLine {
                        document: DocumentKind::Invoice,
                        line_number: adjustment.line_number,
                    })?;

                if adjustment.field == AdjustmentField::InvoiceQuantity {
                    line.quantity = adjustment.value;
                } else {
                    line.unit_price = adjustment.value;
                }
                line.total_amount = line.extended_amount().ok_or(MatchError::AmountOutOfRange {
                    document: DocumentKind::Invoice,
                    line_number: line.line_number,
                })?;
                invoice_touched = true;
            }
        }
    }

    if invoice_touched {
        invoice.total_amount = invoice.lines.iter().try_fold(Decimal::ZERO, |sum, l| {
            sum.checked_add(l.total_amount).ok_or(MatchError::AmountOutOfRange {
                document: DocumentKind::Invoice,
                line_number: l.line_number,
            })
        })?;
    }

    Ok((goods_receipt, invoice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::sample_documents;
    use rust_decimal_macros::dec;

    fn adjust(line_number: u32, field: AdjustmentField, value: Decimal) -> LineAdjustment {
        LineAdjustment {
            line_number,
            field,
            value,
        }
    }

    #[test]
    fn test_invoice_price_correction() {
        let (_, gr, inv) = sample_documents();

        let (_, adjusted) = apply_adjustments(
            &gr,
            &inv,
            &[adjust(6, AdjustmentField::InvoiceUnitPrice, dec!(1000))],
        )
        .unwrap();

        let line = adjusted.line(6).unwrap();
        assert_eq!(line.unit_price, dec!(1000));
        assert_eq!(line.total_amount, dec!(2000));
        assert_eq!(adjusted.total_amount, dec!(12625));
        // input untouched
        assert_eq!(inv.line(6).unwrap().unit_price, dec!(1037.50));
    }

    #[test]
    fn test_accepted_quantity_rebalances_rejects() {
        let (_, gr, inv) = sample_documents();

        let (adjusted, invoice) = apply_adjustments(
            &gr,
            &inv,
            &[adjust(3, AdjustmentField::AcceptedQuantity, dec!(99))],
        )
        .unwrap();

        let line = adjusted.line(3).unwrap();
        assert_eq!(line.accepted_qty, dec!(99));
        assert_eq!(line.rejected_qty, dec!(1));
        assert_eq!(invoice, inv);
    }

    #[test]
    fn test_accepted_quantity_cannot_exceed_received() {
        let (_, gr, inv) = sample_documents();
        let result = apply_adjustments(
            &gr,
            &inv,
            &[adjust(2, AdjustmentField::AcceptedQuantity, dec!(30))],
        );
        assert!(matches!(result, Err(MatchError::OverAccepted { .. })));
    }

    #[test]
    fn test_unknown_line_rejected() {
        let (_, gr, inv) = sample_documents();
        let result = apply_adjustments(
            &gr,
            &inv,
            &[adjust(42, AdjustmentField::InvoiceQuantity, dec!(1))],
        );
        assert!(matches!(
            result,
            Err(MatchError::UnknownLine {
                document: DocumentKind::Invoice,
                line_number: 42
            })
        ));
    }

    #[test]
    fn test_negative_value_rejected() {
        let (_, gr, inv) = sample_documents();
        let result = apply_adjustments(
            &gr,
            &inv,
            &[adjust(1, AdjustmentField::InvoiceQuantity, dec!(-1))],
        );
        assert!(matches!(result, Err(MatchError::NegativeAdjustment { .. })));
    }

    #[test]
    fn test_overflowing_invoice_total_rejected() {
        let (_, gr, inv) = sample_documents();
        let result = apply_adjustments(
            &gr,
            &inv,
            &[adjust(
                3,
                AdjustmentField::InvoiceUnitPrice,
                dec!(10000000000000000000000000000),
            )],
        );
        assert!(matches!(
            result,
            Err(MatchError::AmountOutOfRange {
                document: DocumentKind::Invoice,
                line_number: 3
            })
        ));
    }

    #[test]
    fn test_adjustment_field_serde() {
        let parsed: LineAdjustment = serde_json::from_str(
            r#"{"line_number": 2, "field": "invoice_quantity", "value": "28"}"#,
        )
        .unwrap();
        assert_eq!(parsed.field, AdjustmentField::InvoiceQuantity);
        assert_eq!(parsed.value, dec!(28));
    }
}
