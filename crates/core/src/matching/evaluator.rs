//! Three-way match evaluation.
//!
//! Each purchase order line is compared against the goods receipt line and
//! invoice line with the same line number:
//!
//! - quantity variance = accepted quantity - ordered quantity
//! - price variance = invoiced unit price - ordered unit price
//! - total variance = quantity variance x PO price + price variance x accepted quantity
//!
//! Classification, first rule that applies wins:
//!
//! 1. all quantities and prices agree: `matched`
//! 2. goods receipt or invoice line missing: `pending`
//! 3. a deviation against a zero PO quantity or price: `exception`
//! 4. price beyond tolerance, or quantity and price both off: `exception`
//! 5. quantity beyond tolerance: `mismatch`
//! 6. one dimension off, within tolerance: `partial`

use std::collections::{BTreeSet, HashMap};

use matchbook_shared::types::{Currency, format_amount};
use rust_decimal::Decimal;

use super::types::{
    DocumentLine, GoodsReceipt, GoodsReceiptLine, Invoice, LineNumber, MatchLineResult,
    MatchStatus, PurchaseOrder, Tolerance, Variance,
};

/// How far one dimension of a line deviates from the purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deviation {
    None,
    Within,
    Beyond,
    /// Deviates, but the PO base is zero so no percentage exists.
    Unmeasurable,
}

impl Deviation {
    fn is_present(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Matches every purchase order line against the goods receipt and invoice.
///
/// Results follow purchase order line order. Line numbers that appear only on
/// the goods receipt or invoice are appended afterwards, in ascending order,
/// as exceptions. The function is pure: identical inputs give identical output.
#[must_use]
pub fn evaluate(
    po: &PurchaseOrder,
    goods_receipt: &GoodsReceipt,
    invoice: &Invoice,
    tolerance: &Tolerance,
) -> Vec<MatchLineResult> {
    let gr_lines = index_lines(goods_receipt.lines.iter().map(|l| (l.line_number, l)));
    let inv_lines = index_lines(invoice.lines.iter().map(|l| (l.line_number, l)));

    let mut results: Vec<MatchLineResult> = po
        .lines
        .iter()
        .map(|po_line| {
            evaluate_line(
                po_line,
                gr_lines.get(&po_line.line_number).copied(),
                inv_lines.get(&po_line.line_number).copied(),
                tolerance,
                po.currency,
            )
        })
        .collect();

    let ordered: BTreeSet<LineNumber> = po.lines.iter().map(|l| l.line_number).collect();
    let unordered: BTreeSet<LineNumber> = gr_lines
        .keys()
        .chain(inv_lines.keys())
        .copied()
        .filter(|n| !ordered.contains(n))
        .collect();

    results.extend(unordered.into_iter().map(|n| {
        unordered_line(
            n,
            gr_lines.get(&n).copied(),
            inv_lines.get(&n).copied(),
            po.currency,
        )
    }));

    results
}

/// Worst-case roll-up of line statuses.
///
/// mismatch > exception > partial > pending > matched. No lines is `matched`.
#[must_use]
pub fn overall_status(results: &[MatchLineResult]) -> MatchStatus {
    results
        .iter()
        .map(|r| r.status)
        .max_by_key(|s| s.severity())
        .unwrap_or(MatchStatus::Matched)
}

const OUT_OF_RANGE: &str = "Line amounts exceed the supported numeric range";

/// Quantity, price and total variance of one line, or `None` if an amount overflows.
pub(super) fn line_variance(
    po_qty: Decimal,
    po_price: Decimal,
    gr_qty: Decimal,
    invoice_price: Decimal,
) -> Option<Variance> {
    let quantity = gr_qty.checked_sub(po_qty)?;
    let price = invoice_price.checked_sub(po_price)?;
    let total = quantity
        .checked_mul(po_price)?
        .checked_add(price.checked_mul(gr_qty)?)?;
    Some(Variance {
        quantity,
        price,
        total,
    })
}

fn index_lines<'a, T>(
    lines: impl Iterator<Item = (LineNumber, &'a T)>,
) -> HashMap<LineNumber, &'a T> {
    let mut index = HashMap::new();
    for (line_number, line) in lines {
        // first occurrence wins
        index.entry(line_number).or_insert(line);
    }
    index
}

fn evaluate_line(
    po_line: &DocumentLine,
    gr_line: Option<&GoodsReceiptLine>,
    inv_line: Option<&DocumentLine>,
    tolerance: &Tolerance,
    currency: Currency,
) -> MatchLineResult {
    let po_qty = po_line.quantity;
    let po_price = po_line.unit_price;
    let gr_qty = gr_line.map_or(Decimal::ZERO, |l| l.accepted_qty);
    let invoice_price = inv_line.map_or(po_price, |l| l.unit_price);

    let mut issues = Vec::new();
    let (status, variance) = match line_variance(po_qty, po_price, gr_qty, invoice_price) {
        None => {
            issues.push(OUT_OF_RANGE.to_string());
            (MatchStatus::Exception, Variance::default())
        }
        Some(variance) => {
            let status = match (gr_line, inv_line) {
                (Some(gr), Some(inv)) => {
                    classify(po_line, gr, inv, tolerance, currency, &mut issues)
                }
                _ => {
                    pending_issues(po_line, gr_line, inv_line, currency, &mut issues);
                    MatchStatus::Pending
                }
            };
            (status, variance)
        }
    };

    MatchLineResult {
        line_number: po_line.line_number,
        item_code: po_line.item_code.clone(),
        description: po_line.description.clone(),
        po_qty: Some(po_qty),
        gr_qty: gr_line.map(|l| l.accepted_qty),
        invoice_qty: inv_line.map(|l| l.quantity),
        po_price: Some(po_price),
        invoice_price: inv_line.map(|l| l.unit_price),
        status,
        variance,
        issues,
    }
}

fn classify(
    po_line: &DocumentLine,
    gr: &GoodsReceiptLine,
    inv: &DocumentLine,
    tolerance: &Tolerance,
    currency: Currency,
    issues: &mut Vec<String>,
) -> MatchStatus {
    if gr.accepted_qty == po_line.quantity
        && inv.quantity == po_line.quantity
        && inv.unit_price == po_line.unit_price
    {
        return MatchStatus::Matched;
    }

    let quantity = quantity_deviation(po_line.quantity, gr, inv.quantity, tolerance.quantity, issues);
    let price = price_deviation(
        po_line.unit_price,
        inv.unit_price,
        tolerance.price,
        currency,
        issues,
    );

    match (quantity, price) {
        (Deviation::Unmeasurable, _) | (_, Deviation::Unmeasurable | Deviation::Beyond) => {
            MatchStatus::Exception
        }
        (q, p) if q.is_present() && p.is_present() => MatchStatus::Exception,
        (Deviation::Beyond, _) => MatchStatus::Mismatch,
        _ => MatchStatus::Partial,
    }
}

fn quantity_deviation(
    po_qty: Decimal,
    gr: &GoodsReceiptLine,
    inv_qty: Decimal,
    tolerance_pct: Decimal,
    issues: &mut Vec<String>,
) -> Deviation {
    let gr_qty = gr.accepted_qty;

    let gap = (gr_qty - po_qty)
        .abs()
        .max((inv_qty - po_qty).abs())
        .max((inv_qty - gr_qty).abs());
    if gap.is_zero() {
        return Deviation::None;
    }

    if gr_qty < po_qty {
        issues.push(format!(
            "GRN accepted quantity ({}) less than PO ({})",
            quantity(gr_qty),
            quantity(po_qty)
        ));
        if gr.rejected_qty > Decimal::ZERO {
            issues.push(format!(
                "{} rejected at receiving inspection",
                quantity(gr.rejected_qty)
            ));
        }
    } else if gr_qty > po_qty {
        issues.push(format!(
            "GRN accepted quantity ({}) exceeds PO ({})",
            quantity(gr_qty),
            quantity(po_qty)
        ));
    }

    if gr_qty != inv_qty {
        issues.push(format!(
            "GRN quantity ({}) does not match Invoice quantity ({})",
            quantity(gr_qty),
            quantity(inv_qty)
        ));
    }

    if po_qty.is_zero() {
        issues.push(
            "PO quantity is zero; quantity variance cannot be measured against tolerance"
                .to_string(),
        );
        return Deviation::Unmeasurable;
    }
    let Some(pct) = percent_of(gap, po_qty) else {
        issues.push(format!(
            "Quantity variance exceeds tolerance ({})",
            percent(tolerance_pct)
        ));
        return Deviation::Beyond;
    };

    if pct > tolerance_pct {
        issues.push(format!(
            "Quantity variance: {} exceeds tolerance ({})",
            percent(pct),
            percent(tolerance_pct)
        ));
        Deviation::Beyond
    } else {
        issues.push(format!("Quantity variance: {}", percent(pct)));
        Deviation::Within
    }
}

fn price_deviation(
    po_price: Decimal,
    inv_price: Decimal,
    tolerance_pct: Decimal,
    currency: Currency,
    issues: &mut Vec<String>,
) -> Deviation {
    if inv_price == po_price {
        return Deviation::None;
    }

    if po_price.is_zero() {
        issues.push(format!(
            "Invoice price ({}) charged against a zero PO price; price variance cannot be measured against tolerance",
            format_amount(inv_price, currency)
        ));
        return Deviation::Unmeasurable;
    }

    match percent_of((inv_price - po_price).abs(), po_price) {
        Some(pct) if pct <= tolerance_pct => {
            issues.push(format!(
                "Invoice price ({}) differs from PO price ({})",
                format_amount(inv_price, currency),
                format_amount(po_price, currency)
            ));
            issues.push(format!("Price variance: {}", percent(pct)));
            Deviation::Within
        }
        pct => {
            let relation = if inv_price > po_price {
                "exceeds"
            } else {
                "is below"
            };
            issues.push(format!(
                "Invoice price ({}) {relation} PO price ({})",
                format_amount(inv_price, currency),
                format_amount(po_price, currency)
            ));
            issues.push(match pct {
                Some(pct) => format!(
                    "Price variance: {} exceeds tolerance ({})",
                    percent(pct),
                    percent(tolerance_pct)
                ),
                None => format!("Price variance exceeds tolerance ({})", percent(tolerance_pct)),
            });
            Deviation::Beyond
        }
    }
}

fn pending_issues(
    po_line: &DocumentLine,
    gr_line: Option<&GoodsReceiptLine>,
    inv_line: Option<&DocumentLine>,
    currency: Currency,
    issues: &mut Vec<String>,
) {
    match gr_line {
        None => issues.push("Not yet received".to_string()),
        Some(gr) if gr.accepted_qty != po_line.quantity => issues.push(format!(
            "GRN accepted quantity ({}) differs from PO ({})",
            quantity(gr.accepted_qty),
            quantity(po_line.quantity)
        )),
        Some(_) => {}
    }

    let Some(inv) = inv_line else {
        issues.push("Not yet invoiced".to_string());
        return;
    };
    if inv.quantity != po_line.quantity {
        issues.push(format!(
            "Invoice quantity ({}) differs from PO ({})",
            quantity(inv.quantity),
            quantity(po_line.quantity)
        ));
    }
    if inv.unit_price != po_line.unit_price {
        issues.push(format!(
            "Invoice price ({}) differs from PO price ({})",
            format_amount(inv.unit_price, currency),
            format_amount(po_line.unit_price, currency)
        ));
    }
}

fn unordered_line(
    line_number: LineNumber,
    gr_line: Option<&GoodsReceiptLine>,
    inv_line: Option<&DocumentLine>,
    currency: Currency,
) -> MatchLineResult {
    let gr_qty = gr_line.map_or(Decimal::ZERO, |l| l.accepted_qty);
    let invoice_price = inv_line.map_or(Decimal::ZERO, |l| l.unit_price);

    let (item_code, description) = match (gr_line, inv_line) {
        (Some(gr), _) => (gr.item_code.clone(), gr.description.clone()),
        (None, Some(inv)) => (inv.item_code.clone(), inv.description.clone()),
        (None, None) => (String::new(), String::new()),
    };

    let mut issues = vec![format!("Line {line_number} is not on the purchase order")];
    if let Some(amount) = inv_line.and_then(DocumentLine::extended_amount) {
        issues.push(format!(
            "Invoiced {} without an order",
            format_amount(amount, currency)
        ));
    }
    let total = invoice_price.checked_mul(gr_qty).unwrap_or_else(|| {
        issues.push(OUT_OF_RANGE.to_string());
        Decimal::ZERO
    });

    MatchLineResult {
        line_number,
        item_code,
        description,
        po_qty: None,
        gr_qty: gr_line.map(|l| l.accepted_qty),
        invoice_qty: inv_line.map(|l| l.quantity),
        po_price: None,
        invoice_price: inv_line.map(|l| l.unit_price),
        status: MatchStatus::Exception,
        variance: Variance {
            quantity: gr_qty,
            price: invoice_price,
            total,
        },
        issues,
    }
}

/// `part / base` in percent. `None` if `base` is zero or the ratio overflows.
fn percent_of(part: Decimal, base: Decimal) -> Option<Decimal> {
    part.checked_div(base)?.checked_mul(Decimal::ONE_HUNDRED)
}

fn percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(2).normalize())
}

fn quantity(value: Decimal) -> String {
    value.normalize().to_string()
}
