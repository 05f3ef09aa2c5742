//! Plain-text rendering of match results.

use std::fmt::Write;

use matchbook_core::matching::{MatchStatus, MatchSummary, ThreeWayMatch, filter_by_status};
use matchbook_shared::types::{Currency, format_amount};
use rust_decimal::Decimal;

/// Renders the line-by-line report for a match, optionally limited to one status.
pub fn render_match(session: &ThreeWayMatch, status: Option<MatchStatus>) -> String {
    let currency = session.purchase_order.currency;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "3-Way Match {} [{}]",
        session.id,
        session.overall_status.as_str().to_uppercase()
    );
    let _ = writeln!(
        out,
        "PO {} ({}) | GRN {} ({}) | Invoice {} due {}",
        session.purchase_order.number,
        session.purchase_order.vendor,
        session.goods_receipt.number,
        session.goods_receipt.received_by,
        session.invoice.number,
        session.invoice.due_date,
    );
    let _ = writeln!(
        out,
        "Tolerance: quantity {}%, price {}%",
        session.tolerance.quantity.normalize(),
        session.tolerance.price.normalize()
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "{:<5} {:<16} {:>8} {:>8} {:>8} {:>12} {:>12} {:<10} {:>12}",
        "Line", "Item", "PO Qty", "GR Qty", "Inv Qty", "PO Price", "Inv Price", "Status", "Variance"
    );
    for result in filter_by_status(&session.matching_results, status) {
        let _ = writeln!(
            out,
            "{:<5} {:<16} {:>8} {:>8} {:>8} {:>12} {:>12} {:<10} {:>12}",
            result.line_number,
            result.item_code,
            quantity(result.po_qty),
            quantity(result.gr_qty),
            quantity(result.invoice_qty),
            amount(result.po_price, currency),
            amount(result.invoice_price, currency),
            result.status.as_str(),
            format_amount(result.variance.total, currency),
        );
        for issue in &result.issues {
            let _ = writeln!(out, "      - {issue}");
        }
    }
    out.push('\n');

    out.push_str(&render_summary(&session.summary(), currency));
    out
}

/// Renders summary counts and variance totals.
pub fn render_summary(summary: &MatchSummary, currency: Currency) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lines: {} | matched {} ({}%) | partial {} | mismatch {} | exception {} | pending {}",
        summary.total_lines,
        summary.matched,
        summary.matched_percentage.normalize(),
        summary.partial,
        summary.mismatch,
        summary.exception,
        summary.pending,
    );
    let _ = writeln!(
        out,
        "Net variance: {} | Gross variance: {}",
        format_amount(summary.net_variance, currency),
        format_amount(summary.gross_variance, currency),
    );
    out
}

fn quantity(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.normalize().to_string())
}

fn amount(value: Option<Decimal>, currency: Currency) -> String {
    value.map_or_else(|| "-".to_string(), |v| format_amount(v, currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MatchRequest;
    use crate::request::tests::SAMPLE;
    use matchbook_core::matching::Tolerance;

    fn sample_match() -> ThreeWayMatch {
        MatchRequest::from_json(SAMPLE, Currency::Usd)
            .unwrap()
            .into_match(Tolerance::default())
            .unwrap()
    }

    #[test]
    fn test_render_match_header_and_lines() {
        let text = render_match(&sample_match(), None);

        assert!(text.starts_with("3-Way Match MATCH-2024-001 [MISMATCH]\n"));
        assert!(text.contains("Tolerance: quantity 5%, price 2%"));
        assert!(text.contains("CNC-ALIGN-001"));
        assert!(text.contains("      - Price variance: 3.75% exceeds tolerance (2%)"));
        assert!(text.contains("-$124.00"));
    }

    #[test]
    fn test_render_match_filtered_by_status() {
        let text = render_match(&sample_match(), Some(MatchStatus::Exception));

        assert!(text.contains("CNC-ALIGN-001"));
        assert!(text.contains("CNC-INSERT-001"));
        assert!(!text.contains("CNC-TOOL-002"));
        assert!(!text.contains("GRN quantity (28) does not match Invoice quantity (30)"));
        // summary still covers every line
        assert!(text.contains("Lines: 6 | matched 3 (50%)"));
    }

    #[test]
    fn test_render_summary() {
        let text = render_summary(&sample_match().summary(), Currency::Usd);

        assert!(text.contains("Lines: 6 | matched 3 (50%)"));
        assert!(text.contains("Net variance: -$86.00 | Gross variance: $236.00"));
    }

    #[test]
    fn test_missing_values_render_as_dash() {
        assert_eq!(quantity(None), "-");
        assert_eq!(amount(None, Currency::Usd), "-");
    }
}
