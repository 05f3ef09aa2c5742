//! Three-way match aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::adjustment::{LineAdjustment, apply_adjustments};
use super::error::MatchError;
use super::evaluator::{evaluate, overall_status};
use super::summary::{MatchSummary, exception_candidates};
use super::types::{
    GoodsReceipt, Invoice, LineNumber, MatchLineResult, MatchStatus, PurchaseOrder, Tolerance,
};
use super::validation::{validate_documents, validate_tolerance};

/// A purchase order, goods receipt and invoice matched under one tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeWayMatch {
    /// Match ID.
    pub id: String,
    /// Purchase order.
    pub purchase_order: PurchaseOrder,
    /// Goods receipt.
    pub goods_receipt: GoodsReceipt,
    /// Invoice.
    pub invoice: Invoice,
    /// Per-line results, recomputed on every run.
    pub matching_results: Vec<MatchLineResult>,
    /// Worst line status.
    pub overall_status: MatchStatus,
    /// Tolerance applied to every line.
    pub tolerance: Tolerance,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Who resolved the match, if anyone.
    pub resolved_by: Option<String>,
    /// When the match was resolved.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ThreeWayMatch {
    /// Validates the inputs and runs the match.
    ///
    /// # Errors
    ///
    /// Returns a `MatchError` if the tolerance or any document is structurally invalid.
    pub fn run(
        id: impl Into<String>,
        purchase_order: PurchaseOrder,
        goods_receipt: GoodsReceipt,
        invoice: Invoice,
        tolerance: Tolerance,
        created_at: DateTime<Utc>,
    ) -> Result<Self, MatchError> {
        validate_tolerance(&tolerance)?;
        validate_documents(&purchase_order, &goods_receipt, &invoice)?;

        let matching_results = evaluate(&purchase_order, &goods_receipt, &invoice, &tolerance);
        let overall_status = overall_status(&matching_results);

        Ok(Self {
            id: id.into(),
            purchase_order,
            goods_receipt,
            invoice,
            matching_results,
            overall_status,
            tolerance,
            created_at,
            resolved_by: None,
            resolved_at: None,
        })
    }

    /// Recomputes line results and overall status from the stored documents.
    pub fn rematch(&mut self) {
        self.matching_results = evaluate(
            &self.purchase_order,
            &self.goods_receipt,
            &self.invoice,
            &self.tolerance,
        );
        self.overall_status = overall_status(&self.matching_results);
    }

    /// Applies line adjustments to the goods receipt and invoice, then re-matches.
    ///
    /// On error the match is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `MatchError` if an adjustment is invalid or the adjusted
    /// documents fail validation.
    pub fn adjust(&mut self, adjustments: &[LineAdjustment]) -> Result<(), MatchError> {
        let (goods_receipt, invoice) =
            apply_adjustments(&self.goods_receipt, &self.invoice, adjustments)?;
        validate_documents(&self.purchase_order, &goods_receipt, &invoice)?;

        self.goods_receipt = goods_receipt;
        self.invoice = invoice;
        self.rematch();
        Ok(())
    }

    /// Summary statistics for the current results.
    #[must_use]
    pub fn summary(&self) -> MatchSummary {
        MatchSummary::from_results(&self.matching_results)
    }

    /// Line numbers that are not matched.
    #[must_use]
    pub fn exception_candidates(&self) -> Vec<LineNumber> {
        exception_candidates(&self.matching_results)
    }
}
