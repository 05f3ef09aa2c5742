//! Three-way matching of purchase orders, goods receipts and invoices.

pub mod adjustment;
pub mod error;
pub mod evaluator;
pub mod session;
pub mod summary;
pub mod types;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use adjustment::{AdjustmentField, LineAdjustment, apply_adjustments};
pub use error::MatchError;
pub use evaluator::{evaluate, overall_status};
pub use session::ThreeWayMatch;
pub use summary::{MatchSummary, exception_candidates, filter_by_status};
pub use types::{
    DocumentKind, DocumentLine, GoodsReceipt, GoodsReceiptLine, Invoice, LineNumber,
    MatchLineResult, MatchStatus, PurchaseOrder, Tolerance, Variance,
};
pub use validation::{validate_documents, validate_tolerance};
