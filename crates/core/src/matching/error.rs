//! Matching error types.

use matchbook_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{DocumentKind, LineNumber};

/// Errors raised for inputs the matcher cannot reason about.
///
/// Missing goods receipt or invoice lines are not errors; they produce
/// `pending` lines.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Purchase order has no lines.
    #[error("Purchase order {0} has no lines")]
    EmptyPurchaseOrder(String),

    /// The same line number appears twice in one document.
    #[error("Duplicate line number {line_number} on {document}")]
    DuplicateLine {
        /// Document carrying the duplicate.
        document: DocumentKind,
        /// Duplicated line number.
        line_number: LineNumber,
    },

    /// A quantity is negative.
    #[error("Negative quantity on {document} line {line_number}")]
    NegativeQuantity {
        /// Document carrying the line.
        document: DocumentKind,
        /// Offending line number.
        line_number: LineNumber,
    },

    /// A unit price is negative.
    #[error("Negative unit price on {document} line {line_number}")]
    NegativePrice {
        /// Document carrying the line.
        document: DocumentKind,
        /// Offending line number.
        line_number: LineNumber,
    },

    /// Accepted plus rejected quantity exceeds the received quantity.
    #[error(
        "Goods receipt line {line_number}: accepted ({accepted}) + rejected ({rejected}) exceeds received ({received})"
    )]
    OverAccepted {
        /// Offending line number.
        line_number: LineNumber,
        /// Accepted quantity.
        accepted: Decimal,
        /// Rejected quantity.
        rejected: Decimal,
        /// Received quantity.
        received: Decimal,
    },

    /// A line amount or variance does not fit in a decimal.
    #[error("Amounts on {document} line {line_number} exceed the supported numeric range")]
    AmountOutOfRange {
        /// Document carrying the line.
        document: DocumentKind,
        /// Offending line number.
        line_number: LineNumber,
    },

    /// A tolerance percentage is negative.
    #[error("Tolerance cannot be negative: {dimension} = {value}")]
    NegativeTolerance {
        /// `quantity` or `price`.
        dimension: &'static str,
        /// Configured value.
        value: Decimal,
    },

    /// An adjustment names a line that does not exist.
    #[error("No line {line_number} on {document}")]
    UnknownLine {
        /// Document that was searched.
        document: DocumentKind,
        /// Requested line number.
        line_number: LineNumber,
    },

    /// An adjustment sets a negative value.
    #[error("Adjustment for line {line_number} cannot be negative: {value}")]
    NegativeAdjustment {
        /// Target line number.
        line_number: LineNumber,
        /// Requested value.
        value: Decimal,
    },
}

impl MatchError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPurchaseOrder(_) => "EMPTY_PURCHASE_ORDER",
            Self::DuplicateLine { .. } => "DUPLICATE_LINE",
            Self::NegativeQuantity { .. } => "NEGATIVE_QUANTITY",
            Self::NegativePrice { .. } => "NEGATIVE_PRICE",
            Self::OverAccepted { .. } => "OVER_ACCEPTED",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::NegativeTolerance { .. } => "NEGATIVE_TOLERANCE",
            Self::UnknownLine { .. } => "UNKNOWN_LINE",
            Self::NegativeAdjustment { .. } => "NEGATIVE_ADJUSTMENT",
        }
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::OverAccepted { .. } => Self::BusinessRule(err.to_string()),
            MatchError::UnknownLine { .. } => Self::NotFound(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
