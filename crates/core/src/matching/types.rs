//! Matching domain types.
//!
//! Purchase orders, goods receipts and invoices share a common line shape
//! keyed by line number. Line numbers correlate the three documents.

use std::fmt;

use chrono::NaiveDate;
use matchbook_shared::config::MatchingConfig;
use matchbook_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Line number correlating lines across documents.
pub type LineNumber = u32;

/// A line on a purchase order or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Line number, unique within its document.
    pub line_number: LineNumber,
    /// Item code.
    pub item_code: String,
    /// Item description.
    #[serde(default)]
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line total (quantity x unit price). Informational only.
    #[serde(default)]
    pub total_amount: Decimal,
    /// Unit of measure.
    #[serde(default)]
    pub uom: String,
}

impl DocumentLine {
    /// Quantity multiplied by unit price, or `None` if the product overflows.
    #[must_use]
    pub fn extended_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// A line on a goods receipt, with inspection outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceiptLine {
    /// Line number matching the purchase order line.
    pub line_number: LineNumber,
    /// Item code.
    pub item_code: String,
    /// Item description.
    #[serde(default)]
    pub description: String,
    /// Quantity shipped per the delivery note.
    pub quantity: Decimal,
    /// Unit price carried from the purchase order.
    pub unit_price: Decimal,
    /// Line total. Informational only.
    #[serde(default)]
    pub total_amount: Decimal,
    /// Unit of measure.
    #[serde(default)]
    pub uom: String,
    /// Quantity physically received.
    pub received_qty: Decimal,
    /// Quantity accepted at inspection. This is the effective received quantity.
    pub accepted_qty: Decimal,
    /// Quantity rejected at inspection.
    #[serde(default)]
    pub rejected_qty: Decimal,
}

/// Purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Document ID.
    pub id: String,
    /// Document number.
    pub number: String,
    /// Order date.
    pub date: NaiveDate,
    /// Vendor reference.
    pub vendor: String,
    /// Order currency.
    #[serde(default)]
    pub currency: Currency,
    /// Ordered lines.
    pub lines: Vec<DocumentLine>,
    /// Declared total.
    pub total_amount: Decimal,
}

/// Goods receipt note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceipt {
    /// Document ID.
    pub id: String,
    /// Document number.
    pub number: String,
    /// Receipt date.
    pub date: NaiveDate,
    /// Person who received the goods.
    pub received_by: String,
    /// Received lines.
    pub lines: Vec<GoodsReceiptLine>,
    /// Declared total.
    pub total_amount: Decimal,
}

/// Vendor invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Document ID.
    pub id: String,
    /// Document number.
    pub number: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Invoiced lines.
    pub lines: Vec<DocumentLine>,
    /// Declared total, excluding tax.
    pub total_amount: Decimal,
    /// Tax amount.
    #[serde(default)]
    pub tax_amount: Decimal,
}

impl PurchaseOrder {
    /// Returns the first line with the given number.
    #[must_use]
    pub fn line(&self, line_number: LineNumber) -> Option<&DocumentLine> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }
}

impl GoodsReceipt {
    /// Returns the first line with the given number.
    #[must_use]
    pub fn line(&self, line_number: LineNumber) -> Option<&GoodsReceiptLine> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }
}

impl Invoice {
    /// Returns the first line with the given number.
    #[must_use]
    pub fn line(&self, line_number: LineNumber) -> Option<&DocumentLine> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }
}

/// Which of the three documents a line or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Purchase order.
    PurchaseOrder,
    /// Goods receipt note.
    GoodsReceipt,
    /// Vendor invoice.
    Invoice,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PurchaseOrder => write!(f, "purchase order"),
            Self::GoodsReceipt => write!(f, "goods receipt"),
            Self::Invoice => write!(f, "invoice"),
        }
    }
}

/// Match status of a line or of a whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Quantities and prices agree on all three documents.
    Matched,
    /// A single dimension deviates within tolerance.
    Partial,
    /// Quantities disagree beyond tolerance.
    Mismatch,
    /// Goods receipt or invoice not yet available.
    Pending,
    /// Needs manual review: price beyond tolerance, several dimensions off,
    /// or a deviation that cannot be measured.
    Exception,
}

impl MatchStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 5] = [
        Self::Matched,
        Self::Partial,
        Self::Mismatch,
        Self::Pending,
        Self::Exception,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Partial => "partial",
            Self::Mismatch => "mismatch",
            Self::Pending => "pending",
            Self::Exception => "exception",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "matched" => Some(Self::Matched),
            "partial" => Some(Self::Partial),
            "mismatch" => Some(Self::Mismatch),
            "pending" => Some(Self::Pending),
            "exception" => Some(Self::Exception),
            _ => None,
        }
    }

    /// Rank used for the worst-case roll-up. Higher is worse.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Matched => 0,
            Self::Pending => 1,
            Self::Partial => 2,
            Self::Exception => 3,
            Self::Mismatch => 4,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Allowed deviation, in percent, applied to every line of one match run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Quantity tolerance in percent.
    pub quantity: Decimal,
    /// Price tolerance in percent.
    pub price: Decimal,
}

impl Tolerance {
    /// Creates a tolerance from quantity and price percentages.
    #[must_use]
    pub const fn new(quantity: Decimal, price: Decimal) -> Self {
        Self { quantity, price }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from(&MatchingConfig::default())
    }
}

impl From<&MatchingConfig> for Tolerance {
    fn from(config: &MatchingConfig) -> Self {
        Self::new(config.quantity_tolerance, config.price_tolerance)
    }
}

/// Quantity, price and monetary variance of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Variance {
    /// Received quantity minus ordered quantity.
    pub quantity: Decimal,
    /// Invoiced unit price minus ordered unit price.
    pub price: Decimal,
    /// Monetary impact: `quantity x PO price + price x received quantity`.
    pub total: Decimal,
}

impl Variance {
    /// Returns true if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.quantity.is_zero() && self.price.is_zero() && self.total.is_zero()
    }
}

/// Outcome of matching one line number across the three documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLineResult {
    /// Line number.
    pub line_number: LineNumber,
    /// Item code, taken from the first document carrying the line.
    pub item_code: String,
    /// Item description.
    pub description: String,
    /// Ordered quantity. `None` if the line is not on the PO.
    pub po_qty: Option<Decimal>,
    /// Accepted quantity. `None` if not yet received.
    pub gr_qty: Option<Decimal>,
    /// Invoiced quantity. `None` if not yet invoiced.
    pub invoice_qty: Option<Decimal>,
    /// Ordered unit price. `None` if the line is not on the PO.
    pub po_price: Option<Decimal>,
    /// Invoiced unit price. `None` if not yet invoiced.
    pub invoice_price: Option<Decimal>,
    /// Line status.
    pub status: MatchStatus,
    /// Line variance.
    pub variance: Variance,
    /// Human-readable issues. Empty exactly when the line is matched.
    pub issues: Vec<String>,
}
