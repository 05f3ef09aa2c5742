//! Match request files.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use matchbook_core::matching::{
    GoodsReceipt, Invoice, LineAdjustment, MatchError, PurchaseOrder, ThreeWayMatch, Tolerance,
};
use matchbook_shared::{AppError, AppResult};
use matchbook_shared::config::MatchingConfig;
use matchbook_shared::types::Currency;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// Documents and options for one match run, as read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    /// Match ID.
    pub id: String,
    /// Purchase order.
    pub purchase_order: PurchaseOrder,
    /// Goods receipt.
    pub goods_receipt: GoodsReceipt,
    /// Invoice.
    pub invoice: Invoice,
    /// Tolerance for this request. Falls back to configuration.
    #[serde(default)]
    pub tolerance: Option<Tolerance>,
    /// Corrections applied before the final match.
    #[serde(default)]
    pub adjustments: Vec<LineAdjustment>,
    /// Creation timestamp. Defaults to now.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MatchRequest {
    /// Reads a request from a JSON file.
    pub fn from_file(path: &Path, default_currency: Currency) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
            _ => AppError::Internal(format!("{}: {err}", path.display())),
        })?;
        Self::from_json(&raw, default_currency)
    }

    /// Parses a request, filling in the purchase order currency if it is absent.
    pub fn from_json(raw: &str, default_currency: Currency) -> AppResult<Self> {
        let mut value: Value =
            serde_json::from_str(raw).map_err(|err| AppError::Validation(err.to_string()))?;

        if let Some(po) = value.get_mut("purchase_order").and_then(Value::as_object_mut) {
            po.entry("currency")
                .or_insert_with(|| Value::String(default_currency.to_string()));
        }

        serde_json::from_value(value).map_err(|err| AppError::Validation(err.to_string()))
    }

    /// Resolves the tolerance per dimension: flag, then request, then config.
    #[must_use]
    pub fn resolve_tolerance(
        &self,
        quantity: Option<Decimal>,
        price: Option<Decimal>,
        config: &MatchingConfig,
    ) -> Tolerance {
        let base = self.tolerance.unwrap_or_else(|| Tolerance::from(config));
        Tolerance::new(
            quantity.unwrap_or(base.quantity),
            price.unwrap_or(base.price),
        )
    }

    /// Runs the match and applies any adjustments.
    pub fn into_match(self, tolerance: Tolerance) -> Result<ThreeWayMatch, MatchError> {
        let mut session = ThreeWayMatch::run(
            self.id,
            self.purchase_order,
            self.goods_receipt,
            self.invoice,
            tolerance,
            self.created_at.unwrap_or_else(Utc::now),
        )?;

        if !self.adjustments.is_empty() {
            session.adjust(&self.adjustments)?;
        }

        Ok(session)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use matchbook_core::matching::MatchStatus;
    use rust_decimal_macros::dec;

    pub(crate) const SAMPLE: &str = include_str!("../../../demos/cnc-tooling.json");

    #[test]
    fn test_parse_sample() {
        let request = MatchRequest::from_json(SAMPLE, Currency::Eur).unwrap();

        assert_eq!(request.id, "MATCH-2024-001");
        assert_eq!(request.purchase_order.currency, Currency::Usd);
        assert_eq!(request.purchase_order.lines.len(), 6);
        assert_eq!(request.goods_receipt.lines[2].rejected_qty, dec!(3));
        assert_eq!(request.invoice.lines[5].unit_price, dec!(1037.50));
        assert!(request.adjustments.is_empty());
    }

    #[test]
    fn test_missing_currency_uses_default() {
        let mut value: Value = serde_json::from_str(SAMPLE).unwrap();
        value["purchase_order"]
            .as_object_mut()
            .unwrap()
            .remove("currency");

        let request = MatchRequest::from_json(&value.to_string(), Currency::Inr).unwrap();

        assert_eq!(request.purchase_order.currency, Currency::Inr);
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        let err = MatchRequest::from_json("{", Currency::Usd).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err =
            MatchRequest::from_file(Path::new("no/such/request.json"), Currency::Usd).unwrap_err();
        assert_eq!(err.exit_code(), 66);
    }

    #[test]
    fn test_tolerance_precedence() {
        let mut request = MatchRequest::from_json(SAMPLE, Currency::Usd).unwrap();
        let config = MatchingConfig::default();

        let resolved = request.resolve_tolerance(None, Some(dec!(4)), &config);
        assert_eq!(resolved, Tolerance::new(dec!(5), dec!(4)));

        request.tolerance = None;
        let resolved = request.resolve_tolerance(Some(dec!(1)), None, &config);
        assert_eq!(resolved, Tolerance::new(dec!(1), config.price_tolerance));
    }

    #[test]
    fn test_amount_out_of_range_is_validation_error() {
        let mut request = MatchRequest::from_json(SAMPLE, Currency::Usd).unwrap();
        request.purchase_order.lines[0].quantity = dec!(100000000000000000);
        request.purchase_order.lines[0].unit_price = dec!(10000000000000);

        let err = request.into_match(Tolerance::default()).unwrap_err();

        assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
        assert_eq!(AppError::from(err).exit_code(), 65);
    }

    #[test]
    fn test_into_match_applies_adjustments() {
        let mut request = MatchRequest::from_json(SAMPLE, Currency::Usd).unwrap();
        request.adjustments = serde_json::from_str(
            r#"[{"line_number": 6, "field": "invoice_unit_price", "value": "1000.00"}]"#,
        )
        .unwrap();

        let session = request.into_match(Tolerance::default()).unwrap();

        assert_eq!(session.matching_results[5].status, MatchStatus::Matched);
        assert_eq!(session.overall_status, MatchStatus::Mismatch);
    }
}
