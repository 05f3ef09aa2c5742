//! Summary statistics and filters over line results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{LineNumber, MatchLineResult, MatchStatus};

/// Counts and totals across the lines of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Number of line results.
    pub total_lines: usize,
    /// Lines with status `matched`.
    pub matched: usize,
    /// Lines with status `partial`.
    pub partial: usize,
    /// Lines with status `mismatch`.
    pub mismatch: usize,
    /// Lines with status `pending`.
    pub pending: usize,
    /// Lines with status `exception`.
    pub exception: usize,
    /// Share of matched lines, in percent, two decimal places.
    pub matched_percentage: Decimal,
    /// Sum of line total variances.
    pub net_variance: Decimal,
    /// Sum of absolute line total variances.
    pub gross_variance: Decimal,
}

impl MatchSummary {
    /// Builds the summary for a set of line results.
    #[must_use]
    pub fn from_results(results: &[MatchLineResult]) -> Self {
        let mut summary = Self {
            total_lines: results.len(),
            matched: 0,
            partial: 0,
            mismatch: 0,
            pending: 0,
            exception: 0,
            matched_percentage: Decimal::ZERO,
            net_variance: Decimal::ZERO,
            gross_variance: Decimal::ZERO,
        };

        for result in results {
            match result.status {
                MatchStatus::Matched => summary.matched += 1,
                MatchStatus::Partial => summary.partial += 1,
                MatchStatus::Mismatch => summary.mismatch += 1,
                MatchStatus::Pending => summary.pending += 1,
                MatchStatus::Exception => summary.exception += 1,
            }
            // saturates only for documents that skipped validation
            summary.net_variance = summary.net_variance.saturating_add(result.variance.total);
            summary.gross_variance = summary
                .gross_variance
                .saturating_add(result.variance.total.abs());
        }

        if summary.total_lines > 0 {
            summary.matched_percentage = (Decimal::from(summary.matched)
                / Decimal::from(summary.total_lines)
                * Decimal::ONE_HUNDRED)
                .round_dp(2);
        }

        summary
    }

    /// Number of lines with the given status.
    #[must_use]
    pub fn count(&self, status: MatchStatus) -> usize {
        match status {
            MatchStatus::Matched => self.matched,
            MatchStatus::Partial => self.partial,
            MatchStatus::Mismatch => self.mismatch,
            MatchStatus::Pending => self.pending,
            MatchStatus::Exception => self.exception,
        }
    }
}

/// Returns all lines, or only those with `status` when one is given.
#[must_use]
pub fn filter_by_status(
    results: &[MatchLineResult],
    status: Option<MatchStatus>,
) -> Vec<&MatchLineResult> {
    results
        .iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect()
}

/// Line numbers that need an exception ticket: every line not `matched`.
#[must_use]
pub fn exception_candidates(results: &[MatchLineResult]) -> Vec<LineNumber> {
    results
        .iter()
        .filter(|r| r.status != MatchStatus::Matched)
        .map(|r| r.line_number)
        .collect()
}
