//! Data-quality checks over the clean record set
//!
//! Findings are data, not errors: each check returns what it found and
//! [`QualityReport::passed`] derives the verdict.

use crate::partition::DISCOUNT_RANGE;
use crate::record::{RecordSet, REQUIRED_COLUMNS};
use orderqc_common::Result;
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

/// Required columns absent from `records`, in required-column order.
pub fn check_schema(records: &RecordSet) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|name| !records.has_column(name))
        .map(|name| name.to_string())
        .collect()
}

/// Null count for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Null counts for every column, zero counts included
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct MissingValueCensus(Vec<ColumnMissing>);

impl MissingValueCensus {
    pub fn columns(&self) -> &[ColumnMissing] {
        &self.0
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.missing)
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|c| c.missing).sum()
    }
}

impl From<Vec<ColumnMissing>> for MissingValueCensus {
    fn from(entries: Vec<ColumnMissing>) -> Self {
        Self(entries)
    }
}

/// Count null cells per column, in header order.
pub fn check_missing_values(records: &RecordSet) -> MissingValueCensus {
    let census = records
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| ColumnMissing {
            column: column.clone(),
            missing: records.rows().iter().filter(|row| row.is_null(index)).count(),
        })
        .collect();
    MissingValueCensus(census)
}

/// A numeric invariant violated somewhere in the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RangeIssue {
    NonPositiveUnitPrice,
    NonPositiveQuantity,
    DiscountOutOfRange,
}

impl std::fmt::Display for RangeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveUnitPrice => write!(f, "unit_price has zero or negative values"),
            Self::NonPositiveQuantity => write!(f, "quantity has zero or negative values"),
            Self::DiscountOutOfRange => write!(f, "discount outside allowed range (0–0.5)"),
        }
    }
}

impl Serialize for RangeIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Each violated invariant once, ordered unit_price, quantity, discount.
///
/// Nulls and absent columns never violate. Runs on rows that already passed
/// partitioning, so any finding means the cleaning step let something slip.
pub fn check_numeric_ranges(records: &RecordSet) -> Result<Vec<RangeIssue>> {
    let (low, high) = DISCOUNT_RANGE;
    let mut issues = Vec::new();

    if any_number(records, "unit_price", |p| p <= 0.0)? {
        issues.push(RangeIssue::NonPositiveUnitPrice);
    }
    if any_number(records, "quantity", |q| q <= 0.0)? {
        issues.push(RangeIssue::NonPositiveQuantity);
    }
    if any_number(records, "discount", |d| d < low || d > high)? {
        issues.push(RangeIssue::DiscountOutOfRange);
    }

    Ok(issues)
}

fn any_number(records: &RecordSet, column: &str, violates: impl Fn(f64) -> bool) -> Result<bool> {
    if !records.has_column(column) {
        return Ok(false);
    }
    for row in records.rows() {
        if records.number(row, column)?.is_some_and(&violates) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Aggregate of all three checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub schema_issues: Vec<String>,
    pub missing_values: MissingValueCensus,
    pub range_issues: Vec<RangeIssue>,
}

impl QualityReport {
    /// Run every check against `records` in report order.
    ///
    /// `on_check` receives a progress marker before each check starts; an
    /// error from it aborts the evaluation.
    #[instrument(skip(records, on_check), fields(rows = records.len()))]
    pub fn evaluate(
        records: &RecordSet,
        mut on_check: impl FnMut(&str) -> Result<()>,
    ) -> Result<Self> {
        on_check("Checking schema...")?;
        let schema_issues = check_schema(records);

        on_check("Checking missing values...")?;
        let missing_values = check_missing_values(records);

        on_check("Checking numeric ranges...")?;
        let range_issues = check_numeric_ranges(records)?;

        let report = Self {
            schema_issues,
            missing_values,
            range_issues,
        };
        debug!(passed = report.passed(), "Evaluated quality checks");
        Ok(report)
    }

    /// PASS only with no schema gaps, no range issues and not a single null.
    pub fn passed(&self) -> bool {
        self.schema_issues.is_empty()
            && self.range_issues.is_empty()
            && self.missing_values.total() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::record::Row;
    use orderqc_common::QcError;
    use proptest::prelude::*;

    fn set(columns: &[&str], rows: &[&[&str]]) -> RecordSet {
        RecordSet::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .enumerate()
                .map(|(i, r)| Row::new(i as u64 + 2, r.iter().map(|c| c.to_string()).collect()))
                .collect(),
        )
        .unwrap()
    }

    fn complete_order() -> RecordSet {
        set(
            &REQUIRED_COLUMNS,
            &[&["1", "2024-01-01", "toys", "10", "2", "0.1"]],
        )
    }

    #[test]
    fn test_schema_reports_missing_order_id() {
        let records = set(
            &["order_date", "product_category", "unit_price", "quantity", "discount"],
            &[&["2024-01-01", "toys", "10", "2", "0.1"]],
        );
        let report = QualityReport::evaluate(&records, |_| Ok(())).unwrap();

        assert_eq!(report.schema_issues, ["order_id"]);
        assert_eq!(report.missing_values.total(), 0);
        assert!(report.range_issues.is_empty());
        assert!(!report.passed());
    }

    #[test]
    fn test_schema_ignores_order_and_extra_columns() {
        let records = set(
            &["extra", "discount", "quantity", "unit_price", "product_category", "order_date", "order_id"],
            &[],
        );
        assert!(check_schema(&records).is_empty());
    }

    #[test]
    fn test_census_includes_zero_counts() {
        let records = set(&["a", "b", "c"], &[&["1", "", "x"], &["2", "NA", ""]]);
        let census = check_missing_values(&records);

        let counts: Vec<_> = census.columns().iter().map(|c| (c.column.as_str(), c.missing)).collect();
        assert_eq!(counts, [("a", 0), ("b", 2), ("c", 1)]);
        assert_eq!(census.total(), 3);
        assert_eq!(census.get("b"), Some(2));
        assert_eq!(census.get("zzz"), None);
    }

    #[test]
    fn test_range_issues_are_reported_once_in_fixed_order() {
        let records = set(
            &["discount", "quantity", "unit_price"],
            &[&["0.9", "0", "-1"], &["-0.2", "-4", "0"], &["0.1", "1", "5"]],
        );
        let issues = check_numeric_ranges(&records).unwrap();

        assert_eq!(
            issues,
            [
                RangeIssue::NonPositiveUnitPrice,
                RangeIssue::NonPositiveQuantity,
                RangeIssue::DiscountOutOfRange
            ]
        );
        assert_eq!(issues[2].to_string(), "discount outside allowed range (0–0.5)");
    }

    #[test]
    fn test_nulls_and_absent_columns_never_violate() {
        let records = set(&["unit_price", "discount"], &[&["", "NaN"]]);
        assert!(check_numeric_ranges(&records).unwrap().is_empty());
    }

    #[test]
    fn test_single_null_fails_the_verdict() {
        let passing = QualityReport::evaluate(&complete_order(), |_| Ok(())).unwrap();
        assert!(passing.passed());

        let records = set(
            &["order_id", "order_date", "product_category", "unit_price", "quantity", "discount", "note"],
            &[&["1", "2024-01-01", "toys", "10", "2", "0.1", ""]],
        );
        let report = QualityReport::evaluate(&records, |_| Ok(())).unwrap();
        assert!(report.schema_issues.is_empty());
        assert!(report.range_issues.is_empty());
        assert!(!report.passed());
    }

    #[test]
    fn test_evaluate_announces_each_check_in_order() {
        let mut markers = Vec::new();
        QualityReport::evaluate(&complete_order(), |marker| {
            markers.push(marker.to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(
            markers,
            ["Checking schema...", "Checking missing values...", "Checking numeric ranges..."]
        );
    }

    #[test]
    fn test_evaluate_stops_when_progress_fails() {
        let mut seen = 0;
        let err = QualityReport::evaluate(&complete_order(), |_| {
            seen += 1;
            Err(QcError::config("progress output closed"))
        })
        .unwrap_err();

        assert_eq!(seen, 1);
        assert!(matches!(err, QcError::Config(_)));
    }

    #[test]
    fn test_report_serializes_messages() {
        let report = QualityReport {
            schema_issues: vec!["order_id".into()],
            missing_values: MissingValueCensus::default(),
            range_issues: vec![RangeIssue::NonPositiveQuantity],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["range_issues"][0], "quantity has zero or negative values");
        assert_eq!(json["missing_values"], serde_json::json!([]));
    }

    proptest! {
        #[test]
        fn prop_schema_check_is_monotonic(present in proptest::collection::vec(any::<bool>(), 6)) {
            let columns: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .zip(&present)
                .filter_map(|(name, keep)| keep.then_some(*name))
                .collect();
            let base = check_schema(&set(&columns, &[]));
            prop_assert_eq!(base.len(), present.iter().filter(|p| !**p).count());

            for name in REQUIRED_COLUMNS {
                let mut grown = columns.clone();
                let mut shrunk = columns.clone();
                if columns.contains(&name) {
                    shrunk.retain(|c| *c != name);
                    prop_assert!(check_schema(&set(&shrunk, &[])).len() == base.len() + 1);
                } else {
                    grown.push(name);
                    prop_assert!(check_schema(&set(&grown, &[])).len() + 1 == base.len());
                }
            }
        }
    }
}
