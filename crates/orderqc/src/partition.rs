//! Clean / quarantine partitioning
//!
//! Every row is checked against four independent validity conditions. A row
//! that violates any of them is quarantined untouched; the rest form the
//! clean set, where a missing `product_category` is defaulted.

use crate::record::{parse_number, RecordSet, Row};
use orderqc_common::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace};

/// Category written into clean rows that arrived without one
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Inclusive bounds of an acceptable discount
pub const DISCOUNT_RANGE: (f64, f64) = (0.0, 0.5);

/// Why a row was quarantined
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineReason {
    MissingOrderDate,
    NonPositiveUnitPrice,
    NonPositiveQuantity,
    DiscountOutOfRange,
}

impl std::fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOrderDate => write!(f, "order_date is missing"),
            Self::NonPositiveUnitPrice => write!(f, "unit_price <= 0"),
            Self::NonPositiveQuantity => write!(f, "quantity <= 0"),
            Self::DiscountOutOfRange => write!(f, "discount outside [0, 0.5]"),
        }
    }
}

/// Counts produced by one partitioning pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningSummary {
    pub initial_rows: usize,
    pub clean_rows: usize,
    pub quarantined_rows: usize,
    /// A row with several violations is counted under each of them
    pub reasons: BTreeMap<QuarantineReason, usize>,
}

/// Result of splitting a record set
#[derive(Debug, Clone)]
pub struct Partition {
    pub clean: RecordSet,
    pub quarantine: RecordSet,
    pub summary: CleaningSummary,
}

/// Header positions of the columns the validity conditions read
#[derive(Debug, Clone, Copy)]
struct ConditionColumns {
    order_date: Option<usize>,
    unit_price: Option<usize>,
    quantity: Option<usize>,
    discount: Option<usize>,
}

impl ConditionColumns {
    fn resolve(records: &RecordSet) -> Self {
        Self {
            order_date: records.column_index("order_date"),
            unit_price: records.column_index("unit_price"),
            quantity: records.column_index("quantity"),
            discount: records.column_index("discount"),
        }
    }

    /// All violated conditions of a row, in condition order.
    ///
    /// An absent column reads as all-null. Null prices and quantities are not
    /// `<= 0`; a null discount is out of range.
    fn violations(&self, row: &Row) -> Result<Vec<QuarantineReason>> {
        let unit_price = parse_number(row, self.unit_price, "unit_price")?;
        let quantity = parse_number(row, self.quantity, "quantity")?;
        let discount = parse_number(row, self.discount, "discount")?;
        let (low, high) = DISCOUNT_RANGE;

        let checks = [
            (
                row.value(self.order_date).is_none(),
                QuarantineReason::MissingOrderDate,
            ),
            (
                unit_price.is_some_and(|p| p <= 0.0),
                QuarantineReason::NonPositiveUnitPrice,
            ),
            (
                quantity.is_some_and(|q| q <= 0.0),
                QuarantineReason::NonPositiveQuantity,
            ),
            (
                !discount.is_some_and(|d| (low..=high).contains(&d)),
                QuarantineReason::DiscountOutOfRange,
            ),
        ];

        Ok(checks
            .into_iter()
            .filter_map(|(violated, reason)| violated.then_some(reason))
            .collect())
    }
}

/// Split `records` into clean and quarantined rows.
///
/// Both outputs keep the input header and input row order. Fails only when a
/// numeric column holds text that is not a number.
#[instrument(skip(records), fields(rows = records.len()))]
pub fn partition(records: &RecordSet) -> Result<Partition> {
    let columns = ConditionColumns::resolve(records);
    let mut clean = records.empty_like();
    let mut quarantine = records.empty_like();
    let mut reasons = BTreeMap::new();

    for row in records.rows() {
        let violations = columns.violations(row)?;
        if violations.is_empty() {
            clean.push(row.clone());
            continue;
        }

        trace!(line = row.line, ?violations, "Quarantining row");
        for reason in violations {
            *reasons.entry(reason).or_insert(0) += 1;
        }
        quarantine.push(row.clone());
    }

    let filled = fill_missing_category(&mut clean);
    if filled > 0 {
        debug!(rows = filled, "Defaulted missing product_category to {}", UNKNOWN_CATEGORY);
    }

    let summary = CleaningSummary {
        initial_rows: records.len(),
        clean_rows: clean.len(),
        quarantined_rows: quarantine.len(),
        reasons,
    };
    info!(
        clean = summary.clean_rows,
        quarantined = summary.quarantined_rows,
        "Partitioned records"
    );

    Ok(Partition {
        clean,
        quarantine,
        summary,
    })
}

/// Replace null `product_category` cells; the column is never added.
fn fill_missing_category(records: &mut RecordSet) -> usize {
    let Some(index) = records.column_index("product_category") else {
        return 0;
    };

    let mut filled = 0;
    for row in records.rows_mut() {
        if row.is_null(index) {
            row.set(index, UNKNOWN_CATEGORY);
            filled += 1;
        }
    }
    filled
}
