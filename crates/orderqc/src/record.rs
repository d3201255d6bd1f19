//! In-memory tabular record sets
//!
//! Cells keep their raw source text so a row can be written back exactly as
//! it was read. Nullness and numeric meaning are views over that text.

use orderqc_common::{QcError, Result};

/// Column names every order file must carry, in report order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "order_id",
    "order_date",
    "product_category",
    "unit_price",
    "quantity",
    "discount",
];

/// Cell texts read as a missing value.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell text denotes a missing value
pub fn is_null_text(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw)
}

/// One data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line in the source file, 0 for rows built in memory
    pub line: u64,
    cells: Vec<String>,
}

impl Row {
    pub fn new(line: u64, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    /// Raw text of every cell, in header order
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell value at `index`, `None` when the column is absent or the cell is null
    pub fn value(&self, index: Option<usize>) -> Option<&str> {
        let raw = self.cells.get(index?)?;
        (!is_null_text(raw)).then_some(raw.as_str())
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.value(Some(index)).is_none()
    }

    pub(crate) fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value.into();
        }
    }
}

/// Ordered rows under an ordered header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RecordSet {
    /// Build a record set, padding short rows with nulls.
    ///
    /// Fails when a row has more cells than the header has columns.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.cells.len() > width {
                    return Err(QcError::parse(format!(
                        "line {}: expected {} fields, saw {}",
                        row.line,
                        width,
                        row.cells.len()
                    )));
                }
                row.cells.resize(width, String::new());
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, rows })
    }

    /// An empty record set sharing this set's header
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub(crate) fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Numeric view of one cell; nulls and absent columns read as `None`.
    pub fn number(&self, row: &Row, column: &str) -> Result<Option<f64>> {
        parse_number(row, self.column_index(column), column)
    }
}

pub(crate) fn parse_number(row: &Row, index: Option<usize>, column: &str) -> Result<Option<f64>> {
    let Some(raw) = row.value(index) else {
        return Ok(None);
    };

    raw.trim().parse::<f64>().map(Some).map_err(|_| {
        QcError::parse(format!(
            "line {}: column '{}' holds non-numeric value '{}'",
            row.line, column, raw
        ))
    })
}
