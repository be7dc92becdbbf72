//! Raw result-set shapes handed from the database adapter to the row mapper.
//!
//! The adapter decodes driver-specific cells into [`RawCellValue`] so that the
//! mapper stays independent of the database driver.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// One decoded database cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCellValue {
    /// SQL `NULL`.
    Null,
    /// Character data.
    Text(String),
    /// Integral number.
    Integer(i64),
    /// Arbitrary-precision decimal kept in its textual form.
    Decimal(String),
    /// Floating-point number.
    Float(f64),
    /// Boolean flag.
    Boolean(bool),
    /// UUID value.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
    /// Timestamp with time zone.
    TimestampTz(DateTime<Utc>),
    /// JSON or JSONB document.
    Json(Value),
    /// Array of cells.
    Array(Vec<RawCellValue>),
}

impl RawCellValue {
    /// Whether the cell is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Result-set width did not match the declared column list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row has {actual} cells but {expected} columns were declared")]
pub struct RowWidthMismatch {
    /// Declared column count.
    pub expected: usize,
    /// Cells supplied for the row.
    pub actual: usize,
}

/// Materialized result of one history query.
///
/// ## Invariants
/// - Every row holds exactly one cell per declared column, positionally
///   aligned with [`RawHistoryResultSet::columns`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawHistoryResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<RawCellValue>>,
}

impl RawHistoryResultSet {
    /// Start an empty result set with the given column metadata.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row in result order.
    ///
    /// # Errors
    ///
    /// Returns [`RowWidthMismatch`] when `cells` does not hold one value per
    /// declared column.
    ///
    /// # Examples
    ///
    /// ```
    /// use history_excerptor::domain::history::{RawCellValue, RawHistoryResultSet};
    ///
    /// let mut result = RawHistoryResultSet::new(vec!["name".to_owned()]);
    /// result.push_row(vec![RawCellValue::Text("Ada".to_owned())])?;
    /// assert_eq!(result.rows().len(), 1);
    /// assert!(result.push_row(Vec::new()).is_err());
    /// # Ok::<(), history_excerptor::domain::history::RowWidthMismatch>(())
    /// ```
    pub fn push_row(&mut self, cells: Vec<RawCellValue>) -> Result<(), RowWidthMismatch> {
        if cells.len() != self.columns.len() {
            return Err(RowWidthMismatch {
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in result order.
    pub fn rows(&self) -> &[Vec<RawCellValue>] {
        &self.rows
    }
}
