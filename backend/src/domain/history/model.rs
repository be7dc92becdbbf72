//! History excerpt data model.
//!
//! All values are query-scoped: built while consuming one result set and
//! immutable afterwards. Serialisation uses camelCase field names because the
//! payload is forwarded verbatim as excerpt input data.

use std::collections::BTreeMap;

use serde::Serialize;

/// Semantic type of one operational cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationalTableFieldType {
    /// Plain text, also used for `NULL` cells.
    Text,
    /// Integral, decimal, or floating-point number.
    Numeric,
    /// Boolean flag.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time of day.
    DateTime,
    /// UUID identifier.
    Uuid,
    /// JSON document other than a top-level array.
    JsonObject,
    /// SQL array or JSON array.
    Array,
}

/// One operational cell after type resolution.
///
/// Equality and hashing are structural over value and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OperationalTableField {
    value: Option<String>,
    #[serde(rename = "type")]
    field_type: OperationalTableFieldType,
}

impl OperationalTableField {
    /// Build a field from a stringified value and its type.
    ///
    /// # Examples
    ///
    /// ```
    /// use history_excerptor::domain::history::{OperationalTableField, OperationalTableFieldType};
    ///
    /// let field = OperationalTableField::new(Some("42".to_owned()), OperationalTableFieldType::Numeric);
    /// assert_eq!(field.value(), Some("42"));
    /// ```
    pub fn new(value: Option<String>, field_type: OperationalTableFieldType) -> Self {
        Self { value, field_type }
    }

    /// Stringified value, `None` for SQL `NULL`.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Resolved semantic type.
    pub fn field_type(&self) -> OperationalTableFieldType {
        self.field_type
    }
}

/// System metadata recorded alongside every history row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdmInfo {
    /// Creation time rendered as ISO-8601 local date-time text.
    pub created_at: Option<String>,
    /// Author of the change.
    pub created_by: Option<String>,
    /// DML operation marker (insert, update, delete).
    pub dml_op: Option<String>,
    /// Originating system identifier.
    pub system_id: Option<String>,
    /// Originating application identifier.
    pub application_id: Option<String>,
    /// Business process identifier.
    pub business_process_id: Option<String>,
    /// Business process definition identifier.
    pub business_process_definition_id: Option<String>,
    /// Business process instance identifier.
    pub business_process_instance_id: Option<String>,
    /// Business activity name.
    pub business_activity: Option<String>,
    /// Business activity instance identifier.
    pub business_activity_instance_id: Option<String>,
    /// Digital signature reference.
    pub digital_sign: Option<String>,
    /// Derived digital signature reference.
    pub digital_sign_derived: Option<String>,
    /// Checksum of the digital signature.
    pub digital_sign_checksum: Option<String>,
    /// Checksum of the derived digital signature.
    pub digital_sign_derived_checksum: Option<String>,
}

/// One audit entry of a history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExcerptRow {
    ddm_info: DdmInfo,
    operational_data: BTreeMap<String, OperationalTableField>,
}

impl HistoryExcerptRow {
    /// Assemble a row from its metadata and operational cells.
    pub fn new(ddm_info: DdmInfo, operational_data: BTreeMap<String, OperationalTableField>) -> Self {
        Self {
            ddm_info,
            operational_data,
        }
    }

    /// System metadata for the entry.
    pub fn ddm_info(&self) -> &DdmInfo {
        &self.ddm_info
    }

    /// Operational cells keyed by column name.
    pub fn operational_data(&self) -> &BTreeMap<String, OperationalTableField> {
        &self.operational_data
    }
}

/// A row's operational keys differ from the declared column set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row_index} does not match the operational column set")]
pub struct OperationalColumnMismatch {
    /// Zero-based position of the offending row.
    pub row_index: usize,
}

/// Structured history of one business record.
///
/// ## Invariants
/// - Every row's operational keys equal exactly the
///   [`operational_columns`](Self::operational_columns) set.
/// - Rows keep query order (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExcerptData {
    operational_columns: Vec<String>,
    rows: Vec<HistoryExcerptRow>,
}

impl HistoryExcerptData {
    /// Validate and assemble history data.
    ///
    /// # Errors
    ///
    /// Returns [`OperationalColumnMismatch`] for the first row whose keys do
    /// not equal `operational_columns`.
    pub fn try_new(
        operational_columns: Vec<String>,
        rows: Vec<HistoryExcerptRow>,
    ) -> Result<Self, OperationalColumnMismatch> {
        for (row_index, row) in rows.iter().enumerate() {
            let keys_match = row.operational_data.len() == operational_columns.len()
                && operational_columns
                    .iter()
                    .all(|column| row.operational_data.contains_key(column));
            if !keys_match {
                return Err(OperationalColumnMismatch { row_index });
            }
        }
        Ok(Self {
            operational_columns,
            rows,
        })
    }

    /// Operational column names in result-set order.
    pub fn operational_columns(&self) -> &[String] {
        &self.operational_columns
    }

    /// History rows in query order.
    pub fn rows(&self) -> &[HistoryExcerptRow] {
        &self.rows
    }
}
