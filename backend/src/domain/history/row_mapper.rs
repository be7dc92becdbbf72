//! Column classification and row materialisation for history result sets.
//!
//! The mapper partitions the declared columns into the closed DDM set and
//! the operational remainder once, then walks the rows in result order. Rows
//! are never re-sorted here; ordering is the query's responsibility.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveTime;

use super::ddm_column::DdmColumn;
use super::field_resolver::{OperationalFieldResolver, format_date_time, render_text};
use super::model::{DdmInfo, HistoryExcerptData, HistoryExcerptRow, OperationalColumnMismatch};
use super::result_set::{RawCellValue, RawHistoryResultSet};

/// Failures raised while materialising history rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryMappingError {
    /// A DDM timestamp column held a non-temporal value.
    #[error("row {row_index}: column {column} does not hold a timestamp")]
    InvalidTimestamp {
        /// Zero-based row position.
        row_index: usize,
        /// Offending column name.
        column: &'static str,
    },
    /// A row lacked a cell for a declared column.
    #[error("row {row_index}: missing cell for column {column}")]
    MissingCell {
        /// Zero-based row position.
        row_index: usize,
        /// Column name without a value.
        column: String,
    },
    /// The assembled data violated the operational column invariant.
    #[error(transparent)]
    ColumnMismatch(#[from] OperationalColumnMismatch),
}

/// Row mapper turning raw history result sets into [`HistoryExcerptData`].
#[derive(Clone)]
pub struct HistoryRowMapper {
    resolver: Arc<dyn OperationalFieldResolver>,
}

impl HistoryRowMapper {
    /// Build a mapper with the given value-resolution policy.
    pub fn new(resolver: Arc<dyn OperationalFieldResolver>) -> Self {
        Self { resolver }
    }

    /// Materialise every row of `result_set`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryMappingError`] when any row is malformed; no partial
    /// data is produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use history_excerptor::domain::history::{
    ///     DefaultFieldResolver, HistoryRowMapper, RawCellValue, RawHistoryResultSet,
    /// };
    ///
    /// let mut result = RawHistoryResultSet::new(vec![
    ///     "ddm_created_by".to_owned(),
    ///     "first_name".to_owned(),
    /// ]);
    /// result.push_row(vec![
    ///     RawCellValue::Text("officer".to_owned()),
    ///     RawCellValue::Text("Ada".to_owned()),
    /// ])?;
    ///
    /// let mapper = HistoryRowMapper::new(Arc::new(DefaultFieldResolver));
    /// let data = mapper.extract_history(&result)?;
    /// assert_eq!(data.operational_columns(), ["first_name"]);
    /// assert_eq!(data.rows()[0].ddm_info().created_by.as_deref(), Some("officer"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn extract_history(
        &self,
        result_set: &RawHistoryResultSet,
    ) -> Result<HistoryExcerptData, HistoryMappingError> {
        let layout = ColumnLayout::classify(result_set.columns());

        let rows = result_set
            .rows()
            .iter()
            .enumerate()
            .map(|(row_index, cells)| self.map_row(&layout, row_index, cells))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoryExcerptData::try_new(layout.operational_columns, rows)?)
    }

    fn map_row(
        &self,
        layout: &ColumnLayout,
        row_index: usize,
        cells: &[RawCellValue],
    ) -> Result<HistoryExcerptRow, HistoryMappingError> {
        let ddm_info = read_ddm_info(layout, row_index, cells)?;

        let mut operational_data = BTreeMap::new();
        for (column, position) in layout
            .operational_columns
            .iter()
            .zip(&layout.operational_positions)
        {
            let cell = cells
                .get(*position)
                .ok_or_else(|| HistoryMappingError::MissingCell {
                    row_index,
                    column: column.clone(),
                })?;
            operational_data.insert(column.clone(), self.resolver.resolve(cell));
        }

        Ok(HistoryExcerptRow::new(ddm_info, operational_data))
    }
}

struct ColumnLayout {
    ddm_positions: HashMap<DdmColumn, usize>,
    operational_columns: Vec<String>,
    operational_positions: Vec<usize>,
}

impl ColumnLayout {
    fn classify(columns: &[String]) -> Self {
        let mut ddm_positions = HashMap::new();
        let mut operational_columns = Vec::new();
        let mut operational_positions = Vec::new();

        for (position, name) in columns.iter().enumerate() {
            match DdmColumn::from_column_name(name) {
                Some(column) => {
                    ddm_positions.entry(column).or_insert(position);
                }
                None => {
                    operational_columns.push(name.clone());
                    operational_positions.push(position);
                }
            }
        }

        Self {
            ddm_positions,
            operational_columns,
            operational_positions,
        }
    }

    fn cell<'a>(&self, cells: &'a [RawCellValue], column: DdmColumn) -> Option<&'a RawCellValue> {
        self.ddm_positions
            .get(&column)
            .and_then(|position| cells.get(*position))
    }
}

fn read_ddm_info(
    layout: &ColumnLayout,
    row_index: usize,
    cells: &[RawCellValue],
) -> Result<DdmInfo, HistoryMappingError> {
    let text = |column: DdmColumn| layout.cell(cells, column).and_then(render_text);

    Ok(DdmInfo {
        created_at: read_created_at(layout.cell(cells, DdmColumn::CreatedAt), row_index)?,
        created_by: text(DdmColumn::CreatedBy),
        dml_op: text(DdmColumn::DmlOp),
        system_id: text(DdmColumn::SystemId),
        application_id: text(DdmColumn::ApplicationId),
        business_process_id: text(DdmColumn::BusinessProcessId),
        business_process_definition_id: text(DdmColumn::BusinessProcessDefinitionId),
        business_process_instance_id: text(DdmColumn::BusinessProcessInstanceId),
        business_activity: text(DdmColumn::BusinessActivity),
        business_activity_instance_id: text(DdmColumn::BusinessActivityInstanceId),
        digital_sign: text(DdmColumn::DigitalSign),
        digital_sign_derived: text(DdmColumn::DigitalSignDerived),
        digital_sign_checksum: text(DdmColumn::DigitalSignChecksum),
        digital_sign_derived_checksum: text(DdmColumn::DigitalSignDerivedChecksum),
    })
}

fn read_created_at(
    cell: Option<&RawCellValue>,
    row_index: usize,
) -> Result<Option<String>, HistoryMappingError> {
    match cell {
        None | Some(RawCellValue::Null) => Ok(None),
        Some(RawCellValue::Timestamp(value)) => Ok(Some(format_date_time(*value))),
        Some(RawCellValue::TimestampTz(value)) => Ok(Some(format_date_time(value.naive_utc()))),
        Some(RawCellValue::Date(value)) => Ok(Some(format_date_time(value.and_time(NaiveTime::MIN)))),
        Some(_) => Err(HistoryMappingError::InvalidTimestamp {
            row_index,
            column: DdmColumn::CreatedAt.column_name(),
        }),
    }
}
