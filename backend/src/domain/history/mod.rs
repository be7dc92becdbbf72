//! Operational history reading and row mapping.
//!
//! Public surface:
//! - `HistoryQueryService`: validates identifiers and reads a history table.
//! - `HistoryRowMapper`: splits DDM metadata from operational columns.
//! - `HistoryExcerptData` and friends: the immutable result model.

mod ddm_column;
mod field_resolver;
mod model;
mod query;
mod result_set;
mod row_mapper;
mod service;

pub use ddm_column::DdmColumn;
pub use field_resolver::{
    DefaultFieldResolver, OperationalFieldResolver, format_date_time, render_text,
};
pub use model::{
    DdmInfo, HistoryExcerptData, HistoryExcerptRow, OperationalColumnMismatch,
    OperationalTableField, OperationalTableFieldType,
};
pub use query::{HistoryQuery, SqlIdentifier, SqlIdentifierError};
pub use result_set::{RawCellValue, RawHistoryResultSet, RowWidthMismatch};
pub use row_mapper::{HistoryMappingError, HistoryRowMapper};
pub use service::{HistoryQueryError, HistoryQueryService};
