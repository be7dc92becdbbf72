//! PostgreSQL-backed `HistoryTableSource` using dynamic `sqlx` rows.
//!
//! Column metadata comes from `information_schema.columns` before the history
//! query runs. That lookup doubles as the identifier allow-list and keeps the
//! column layout available when the query returns no rows. It also drives the
//! select list: sqlx reads results in the binary protocol, so columns without
//! a native decoder are cast to `text` on the server and never reinterpreted
//! client-side.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::BigDecimal;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{Decode, PgConnection, Postgres, Row, Type, ValueRef};
use tracing::debug;
use uuid::Uuid;

use super::pool::DbPool;
use crate::domain::history::{HistoryQuery, RawCellValue, RawHistoryResultSet};
use crate::domain::ports::{HistoryTableSource, HistoryTableSourceError};

const COLUMN_METADATA_SQL: &str = "SELECT column_name::text AS column_name, \
     udt_name::text AS udt_name \
     FROM information_schema.columns \
     WHERE table_schema = current_schema() AND table_name = $1 \
     ORDER BY ordinal_position";

/// Scalar shapes the adapter decodes natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PgScalarKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Uuid,
    Date,
    Timestamp,
    TimestampTz,
    Json,
}

/// Decoding strategy for one column, derived from its `udt_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PgColumnKind {
    Scalar(PgScalarKind),
    Array(PgScalarKind),
    /// Selected as `::text`; Postgres renders the value.
    CastToText,
}

/// `information_schema` array types carry a leading underscore (`_int4`).
pub(crate) fn classify_udt_name(udt_name: &str) -> PgColumnKind {
    match udt_name.strip_prefix('_') {
        Some(element) => scalar_kind(element).map_or(PgColumnKind::CastToText, PgColumnKind::Array),
        None => scalar_kind(udt_name).map_or(PgColumnKind::CastToText, PgColumnKind::Scalar),
    }
}

fn scalar_kind(udt_name: &str) -> Option<PgScalarKind> {
    let kind = match udt_name {
        "bool" => PgScalarKind::Bool,
        "int2" => PgScalarKind::Int2,
        "int4" => PgScalarKind::Int4,
        "int8" => PgScalarKind::Int8,
        "float4" => PgScalarKind::Float4,
        "float8" => PgScalarKind::Float8,
        "numeric" => PgScalarKind::Numeric,
        "text" | "varchar" | "bpchar" | "name" => PgScalarKind::Text,
        "uuid" => PgScalarKind::Uuid,
        "date" => PgScalarKind::Date,
        "timestamp" => PgScalarKind::Timestamp,
        "timestamptz" => PgScalarKind::TimestampTz,
        "json" | "jsonb" => PgScalarKind::Json,
        _ => return None,
    };
    Some(kind)
}

/// One history column as reported by `information_schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryColumn {
    name: String,
    kind: PgColumnKind,
}

impl HistoryColumn {
    pub(crate) fn new(name: impl Into<String>, udt_name: &str) -> Self {
        Self {
            name: name.into(),
            kind: classify_udt_name(udt_name),
        }
    }

    fn select_item(&self) -> String {
        let quoted = quote_identifier(&self.name);
        match self.kind {
            PgColumnKind::CastToText => format!("{quoted}::text AS {quoted}"),
            PgColumnKind::Scalar(_) | PgColumnKind::Array(_) => quoted,
        }
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn projection(columns: &[HistoryColumn]) -> String {
    columns
        .iter()
        .map(HistoryColumn::select_item)
        .collect::<Vec<_>>()
        .join(", ")
}

/// History table reader over the shared pool.
#[derive(Clone)]
pub struct SqlxHistoryTableSource {
    pool: DbPool,
}

impl SqlxHistoryTableSource {
    /// Build the adapter over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryTableSource for SqlxHistoryTableSource {
    async fn fetch_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<RawHistoryResultSet, HistoryTableSourceError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|err| HistoryTableSourceError::connection(err.to_string()))?;

        let table = query.table().as_str();
        let columns = load_columns(&mut conn, table).await?;
        if columns.is_empty() {
            return Err(HistoryTableSourceError::unknown_table(table));
        }
        let search_column = query.search_column().as_str();
        if !columns.iter().any(|column| column.name == search_column) {
            return Err(HistoryTableSourceError::unknown_column(table, search_column));
        }

        let sql = query.select_statement_for(&projection(&columns));
        let rows = sqlx::query(&sql)
            .bind(query.record_id())
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        debug!(table, rows = rows.len(), "history rows fetched");

        let width = columns.len();
        let kinds: Vec<PgColumnKind> = columns.iter().map(|column| column.kind).collect();
        let mut result =
            RawHistoryResultSet::new(columns.into_iter().map(|column| column.name).collect());
        for row in &rows {
            if row.len() != width {
                return Err(HistoryTableSourceError::decode(format!(
                    "expected {width} columns but row has {}",
                    row.len()
                )));
            }
            let cells = kinds
                .iter()
                .enumerate()
                .map(|(index, kind)| decode_cell(row, index, *kind))
                .collect::<Result<Vec<_>, _>>()
                .map_err(map_sqlx_error)?;
            result
                .push_row(cells)
                .map_err(|err| HistoryTableSourceError::decode(err.to_string()))?;
        }
        Ok(result)
    }
}

async fn load_columns(
    conn: &mut PgConnection,
    table: &str,
) -> Result<Vec<HistoryColumn>, HistoryTableSourceError> {
    let rows = sqlx::query(COLUMN_METADATA_SQL)
        .bind(table)
        .fetch_all(conn)
        .await
        .map_err(map_sqlx_error)?;
    rows.iter()
        .map(|row| {
            let name: String = row.try_get("column_name")?;
            let udt_name: String = row.try_get("udt_name")?;
            Ok(HistoryColumn::new(name, &udt_name))
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(map_sqlx_error)
}

fn decode_cell(row: &PgRow, index: usize, kind: PgColumnKind) -> Result<RawCellValue, sqlx::Error> {
    match kind {
        PgColumnKind::Scalar(scalar) => nullable(row, index, |row| decode_scalar(row, index, scalar)),
        PgColumnKind::Array(element) => nullable(row, index, |row| decode_array(row, index, element)),
        PgColumnKind::CastToText => Ok(row
            .try_get::<Option<String>, _>(index)?
            .map_or(RawCellValue::Null, RawCellValue::Text)),
    }
}

fn nullable<F>(row: &PgRow, index: usize, decode: F) -> Result<RawCellValue, sqlx::Error>
where
    F: FnOnce(&PgRow) -> Result<RawCellValue, sqlx::Error>,
{
    if row.try_get_raw(index)?.is_null() {
        return Ok(RawCellValue::Null);
    }
    decode(row)
}

fn decode_scalar(
    row: &PgRow,
    index: usize,
    kind: PgScalarKind,
) -> Result<RawCellValue, sqlx::Error> {
    let value = match kind {
        PgScalarKind::Bool => RawCellValue::Boolean(row.try_get(index)?),
        PgScalarKind::Int2 => RawCellValue::Integer(i64::from(row.try_get::<i16, _>(index)?)),
        PgScalarKind::Int4 => RawCellValue::Integer(i64::from(row.try_get::<i32, _>(index)?)),
        PgScalarKind::Int8 => RawCellValue::Integer(row.try_get(index)?),
        PgScalarKind::Float4 => RawCellValue::Float(f64::from(row.try_get::<f32, _>(index)?)),
        PgScalarKind::Float8 => RawCellValue::Float(row.try_get(index)?),
        PgScalarKind::Numeric => {
            RawCellValue::Decimal(row.try_get::<BigDecimal, _>(index)?.to_string())
        }
        PgScalarKind::Text => RawCellValue::Text(row.try_get(index)?),
        PgScalarKind::Uuid => RawCellValue::Uuid(row.try_get::<Uuid, _>(index)?),
        PgScalarKind::Date => RawCellValue::Date(row.try_get::<NaiveDate, _>(index)?),
        PgScalarKind::Timestamp => RawCellValue::Timestamp(row.try_get::<NaiveDateTime, _>(index)?),
        PgScalarKind::TimestampTz => {
            RawCellValue::TimestampTz(row.try_get::<DateTime<Utc>, _>(index)?)
        }
        PgScalarKind::Json => RawCellValue::Json(row.try_get::<serde_json::Value, _>(index)?),
    };
    Ok(value)
}

fn decode_array(
    row: &PgRow,
    index: usize,
    element: PgScalarKind,
) -> Result<RawCellValue, sqlx::Error> {
    match element {
        PgScalarKind::Bool => elements(row, index, RawCellValue::Boolean),
        PgScalarKind::Int2 => elements(row, index, |v: i16| RawCellValue::Integer(i64::from(v))),
        PgScalarKind::Int4 => elements(row, index, |v: i32| RawCellValue::Integer(i64::from(v))),
        PgScalarKind::Int8 => elements(row, index, RawCellValue::Integer),
        PgScalarKind::Float4 => elements(row, index, |v: f32| RawCellValue::Float(f64::from(v))),
        PgScalarKind::Float8 => elements(row, index, RawCellValue::Float),
        PgScalarKind::Numeric => elements(row, index, |v: BigDecimal| {
            RawCellValue::Decimal(v.to_string())
        }),
        PgScalarKind::Text => elements(row, index, RawCellValue::Text),
        PgScalarKind::Uuid => elements(row, index, RawCellValue::Uuid),
        PgScalarKind::Date => elements(row, index, RawCellValue::Date),
        PgScalarKind::Timestamp => elements(row, index, RawCellValue::Timestamp),
        PgScalarKind::TimestampTz => elements(row, index, RawCellValue::TimestampTz),
        PgScalarKind::Json => elements(row, index, RawCellValue::Json),
    }
}

fn elements<'r, T, F>(row: &'r PgRow, index: usize, wrap: F) -> Result<RawCellValue, sqlx::Error>
where
    Vec<Option<T>>: Decode<'r, Postgres> + Type<Postgres>,
    F: Fn(T) -> RawCellValue,
{
    let values: Vec<Option<T>> = row.try_get(index)?;
    Ok(RawCellValue::Array(
        values
            .into_iter()
            .map(|value| value.map_or(RawCellValue::Null, &wrap))
            .collect(),
    ))
}

fn map_sqlx_error(error: sqlx::Error) -> HistoryTableSourceError {
    match error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => HistoryTableSourceError::connection(error.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
            HistoryTableSourceError::decode(error.to_string())
        }
        other => HistoryTableSourceError::query(other.to_string()),
    }
}
