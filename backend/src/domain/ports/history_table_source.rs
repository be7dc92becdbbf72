//! Driven port for reading raw rows from operational history tables.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::history::{HistoryQuery, RawHistoryResultSet};

define_port_error! {
    /// Errors raised while reading a history table.
    pub enum HistoryTableSourceError {
        /// Database connection could not be obtained.
        Connection { message: String } =>
            "history table connection failed: {message}",
        /// Table is not present in the current schema.
        UnknownTable { table: String } =>
            "history table {table} does not exist",
        /// Search column is not a column of the table.
        UnknownColumn { table: String, column: String } =>
            "column {column} does not exist on history table {table}",
        /// Query execution failed.
        Query { message: String } =>
            "history table query failed: {message}",
        /// A cell could not be decoded.
        Decode { message: String } =>
            "history table row decode failed: {message}",
    }
}

/// Port executing one history query and returning fully materialised rows.
///
/// Implementations own the schema allow-list check: the table must exist and
/// the search column must belong to it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryTableSource: Send + Sync {
    /// Execute `query` and return column metadata plus every row in query
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let result = source.fetch_history(&query).await?;
    /// assert!(result.columns().iter().any(|c| c == "ddm_created_at"));
    /// ```
    async fn fetch_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<RawHistoryResultSet, HistoryTableSourceError>;
}
