//! History query service: validates identifiers, reads the table through the
//! [`HistoryTableSource`] port, and maps rows with [`HistoryRowMapper`].

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::model::HistoryExcerptData;
use super::query::{HistoryQuery, SqlIdentifier, SqlIdentifierError};
use super::row_mapper::{HistoryMappingError, HistoryRowMapper};
use crate::domain::ports::{HistoryTableSource, HistoryTableSourceError};

/// Errors returned by [`HistoryQueryService::get_history_data`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryQueryError {
    /// Table name failed identifier validation.
    #[error("invalid history table name: {0}")]
    InvalidTable(#[source] SqlIdentifierError),
    /// Search column failed identifier validation.
    #[error("invalid search column: {0}")]
    InvalidSearchColumn(#[source] SqlIdentifierError),
    /// Reading the table failed.
    #[error(transparent)]
    Read(#[from] HistoryTableSourceError),
    /// Rows could not be materialised.
    #[error(transparent)]
    Mapping(#[from] HistoryMappingError),
}

/// Reads the audit trail of one business record.
#[derive(Clone)]
pub struct HistoryQueryService {
    source: Arc<dyn HistoryTableSource>,
    mapper: HistoryRowMapper,
}

impl HistoryQueryService {
    /// Build the service over a table source and row mapper.
    pub fn new(source: Arc<dyn HistoryTableSource>, mapper: HistoryRowMapper) -> Self {
        Self { source, mapper }
    }

    /// Fetch the history of `id` from `table_name`, newest entry first.
    ///
    /// An empty result yields data with no rows.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryQueryError`] for invalid identifiers, read failures,
    /// or malformed rows.
    pub async fn get_history_data(
        &self,
        table_name: &str,
        search_column: &str,
        id: Uuid,
    ) -> Result<HistoryExcerptData, HistoryQueryError> {
        let table = SqlIdentifier::parse(table_name).map_err(HistoryQueryError::InvalidTable)?;
        let column =
            SqlIdentifier::parse(search_column).map_err(HistoryQueryError::InvalidSearchColumn)?;
        let query = HistoryQuery::new(table, column, id);

        info!(table = %query.table(), column = %query.search_column(), "reading history table");
        let result_set = self.source.fetch_history(&query).await?;
        let data = self.mapper.extract_history(&result_set)?;
        debug!(rows = data.rows().len(), "history rows mapped");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::function;
    use rstest::rstest;

    use super::*;
    use crate::domain::history::{DefaultFieldResolver, RawCellValue, RawHistoryResultSet};
    use crate::domain::ports::MockHistoryTableSource;

    fn service(source: MockHistoryTableSource) -> HistoryQueryService {
        HistoryQueryService::new(
            Arc::new(source),
            HistoryRowMapper::new(Arc::new(DefaultFieldResolver)),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn passes_validated_query_to_source() {
        let id = Uuid::new_v4();
        let mut source = MockHistoryTableSource::new();
        source
            .expect_fetch_history()
            .with(function(move |query: &HistoryQuery| {
                query.table().as_str() == "person_hst"
                    && query.search_column().as_str() == "person_id"
                    && query.record_id() == id
            }))
            .times(1)
            .returning(|_| {
                let mut result = RawHistoryResultSet::new(vec![
                    "ddm_dml_op".to_owned(),
                    "first_name".to_owned(),
                ]);
                result
                    .push_row(vec![
                        RawCellValue::Text("I".to_owned()),
                        RawCellValue::Text("Ada".to_owned()),
                    ])
                    .expect("row width");
                Ok(result)
            });

        let data = service(source)
            .get_history_data("person_hst", "person_id", id)
            .await
            .expect("history should load");

        assert_eq!(data.operational_columns(), ["first_name"]);
        assert_eq!(data.rows().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let mut source = MockHistoryTableSource::new();
        source
            .expect_fetch_history()
            .returning(|_| Ok(RawHistoryResultSet::new(vec!["first_name".to_owned()])));

        let data = service(source)
            .get_history_data("person_hst", "person_id", Uuid::nil())
            .await
            .expect("empty history should load");

        assert!(data.rows().is_empty());
    }

    #[rstest]
    #[case("person_hst; drop table person_hst", "person_id")]
    #[case("person_hst", "person_id = person_id or 1")]
    #[tokio::test]
    async fn unsafe_identifiers_never_reach_the_source(
        #[case] table: &str,
        #[case] column: &str,
    ) {
        let mut source = MockHistoryTableSource::new();
        source.expect_fetch_history().times(0);

        let error = service(source)
            .get_history_data(table, column, Uuid::nil())
            .await
            .expect_err("identifiers must be rejected");

        assert!(matches!(
            error,
            HistoryQueryError::InvalidTable(_) | HistoryQueryError::InvalidSearchColumn(_)
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn read_failures_propagate() {
        let mut source = MockHistoryTableSource::new();
        source
            .expect_fetch_history()
            .returning(|_| Err(HistoryTableSourceError::query("connection reset")));

        let error = service(source)
            .get_history_data("person_hst", "person_id", Uuid::nil())
            .await
            .expect_err("read failure must propagate");

        assert_eq!(
            error,
            HistoryQueryError::Read(HistoryTableSourceError::query("connection reset"))
        );
    }
}
