//! End-to-end history excerpt workflow.
//!
//! Reads the history of one record, wraps it in an excerpt request, submits
//! it and waits for the generator to settle.

use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::domain::excerpt::{ExcerptError, ExcerptService};
use crate::domain::history::{HistoryQueryError, HistoryQueryService};
use crate::domain::ports::{ExcerptEventDto, ExcerptProcessingStatus};

/// Template key for history excerpts.
pub const HISTORY_EXCERPT_TYPE: &str = "history-excerpt";

/// Record whose history should be excerpted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryExcerptRequest {
    /// History table to read.
    pub table_name: String,
    /// Column holding the record identifier.
    pub search_column: String,
    /// Business record identifier.
    pub record_id: Uuid,
}

/// Final state of one excerpt run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExcerptOutcome {
    /// Generator-assigned identifier.
    pub excerpt_id: Uuid,
    /// First status other than `IN_PROGRESS`.
    pub status: ExcerptProcessingStatus,
    /// Generator-supplied detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
}

/// Errors raised by [`HistoryExcerptor::run`], one variant per stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryExcerptorError {
    /// History could not be read.
    #[error("failed to read history: {0}")]
    History(#[from] HistoryQueryError),
    /// History could not be embedded in the request.
    #[error("failed to encode history data: {message}")]
    Encoding {
        /// Encoder message.
        message: String,
    },
    /// Submission or polling failed.
    #[error(transparent)]
    Excerpt(#[from] ExcerptError),
}

/// Composes history reading with excerpt generation.
#[derive(Clone)]
pub struct HistoryExcerptor {
    history: HistoryQueryService,
    excerpts: ExcerptService,
}

impl HistoryExcerptor {
    /// Build the workflow from its two services.
    pub fn new(history: HistoryQueryService, excerpts: ExcerptService) -> Self {
        Self { history, excerpts }
    }

    /// Produce an excerpt for `request`.
    ///
    /// `cancellation` only interrupts the wait between status checks.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryExcerptorError`] naming the failed stage.
    pub async fn run(
        &self,
        request: &HistoryExcerptRequest,
        cancellation: &CancellationToken,
    ) -> Result<HistoryExcerptOutcome, HistoryExcerptorError> {
        let data = self
            .history
            .get_history_data(&request.table_name, &request.search_column, request.record_id)
            .await?;
        info!(
            table = %request.table_name,
            rows = data.rows().len(),
            "history loaded for excerpt"
        );

        let history_data =
            serde_json::to_value(&data).map_err(|error| HistoryExcerptorError::Encoding {
                message: error.to_string(),
            })?;
        let mut input = Map::new();
        input.insert(
            "tableName".to_owned(),
            Value::String(request.table_name.clone()),
        );
        input.insert("historyData".to_owned(), history_data);
        let event = ExcerptEventDto {
            record_id: Some(request.record_id),
            excerpt_type: HISTORY_EXCERPT_TYPE.to_owned(),
            excerpt_input_data: input,
            requires_system_signature: true,
        };

        let excerpt_id = self.excerpts.generate(&event).await?;
        let status = self.excerpts.await_completion(excerpt_id, cancellation).await?;
        Ok(HistoryExcerptOutcome {
            excerpt_id,
            status: status.status,
            status_details: status.status_details,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::Arc;

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::excerpt::ExcerptPollingConfig;
    use crate::domain::history::{
        DefaultFieldResolver, HistoryRowMapper, RawCellValue, RawHistoryResultSet,
    };
    use crate::domain::ports::{HistoryTableSourceError, MockHistoryTableSource, StatusDto};
    use crate::domain::signature::DigitalSignatureService;
    use crate::test_support::excerpt::{
        RecordingSleeper, RecordingStorage, ScriptedGenerator, StaticSeal, status,
    };

    fn request() -> HistoryExcerptRequest {
        HistoryExcerptRequest {
            table_name: "person_hst".to_owned(),
            search_column: "person_id".to_owned(),
            record_id: Uuid::nil(),
        }
    }

    fn excerptor(
        source: MockHistoryTableSource,
        generator: Arc<ScriptedGenerator>,
    ) -> HistoryExcerptor {
        let history = HistoryQueryService::new(
            Arc::new(source),
            HistoryRowMapper::new(Arc::new(DefaultFieldResolver)),
        );
        let excerpts = ExcerptService::new(
            generator,
            DigitalSignatureService::new(
                "request-signatures",
                Arc::new(StaticSeal("sealed")),
                Arc::new(RecordingStorage::default()),
            ),
            Arc::new(RecordingSleeper::default()),
            ExcerptPollingConfig::new(NonZeroU32::MIN),
        );
        HistoryExcerptor::new(history, excerpts)
    }

    #[rstest]
    #[tokio::test]
    async fn submits_history_as_excerpt_input() {
        let mut source = MockHistoryTableSource::new();
        source.expect_fetch_history().returning(|_| {
            let mut result = RawHistoryResultSet::new(vec![
                "ddm_dml_op".to_owned(),
                "first_name".to_owned(),
            ]);
            result
                .push_row(vec![
                    RawCellValue::Text("U".to_owned()),
                    RawCellValue::Text("Ada".to_owned()),
                ])
                .expect("row width");
            Ok(result)
        });
        let excerpt_id = Uuid::new_v4();
        let generator = Arc::new(ScriptedGenerator::new(
            excerpt_id,
            vec![Ok(StatusDto {
                status: ExcerptProcessingStatus::Completed,
                status_details: None,
            })],
        ));

        let outcome = excerptor(source, generator.clone())
            .run(&request(), &CancellationToken::new())
            .await
            .expect("workflow succeeds");

        assert_eq!(outcome.excerpt_id, excerpt_id);
        assert_eq!(outcome.status, ExcerptProcessingStatus::Completed);
        let submissions = generator.submissions();
        let (event, _) = &submissions[0];
        assert_eq!(event.excerpt_type, HISTORY_EXCERPT_TYPE);
        assert_eq!(event.record_id, Some(Uuid::nil()));
        assert!(event.requires_system_signature);
        assert_eq!(event.excerpt_input_data["tableName"], json!("person_hst"));
        let history = &event.excerpt_input_data["historyData"];
        assert_eq!(history["operationalColumns"], json!(["first_name"]));
        assert_eq!(history["rows"][0]["ddmInfo"]["dmlOp"], json!("U"));
        assert_eq!(
            history["rows"][0]["operationalData"]["first_name"],
            json!({ "value": "Ada", "type": "TEXT" })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_generation_is_reported_not_raised() {
        let mut source = MockHistoryTableSource::new();
        source
            .expect_fetch_history()
            .returning(|_| Ok(RawHistoryResultSet::new(vec!["first_name".to_owned()])));
        let generator = Arc::new(ScriptedGenerator::new(
            Uuid::nil(),
            vec![Ok(status(ExcerptProcessingStatus::Failed))],
        ));

        let outcome = excerptor(source, generator)
            .run(&request(), &CancellationToken::new())
            .await
            .expect("terminal failure is an outcome");

        assert_eq!(outcome.status, ExcerptProcessingStatus::Failed);
    }

    #[rstest]
    #[tokio::test]
    async fn read_failures_stop_before_submission() {
        let mut source = MockHistoryTableSource::new();
        source
            .expect_fetch_history()
            .returning(|_| Err(HistoryTableSourceError::connection("pool closed")));
        let generator = Arc::new(ScriptedGenerator::new(Uuid::nil(), Vec::new()));

        let error = excerptor(source, generator.clone())
            .run(&request(), &CancellationToken::new())
            .await
            .expect_err("read failure propagates");

        assert!(matches!(error, HistoryExcerptorError::History(_)));
        assert!(generator.submissions().is_empty());
    }
}
