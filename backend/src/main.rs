//! Produce a signed history excerpt for one business record.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use history_excerptor::config::{HistoryExcerptorSettings, ValidatedSettings};
use history_excerptor::domain::history::{
    DefaultFieldResolver, HistoryQueryService, HistoryRowMapper,
};
use history_excerptor::domain::ports::ExcerptProcessingStatus;
use history_excerptor::domain::{
    DigitalSignatureService, ExcerptService, HistoryExcerptRequest, HistoryExcerptor,
    TokioStatusCheckSleeper,
};
use history_excerptor::outbound::digital_seal::HttpDigitalSealClient;
use history_excerptor::outbound::excerpt::HttpExcerptGenerator;
use history_excerptor::outbound::persistence::{DbPool, SqlxHistoryTableSource};
use history_excerptor::outbound::storage::{ObjectStoreSignatureStorage, build_s3_store};

/// `history-excerptor` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "history-excerptor",
    about = "Generate a signed excerpt of a record's operational history",
    version
)]
struct CliArgs {
    /// History table to read.
    #[arg(long = "table-name", value_name = "table")]
    table_name: String,
    /// Column holding the record identifier.
    #[arg(long = "search-column", value_name = "column")]
    search_column: String,
    /// Business record identifier.
    #[arg(long = "record-id", value_name = "uuid")]
    record_id: Uuid,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = load_settings()?;

    let excerptor = wire(&settings).await?;
    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let request = HistoryExcerptRequest {
        table_name: args.table_name,
        search_column: args.search_column,
        record_id: args.record_id,
    };
    let outcome = excerptor
        .run(&request, &cancellation)
        .await
        .wrap_err("history excerpt failed")?;

    let line = serde_json::to_string(&outcome).wrap_err("failed to encode outcome")?;
    writeln!(io::stdout().lock(), "{line}").wrap_err("failed to write outcome")?;

    if outcome.status != ExcerptProcessingStatus::Completed {
        warn!(excerpt_id = %outcome.excerpt_id, status = ?outcome.status, "excerpt did not complete");
        return Err(eyre!(
            "excerpt {} finished with status {:?}",
            outcome.excerpt_id,
            outcome.status
        ));
    }
    info!(excerpt_id = %outcome.excerpt_id, "excerpt completed");
    Ok(())
}

/// Load settings from the environment and config files only; CLI arguments
/// describe the request, not the deployment.
fn load_settings() -> Result<ValidatedSettings> {
    HistoryExcerptorSettings::load_from_iter([OsString::from("history-excerptor")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?
        .validate()
        .wrap_err("invalid settings")
}

async fn wire(settings: &ValidatedSettings) -> Result<HistoryExcerptor> {
    let pool = DbPool::new(settings.pool.clone())
        .await
        .wrap_err("failed to create database pool")?;
    let history = HistoryQueryService::new(
        Arc::new(SqlxHistoryTableSource::new(pool)),
        HistoryRowMapper::new(Arc::new(DefaultFieldResolver)),
    );

    let bucket = settings.request_signature_bucket.as_str();
    let store = build_s3_store(bucket, &settings.storage)
        .wrap_err_with(|| format!("failed to configure object storage for bucket {bucket}"))?;
    let seal = HttpDigitalSealClient::new(&settings.digital_seal_url, settings.http_timeout)
        .wrap_err("failed to build digital seal client")?;
    let signatures = DigitalSignatureService::new(
        bucket,
        Arc::new(seal),
        Arc::new(ObjectStoreSignatureStorage::new().with_store(bucket, store)),
    );

    let generator = HttpExcerptGenerator::new(&settings.excerpt_service_url, settings.http_timeout)
        .wrap_err("failed to build excerpt service client")?;
    let excerpts = ExcerptService::new(
        Arc::new(generator),
        signatures,
        Arc::new(TokioStatusCheckSleeper),
        settings.polling,
    );

    Ok(HistoryExcerptor::new(history, excerpts))
}

fn spawn_interrupt_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, cancelling excerpt polling");
                cancellation.cancel();
            }
            Err(error) => warn!(error = %error, "failed to listen for interrupt"),
        }
    });
}
