//! Excerpt orchestration: sign, submit, then poll until the generator stops
//! reporting `IN_PROGRESS`.
//!
//! The orchestrator does not interpret terminal statuses. `COMPLETED` and
//! `FAILED` both end the loop and are handed back to the caller.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    ExcerptEventDto, ExcerptGenerator, ExcerptGeneratorError, ExcerptSignatureHeaders, StatusDto,
};
use crate::domain::signature::{DigitalSignatureService, SignatureError};

/// Fixed delay between two status checks.
pub const EXCERPT_STATUS_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Polling budget for [`ExcerptService::await_completion`].
///
/// There is deliberately no `Default`: the attempt budget must come from
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcerptPollingConfig {
    /// Maximum number of status checks, including the first.
    pub max_attempts: NonZeroU32,
}

impl ExcerptPollingConfig {
    /// Build a polling budget of `max_attempts` status checks.
    pub const fn new(max_attempts: NonZeroU32) -> Self {
        Self { max_attempts }
    }
}

/// Returned when a status-check delay is interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status check delay cancelled")]
pub struct SleepCancelled;

/// Cancelable delay between status checks.
#[async_trait]
pub trait StatusCheckSleeper: Send + Sync {
    /// Wait for `duration` unless `cancellation` fires first.
    async fn sleep(
        &self,
        duration: Duration,
        cancellation: &CancellationToken,
    ) -> Result<(), SleepCancelled>;
}

/// Tokio timer racing the cancellation token.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioStatusCheckSleeper;

#[async_trait]
impl StatusCheckSleeper for TokioStatusCheckSleeper {
    async fn sleep(
        &self,
        duration: Duration,
        cancellation: &CancellationToken,
    ) -> Result<(), SleepCancelled> {
        tokio::select! {
            biased;
            () = cancellation.cancelled() => Err(SleepCancelled),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

/// Errors raised by [`ExcerptService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExcerptError {
    /// Signing or storing the request signature failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// Submitting the request failed.
    #[error("excerpt submission failed: {0}")]
    Submission(#[source] ExcerptGeneratorError),
    /// A status check failed.
    #[error("excerpt status check failed: {0}")]
    StatusCheck(#[source] ExcerptGeneratorError),
    /// Generation was still running when the attempt budget ran out.
    #[error(
        "excerpt generation {excerpt_id} did not finish after {attempts} status checks, failing by timeout"
    )]
    GenerationTimeout {
        /// Excerpt being polled.
        excerpt_id: Uuid,
        /// Status checks performed.
        attempts: u32,
    },
    /// The wait between status checks was interrupted.
    #[error("waiting for excerpt {excerpt_id} was cancelled")]
    Cancelled {
        /// Excerpt being polled.
        excerpt_id: Uuid,
    },
}

/// Drives one excerpt from submission to a terminal status.
#[derive(Clone)]
pub struct ExcerptService {
    generator: Arc<dyn ExcerptGenerator>,
    signatures: DigitalSignatureService,
    sleeper: Arc<dyn StatusCheckSleeper>,
    config: ExcerptPollingConfig,
}

impl ExcerptService {
    /// Build the orchestrator.
    pub fn new(
        generator: Arc<dyn ExcerptGenerator>,
        signatures: DigitalSignatureService,
        sleeper: Arc<dyn StatusCheckSleeper>,
        config: ExcerptPollingConfig,
    ) -> Self {
        Self {
            generator,
            signatures,
            sleeper,
            config,
        }
    }

    /// Sign and store `event`, submit it, and return the excerpt identifier.
    ///
    /// The stored signature key is sent as both the signature and the
    /// derived-signature reference.
    ///
    /// # Errors
    ///
    /// Returns [`ExcerptError::Signature`] when signing or storage fails and
    /// [`ExcerptError::Submission`] when the generator rejects the request.
    pub async fn generate(&self, event: &ExcerptEventDto) -> Result<Uuid, ExcerptError> {
        let signed = self.signatures.sign(event).await?;
        let key = self.signatures.save_signature(&signed).await?;
        let headers = ExcerptSignatureHeaders::for_stored_signature(&key);

        let excerpt_id = self
            .generator
            .generate(event, &headers)
            .await
            .map_err(ExcerptError::Submission)?;
        info!(excerpt_id = %excerpt_id, excerpt_type = %event.excerpt_type, "excerpt submitted");
        Ok(excerpt_id)
    }

    /// Poll the generator until it reports a status other than
    /// `IN_PROGRESS`.
    ///
    /// No delay follows the final check: a budget of `n` attempts performs
    /// at most `n` checks and `n - 1` delays.
    ///
    /// # Errors
    ///
    /// - [`ExcerptError::StatusCheck`] when a status call fails.
    /// - [`ExcerptError::GenerationTimeout`] when every check reported
    ///   `IN_PROGRESS`.
    /// - [`ExcerptError::Cancelled`] when `cancellation` fires during a
    ///   delay.
    ///
    /// There is no delay after the final in-progress check, so cancellation
    /// only ever interrupts a wait that precedes another check. Once the last
    /// check reports `IN_PROGRESS` the result is a timeout, even if the token
    /// is already cancelled.
    pub async fn await_completion(
        &self,
        excerpt_id: Uuid,
        cancellation: &CancellationToken,
    ) -> Result<StatusDto, ExcerptError> {
        let max_attempts = self.config.max_attempts.get();

        for attempt in 1..=max_attempts {
            let status = self
                .generator
                .status(excerpt_id)
                .await
                .map_err(ExcerptError::StatusCheck)?;
            if !status.is_in_progress() {
                info!(excerpt_id = %excerpt_id, status = ?status.status, attempt, "excerpt processing finished");
                return Ok(status);
            }

            debug!(excerpt_id = %excerpt_id, attempt, max_attempts, "excerpt still in progress");
            if attempt < max_attempts {
                self.sleeper
                    .sleep(EXCERPT_STATUS_CHECK_INTERVAL, cancellation)
                    .await
                    .map_err(|SleepCancelled| ExcerptError::Cancelled { excerpt_id })?;
            }
        }

        warn!(excerpt_id = %excerpt_id, attempts = max_attempts, "excerpt generation timed out");
        Err(ExcerptError::GenerationTimeout {
            excerpt_id,
            attempts: max_attempts,
        })
    }
}
