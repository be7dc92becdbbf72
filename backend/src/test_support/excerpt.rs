//! Shared test doubles for excerpt orchestration tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::excerpt::{SleepCancelled, StatusCheckSleeper};
use crate::domain::ports::{
    DigitalSealClient, DigitalSealError, ExcerptEventDto, ExcerptGenerator, ExcerptGeneratorError,
    ExcerptProcessingStatus, ExcerptSignatureHeaders, SignRequest, SignResponse, SignatureStorage,
    SignatureStorageError, StatusDto,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl StatusCheckSleeper for RecordingSleeper {
    async fn sleep(
        &self,
        duration: Duration,
        _cancellation: &CancellationToken,
    ) -> Result<(), SleepCancelled> {
        lock(&self.0).push(duration);
        Ok(())
    }
}

/// Cancels the shared token on the first delay and reports the interruption.
pub struct CancellingSleeper {
    pub calls: AtomicUsize,
}

impl CancellingSleeper {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StatusCheckSleeper for CancellingSleeper {
    async fn sleep(
        &self,
        _duration: Duration,
        cancellation: &CancellationToken,
    ) -> Result<(), SleepCancelled> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        cancellation.cancel();
        Err(SleepCancelled)
    }
}

/// Seal returning a fixed signature.
pub struct StaticSeal(pub &'static str);

#[async_trait]
impl DigitalSealClient for StaticSeal {
    async fn sign(&self, _request: &SignRequest) -> Result<SignResponse, DigitalSealError> {
        Ok(SignResponse {
            signature: self.0.to_owned(),
        })
    }
}

/// Records every write as `(bucket, key, content)`.
#[derive(Default)]
pub struct RecordingStorage(pub Mutex<Vec<(String, String, String)>>);

impl RecordingStorage {
    pub fn writes(&self) -> Vec<(String, String, String)> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl SignatureStorage for RecordingStorage {
    async fn put_content(
        &self,
        bucket: &str,
        key: &str,
        content: &str,
    ) -> Result<(), SignatureStorageError> {
        lock(&self.0).push((bucket.to_owned(), key.to_owned(), content.to_owned()));
        Ok(())
    }
}

/// Generator answering status checks from a script.
///
/// Once the script is exhausted every further check reports `IN_PROGRESS`.
pub struct ScriptedGenerator {
    excerpt_id: Uuid,
    statuses: Mutex<VecDeque<Result<StatusDto, ExcerptGeneratorError>>>,
    submissions: Mutex<Vec<(ExcerptEventDto, ExcerptSignatureHeaders)>>,
    status_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(
        excerpt_id: Uuid,
        statuses: Vec<Result<StatusDto, ExcerptGeneratorError>>,
    ) -> Self {
        Self {
            excerpt_id,
            statuses: Mutex::new(statuses.into()),
            submissions: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn submissions(&self) -> Vec<(ExcerptEventDto, ExcerptSignatureHeaders)> {
        lock(&self.submissions).clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExcerptGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        event: &ExcerptEventDto,
        headers: &ExcerptSignatureHeaders,
    ) -> Result<Uuid, ExcerptGeneratorError> {
        lock(&self.submissions).push((event.clone(), headers.clone()));
        Ok(self.excerpt_id)
    }

    async fn status(&self, _excerpt_id: Uuid) -> Result<StatusDto, ExcerptGeneratorError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.statuses)
            .pop_front()
            .unwrap_or_else(|| Ok(status(ExcerptProcessingStatus::InProgress)))
    }
}

pub fn status(status: ExcerptProcessingStatus) -> StatusDto {
    StatusDto {
        status,
        status_details: None,
    }
}
