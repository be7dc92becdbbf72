//! Domain services and ports.
//!
//! Purpose: read operational history, sign excerpt requests and drive the
//! remote generator. Adapters live in `crate::outbound` and plug in through
//! the traits in [`ports`].
//!
//! Public surface:
//! - `HistoryQueryService` (in `history`): reads and maps a history table.
//! - `DigitalSignatureService`: seals payloads and stores the seals.
//! - `ExcerptService`: submits excerpts and polls for completion.
//! - `HistoryExcerptor`: composes the three into one workflow.

pub mod excerpt;
pub mod history;
pub mod history_excerptor;
pub mod ports;
pub mod signature;

pub use self::excerpt::{
    EXCERPT_STATUS_CHECK_INTERVAL, ExcerptError, ExcerptPollingConfig, ExcerptService,
    SleepCancelled, StatusCheckSleeper, TokioStatusCheckSleeper,
};
pub use self::history_excerptor::{
    HISTORY_EXCERPT_TYPE, HistoryExcerptOutcome, HistoryExcerptRequest, HistoryExcerptor,
    HistoryExcerptorError,
};
pub use self::signature::{DigitalSignatureService, SignatureError};
