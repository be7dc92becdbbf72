//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod digital_seal;
mod excerpt_generator;
mod history_table_source;
mod signature_storage;

#[cfg(test)]
pub use digital_seal::MockDigitalSealClient;
pub use digital_seal::{DigitalSealClient, DigitalSealError, SignRequest, SignResponse};
#[cfg(test)]
pub use excerpt_generator::MockExcerptGenerator;
pub use excerpt_generator::{
    ExcerptEventDto, ExcerptGenerator, ExcerptGeneratorError, ExcerptProcessingStatus,
    ExcerptSignatureHeaders, StatusDto,
};
#[cfg(test)]
pub use history_table_source::MockHistoryTableSource;
pub use history_table_source::{HistoryTableSource, HistoryTableSourceError};
#[cfg(test)]
pub use signature_storage::MockSignatureStorage;
pub use signature_storage::{SignatureStorage, SignatureStorageError};
