//! Object storage outbound adapters.

mod object_store_storage;

pub use object_store_storage::{ObjectStorageSettings, ObjectStoreSignatureStorage, build_s3_store};
