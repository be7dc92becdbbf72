//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL history table reads via `sqlx`
//! - **digital_seal**: reqwest client for the signing service
//! - **excerpt**: reqwest client for the excerpt generator
//! - **storage**: `object_store` buckets for request signatures
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod digital_seal;
pub mod excerpt;
mod http_support;
pub mod persistence;
pub mod storage;

pub use http_support::HttpAdapterBuildError;
