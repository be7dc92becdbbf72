//! PostgreSQL persistence adapters using `sqlx`.
//!
//! # Architecture
//!
//! - **Thin adapters**: the history source only translates Postgres rows into
//!   raw cell values. Classification and typing stay in the domain.
//! - **Schema allow-list**: table and column identifiers are checked against
//!   `information_schema` before any history query runs.
//! - **Async-safe pooling**: connections come from a shared `sqlx` pool.
//! - **Strongly typed errors**: all database errors map to
//!   `HistoryTableSourceError`.
//!
//! # Example
//!
//! ```ignore
//! use history_excerptor::outbound::persistence::{DbPool, PoolConfig, SqlxHistoryTableSource};
//!
//! let config = PoolConfig::new("postgres://localhost/registry");
//! let pool = DbPool::new(config).await?;
//! let source = SqlxHistoryTableSource::new(pool);
//! ```

mod pool;
mod sqlx_history_table_source;

pub use pool::{DbPool, PoolConfig, PoolError};
pub use sqlx_history_table_source::SqlxHistoryTableSource;
