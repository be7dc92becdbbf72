//! Digital seal outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `DigitalSealClient` port.

mod http_client;

pub use http_client::HttpDigitalSealClient;
