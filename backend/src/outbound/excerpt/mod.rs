//! Excerpt generator outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `ExcerptGenerator`
//! port.

mod dto;
mod http_client;

pub use http_client::{
    DIGITAL_SIGNATURE_DERIVED_HEADER, DIGITAL_SIGNATURE_HEADER, HttpExcerptGenerator,
};
