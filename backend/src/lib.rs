//! History excerpt library: history table reading, request signing, and
//! excerpt generation through pluggable ports.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(test)]
mod test_support;
