//! Test doubles shared by unit tests in `src/`.
//!
//! Only compiled for test builds. Integration tests under `tests/` keep their
//! own stubs because they link against the non-test library.

pub mod excerpt;
pub mod http;
