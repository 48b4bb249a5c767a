//! Common test utilities for tv-post integration tests


#[allow(unused_imports)]
pub use fixtures::*;
