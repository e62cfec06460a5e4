//! Shared utilities for the ballot poll.

pub mod logging;

pub use logging::{init_tracing, LogFormat};
