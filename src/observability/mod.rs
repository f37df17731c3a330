//! Structured logging initialization.

mod logging;

pub use logging::init_tracing;
