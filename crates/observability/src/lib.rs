//! Shared observability setup for binaries, examples, and test harnesses.

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use tracing::init;
