//! Tracing/logging setup shared by every storefront process and test harness.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
