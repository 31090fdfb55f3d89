//! Test support utilities.
//!
//! Available under the `test-internals` feature (on by default) and in unit
//! tests. Not for production use.

/// Initializes tracing for tests if not already done.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
