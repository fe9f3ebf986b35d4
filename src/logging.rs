// ==========================================
// Logging setup
// ==========================================
// tracing + tracing-subscriber
// Level taken from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=asset_import=trace
///
/// # Example
/// ```no_run
/// use asset_import::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stderr keeps stdout free for the JSON report
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON lines instead of the human-readable format.
pub fn init_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Subscriber for tests: debug level, captured by the test harness.
/// Safe to call from every test.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
