//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

/// Initialize the process-wide tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Output is compact
/// text; set `TROLLEY_LOG_FORMAT=json` for structured logs. Safe to call
/// more than once (later calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("TROLLEY_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.compact().try_init();
    }
}
