//! Shared setup for integration tests.

use std::sync::Once;

static TRACING: Once = Once::new();

/// Route engine logs to the test harness. `RUST_LOG=oenology=debug` shows
/// why rejected actions were refused.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
