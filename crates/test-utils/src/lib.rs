//! Shared helpers for `tor-prebuilt` integration tests.

pub mod builders;
pub mod fake_process;
pub mod scripts;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tor_prebuilt::logging::LOG_ENV_VAR;
use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured per test and shown for failures only. The filter is
/// read from `TOR_PREBUILT_LOG`, as in the binary, and defaults to
/// `tor_prebuilt=debug` so process lifecycle events show up in failures.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("warn,tor_prebuilt=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(out) => out,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
