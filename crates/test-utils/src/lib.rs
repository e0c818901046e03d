//! Shared helpers for cmdpipe's integration tests.

pub mod builders;
pub mod fake_runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness capture.
///
/// `RUST_LOG` selects the filter; default is `info`. Output shows up for
/// failing tests, or for all of them with `--nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Default guard for tests that spawn real children.
pub const CHILD_TIMEOUT: Duration = Duration::from_secs(10);

/// Fail the test if `fut` does not finish within [`CHILD_TIMEOUT`], which
/// for a child process usually means a pipe was never closed.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(CHILD_TIMEOUT, fut).await {
        Ok(value) => value,
        Err(_) => panic!("child did not finish within {CHILD_TIMEOUT:?}"),
    }
}
