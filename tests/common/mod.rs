#![allow(dead_code)]

pub use cmdpipe_test_utils::init_tracing;

use cmdpipe::{ExecContext, ProgramLocator};

/// Absolute path of a standard tool, found through the real locator.
pub fn prog(name: &str) -> String {
    ProgramLocator::new()
        .resolve(name)
        .unwrap_or_else(|e| panic!("test needs `{name}` installed: {e}"))
        .to_string_lossy()
        .into_owned()
}

/// Context over the real system with the execution log enabled.
pub fn verbose_context() -> ExecContext {
    ExecContext::new(ProgramLocator::new(), true)
}
