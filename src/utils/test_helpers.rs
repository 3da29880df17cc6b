//! Shared helpers for unit and integration tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for integration tests.
///
/// Wrapped in a `Once` so the global subscriber is installed a single time
/// even when tests run in parallel. Unit tests inside the library use
/// `tracing-test` instead and must not call this.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Writes `content` to `root/relative`, creating parent folders.
pub fn write_fixture_file(root: &Path, relative: &str, content: &str) -> io::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Returns true when the current process runs as root (UID 0).
/// Permission-based tests are skipped then, because root can read anything.
#[cfg(test)]
#[inline]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no side effects and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
