//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for the loop thread and the
//! scoped temporary directories.
//!
//! ## Sentinel values
//! - `temp_root = None` → `std::env::temp_dir()`
//! - `temp_prefix = ""` → [`DEFAULT_TEMP_PREFIX`]

use std::path::PathBuf;

/// Prefix used for temporary directory names when none is configured.
pub const DEFAULT_TEMP_PREFIX: &str = "browservicetmp_";

/// Default name of the event-loop thread.
pub const DEFAULT_THREAD_NAME: &str = "sharedloop-ui";

/// Configuration for the loop thread and temp directories.
///
/// ## Field semantics
/// - `thread_name`: OS thread name of the loop (shows up in panics and profilers)
/// - `drain_on_shutdown`: run tasks still queued at shutdown instead of dropping them
/// - `temp_root`: parent directory for [`TempDir`](crate::TempDir) (`None` = system temp)
/// - `temp_prefix`: name prefix for temp directories (`""` = default)
///
/// ## Notes
/// All fields are public. Prefer the accessors to avoid repeating sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name given to the event-loop thread.
    pub thread_name: String,

    /// Whether tasks still queued when the loop is shut down are executed.
    ///
    /// - `true`: the loop stops accepting tasks, runs what is queued, then exits.
    ///   Strong-bound targets therefore always see their call.
    /// - `false`: queued tasks are dropped unrun (captured handles are released).
    pub drain_on_shutdown: bool,

    /// Parent directory for temporary directories.
    pub temp_root: Option<PathBuf>,

    /// Prefix for temporary directory names.
    pub temp_prefix: String,
}

impl Config {
    /// Returns the temp root, falling back to the system temp directory.
    #[inline]
    pub fn temp_root_or_default(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Returns the temp prefix, falling back to [`DEFAULT_TEMP_PREFIX`] when empty.
    #[inline]
    pub fn temp_prefix_or_default(&self) -> &str {
        if self.temp_prefix.is_empty() {
            DEFAULT_TEMP_PREFIX
        } else {
            &self.temp_prefix
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `thread_name = "sharedloop-ui"`
    /// - `drain_on_shutdown = true`
    /// - `temp_root = None` (system temp directory)
    /// - `temp_prefix = "browservicetmp_"`
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            drain_on_shutdown: true,
            temp_root: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}
