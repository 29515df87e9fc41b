//! # Scoped temporary directory.
//!
//! [`TempDir`] is itself a shared-only object: creating one makes a fresh,
//! uniquely named directory and the last [`Handle`] to drop removes it.
//!
//! ## Rules
//! - Name: `<root>/<prefix><6 random alphanumerics>`, created with mode `0700`
//!   on Unix. Collisions are retried a bounded number of times.
//! - Creation failure is returned to the caller, who cannot continue without
//!   the directory.
//! - Removal is non-recursive (like `rmdir`); failure is a warning, never a panic.

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::Config;
use crate::error::RuntimeError;
use crate::lifecycle::{create, CreateKey, Handle, LeakToken, SharedOnly};

const SUFFIX_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 64;

/// Directory that was just created on disk; only this module can produce one.
#[derive(Debug)]
pub struct CreatedDir {
    path: PathBuf,
}

/// A uniquely named directory removed when its last handle drops.
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
    _token: LeakToken<TempDir>,
}

impl SharedOnly for TempDir {
    type Args = CreatedDir;

    fn construct(key: CreateKey<Self>, dir: CreatedDir) -> Self {
        TempDir {
            path: dir.path,
            _token: key.into_token(),
        }
    }

    fn leak_token(&self) -> &LeakToken<Self> {
        &self._token
    }
}

impl TempDir {
    /// Creates a directory using [`Config::default`] (system temp, `browservicetmp_`).
    pub fn create() -> Result<Handle<TempDir>, RuntimeError> {
        Self::create_with(&Config::default())
    }

    /// Creates a directory under the configured root and prefix.
    pub fn create_with(cfg: &Config) -> Result<Handle<TempDir>, RuntimeError> {
        Self::create_in(cfg.temp_root_or_default(), cfg.temp_prefix_or_default())
    }

    /// Creates `<root>/<prefix>XXXXXX`.
    ///
    /// An error means no scratch space exists; callers are expected to treat
    /// it as fatal (typically by propagating it out of `main`).
    pub fn create_in(
        root: impl AsRef<Path>,
        prefix: &str,
    ) -> Result<Handle<TempDir>, RuntimeError> {
        let root = root.as_ref();
        let path = make_unique_dir(root, prefix).map_err(|source| RuntimeError::TempDir {
            path: root.to_path_buf(),
            source,
        })?;
        tracing::trace!(path = %path.display(), "created temporary directory");
        Ok(create::<TempDir>(CreatedDir { path }))
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_dir(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Deleting temporary directory failed"
            );
        }
    }
}

fn make_unique_dir(root: &Path, prefix: &str) -> io::Result<PathBuf> {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    let mut rng = rand::rng();
    for _ in 0..MAX_ATTEMPTS {
        let suffix: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        let path = root.join(format!("{prefix}{suffix}"));
        match builder.create(&path) {
            Ok(()) => return Ok(path),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "exhausted attempts to pick a unique temporary directory name",
    ))
}
