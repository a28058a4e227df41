//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for construction, decoding, and cache failures.
//! - Carry enough context (paths, source errors) to diagnose a failure.
//!
//! Does NOT handle:
//! - Env overlay errors (see `confdir-env`); they convert in via `From`.
//!
//! Invariants:
//! - Missing namespaces and unresolved placeholders are never errors;
//!   they surface as `None` values and verbatim strings respectively.
//! - Nothing is retried and nothing is logged at error level; failures
//!   propagate synchronously to the caller of `get`.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed source error from a format decoder.
pub type DecodeSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building a [`crate::Config`] or resolving
/// a key through it.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configured root directory does not exist (construction-time).
    #[error("Config directory does not exist: {path}")]
    MissingConfigDir { path: PathBuf },

    /// `load` was called on a file whose extension the loader does not
    /// own. Unreachable when `locate` is used first.
    #[error("File is not supported by this loader: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read config file at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed content for the loader's format.
    #[error("Failed to decode config file at {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeSource,
    },

    /// The cache directory could not be created.
    #[error("Cache directory permission denied: {path}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config cache at {path}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config cache at {path}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache encoding itself failed or produced undecodable bytes.
    #[error("Config cache encoding failed at {path}: {detail}")]
    CacheCodec { path: PathBuf, detail: String },

    #[error(transparent)]
    Env(#[from] confdir_env::EnvError),
}
