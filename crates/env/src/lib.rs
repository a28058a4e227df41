//! Process-environment overlay for `confdir`.
//!
//! Responsibilities:
//! - Load `.env` files and write their values into an environment store.
//! - Track which names were set from which files so `reset()` can reload
//!   them and clear names the files no longer produce.
//! - Normalize raw `.env` scalars with type inference (booleans, numbers,
//!   null) before they reach the environment.
//!
//! Does NOT handle:
//! - Configuration file loading or dotted-key resolution (see `confdir`).
//! - Logger setup; this crate only emits `tracing` diagnostics.
//!
//! Invariants:
//! - Error values never echo `.env` line contents, only a byte index or an
//!   I/O error kind, to keep secrets out of logs and messages.
//! - A missing or unreadable `.env` file is silently skipped; only
//!   malformed content is an error.
//! - `names` records exactly the variables this instance has written, so
//!   `reset()` never clears a variable it did not set.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod store;
mod value;

pub use store::{EnvStore, MemoryEnv, ProcessEnv};
pub use value::EnvValue;

/// File name probed inside the directory handed to [`Env::new`].
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Errors raised while loading environment files.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Env directory does not exist: {path}")]
    MissingDir { path: PathBuf },

    /// Failed to parse a `.env` file due to invalid syntax.
    ///
    /// Only the byte index of the failure is reported, never the offending
    /// line, so secret values cannot leak through error text.
    #[error("Failed to parse env file at position {error_index}")]
    Parse { error_index: usize },

    #[error("Failed to read env file: {kind}")]
    Io { kind: ErrorKind },

    /// Unknown dotenv error (future variants from the dotenvy crate).
    #[error("Failed to load env file")]
    Unknown,
}

/// Environment overlay: loads `.env` files into an [`EnvStore`] and keeps
/// enough state to reload or roll back what it set.
pub struct Env {
    store: Box<dyn EnvStore + Send>,
    loaded: Vec<PathBuf>,
    names: Vec<String>,
    immutable: bool,
}

impl Env {
    /// Create an overlay over the real process environment and load
    /// `dir/.env` if it exists.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, EnvError> {
        Self::with_store(dir, Box::new(ProcessEnv))
    }

    /// Create an overlay backed by a caller-supplied store.
    ///
    /// The directory must exist; a missing `.env` inside it is fine.
    pub fn with_store(
        dir: impl AsRef<Path>,
        store: Box<dyn EnvStore + Send>,
    ) -> Result<Self, EnvError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EnvError::MissingDir {
                path: dir.to_path_buf(),
            });
        }

        let mut env = Self {
            store,
            loaded: Vec::new(),
            names: Vec::new(),
            immutable: false,
        };
        env.load(dir.join(DEFAULT_ENV_FILE))?;
        Ok(env)
    }

    /// When immutable, subsequent loads refuse to overwrite variables that
    /// already have a value, and such skipped names are not tracked.
    pub fn set_immutable(&mut self, immutable: bool) {
        self.immutable = immutable;
    }

    /// Parse `file` and write each entry into the store.
    ///
    /// Missing or unreadable files are skipped silently; malformed content
    /// is an error. Loaded file paths are remembered for [`Env::reset`].
    pub fn load(&mut self, file: impl AsRef<Path>) -> Result<(), EnvError> {
        let file = file.as_ref();
        if !file.is_file() {
            return Ok(());
        }

        let entries = match dotenvy::from_path_iter(file) {
            Ok(entries) => entries,
            Err(err) if is_not_found(&err) => return Ok(()),
            Err(err) => return Err(map_dotenv_error(err)),
        };

        for entry in entries {
            let (name, value) = entry.map_err(map_dotenv_error)?;
            self.apply(name.trim(), &EnvValue::parse(value.trim()));
        }

        self.loaded.push(file.to_path_buf());
        tracing::debug!(file = %file.display(), "loaded env file");
        Ok(())
    }

    /// Read a variable through the store.
    pub fn get(&self, name: &str) -> Option<String> {
        self.store.get(name)
    }

    /// Write a variable through the store and track it as ours.
    pub fn set(&mut self, name: &str, value: &EnvValue) {
        self.apply(name.trim(), value);
    }

    /// Unset a variable in the store.
    pub fn clear(&mut self, name: &str) {
        self.store.unset(name);
    }

    /// Reload every previously loaded file, then unset variables that no
    /// reload produced. Detects keys removed from the files since the
    /// first load.
    pub fn reset(&mut self) -> Result<(), EnvError> {
        let old = std::mem::take(&mut self.names);
        let loaded = std::mem::take(&mut self.loaded);

        let mut files: Vec<PathBuf> = Vec::with_capacity(loaded.len());
        for file in loaded {
            if !files.contains(&file) {
                files.push(file);
            }
        }

        for file in &files {
            self.load(file)?;
        }

        for name in old {
            if !self.names.contains(&name) {
                self.store.unset(&name);
            }
        }

        Ok(())
    }

    fn apply(&mut self, name: &str, value: &EnvValue) {
        if self.immutable && self.store.get(name).is_some() {
            return;
        }

        self.store.set(name, &value.as_env_str());
        self.names.push(name.to_string());
    }
}

fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == ErrorKind::NotFound
    )
}

fn map_dotenv_error(err: dotenvy::Error) -> EnvError {
    match err {
        dotenvy::Error::LineParse(_, error_index) => EnvError::Parse { error_index },
        dotenvy::Error::Io(io_err) => EnvError::Io {
            kind: io_err.kind(),
        },
        _ => EnvError::Unknown,
    }
}
