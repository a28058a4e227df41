//! Compiled disk cache for decoded namespaces.
//!
//! Responsibilities:
//! - Keep one binary snapshot per source file under the cache directory,
//!   named after the source with the extension replaced by `bin`.
//! - Recompile when the cache is stale (strictly older than the source,
//!   or missing); equal timestamps count as fresh, a coarse-granularity
//!   caveat inherited from mtime comparison.
//! - Hand back the tree decoded from the cache file on both the hit and
//!   the miss path, so callers get bit-identical values either way.
//!
//! Does NOT handle:
//! - Decoding or templating; the caller passes a closure producing the
//!   templated tree, and whatever that closure froze in is what a later
//!   cache hit returns.
//!
//! Invariants:
//! - Writes go to a sibling temp file and rename into place, so a
//!   concurrent reader never observes a truncated cache.
//! - Concurrent writers are not excluded; the encoding is deterministic,
//!   so the last writer wins with identical bytes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::value::Table;

/// Extension of compiled cache files.
pub const COMPILED_EXTENSION: &str = "bin";

/// A cache directory holding compiled namespace snapshots.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Return the cached tree for `source`, recompiling first if the
    /// cache is stale or absent.
    pub(crate) fn load_or_compile(
        &self,
        source: &Path,
        decode: impl FnOnce() -> Result<Table, ConfigError>,
    ) -> Result<Table, ConfigError> {
        let cache_path = self.cache_path(source);

        if is_stale(&cache_path, source) {
            let table = decode()?;
            self.ensure_dir()?;
            self.write(&cache_path, &table)?;
            tracing::debug!(
                source = %source.display(),
                cache = %cache_path.display(),
                "recompiled config cache"
            );
        }

        self.read(&cache_path)
    }

    fn cache_path(&self, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or(source.as_os_str());
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(COMPILED_EXTENSION);
        self.dir.join(name)
    }

    fn ensure_dir(&self) -> Result<(), ConfigError> {
        if self.dir.is_dir() {
            return Ok(());
        }

        if let Err(source) = fs::create_dir_all(&self.dir) {
            // A concurrent creator may have won the race; only fail if
            // the directory still is not there.
            if !self.dir.is_dir() {
                return Err(ConfigError::CacheDir {
                    path: self.dir.clone(),
                    source,
                });
            }
        }

        Ok(())
    }

    fn write(&self, cache_path: &Path, table: &Table) -> Result<(), ConfigError> {
        let bytes = bincode::serde::encode_to_vec(table, bincode::config::standard()).map_err(
            |err| ConfigError::CacheCodec {
                path: cache_path.to_path_buf(),
                detail: err.to_string(),
            },
        )?;

        let tmp = cache_path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|source| ConfigError::CacheWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, cache_path).map_err(|source| ConfigError::CacheWrite {
            path: cache_path.to_path_buf(),
            source,
        })
    }

    fn read(&self, cache_path: &Path) -> Result<Table, ConfigError> {
        let bytes = fs::read(cache_path).map_err(|source| ConfigError::CacheRead {
            path: cache_path.to_path_buf(),
            source,
        })?;

        let (table, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .map_err(|err| ConfigError::CacheCodec {
                path: cache_path.to_path_buf(),
                detail: err.to_string(),
            })?;
        Ok(table)
    }
}

/// Stale when the cache is strictly older than the source or missing.
/// An unreadable source timestamp also reads as stale; the decode that
/// follows will surface the real error.
fn is_stale(cache: &Path, source: &Path) -> bool {
    let Ok(source_mtime) = fs::metadata(source).and_then(|meta| meta.modified()) else {
        return true;
    };

    match fs::metadata(cache).and_then(|meta| meta.modified()) {
        Ok(cache_mtime) => cache_mtime < source_mtime,
        Err(_) => true,
    }
}
