//! Format loaders and the capability they implement.
//!
//! Responsibilities:
//! - Define the [`Loader`] capability: supported extensions, file
//!   location by extension probing, and decode-to-tree loading.
//! - Provide the built-in TOML/YAML/JSON/INI loaders behind a shared
//!   pipeline: read, decode, template, optionally cache-compile.
//! - Carry loader wiring in [`LoaderContext`] — explicit injection of the
//!   templater and cache store, no hidden singletons.
//!
//! Does NOT handle:
//! - Namespace-to-loader arbitration (see `store.rs`; loaders are probed
//!   in registration order and the first located file wins).
//!
//! Invariants:
//! - `locate` is an existence probe only; it never opens the file.
//! - `load` on a path whose extension the loader does not own fails with
//!   `UnsupportedFormat` — unreachable when `locate` ran first.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::CacheStore;
use crate::error::ConfigError;
use crate::template::Templater;
use crate::value::Table;

mod ini;
mod json;
mod toml;
mod yaml;

pub use self::ini::IniLoader;
pub use self::json::JsonLoader;
pub use self::toml::TomlLoader;
pub use self::yaml::YamlLoader;

/// A namespace loader for one file format.
pub trait Loader {
    /// Extensions this loader owns, in probe order, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Probe `base` plus each supported extension; the first existing
    /// regular file wins. Existence check only, no content validation.
    fn locate(&self, base: &Path) -> Option<PathBuf> {
        for ext in self.extensions() {
            let mut candidate = OsString::from(base.as_os_str());
            candidate.push(".");
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Decode `path` into a templated tree, going through the compiled
    /// cache when one is configured.
    fn load(&self, path: &Path) -> Result<Table, ConfigError>;
}

/// Shared wiring injected into every built-in loader.
#[derive(Clone, Default)]
pub struct LoaderContext {
    pub(crate) cache: Option<CacheStore>,
    pub(crate) templater: Arc<Templater>,
}

impl LoaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile loaded namespaces into binary snapshots under `dir`.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache = Some(CacheStore::new(dir));
        self
    }

    /// Use `templater` for placeholder substitution after decoding.
    pub fn templater(mut self, templater: Arc<Templater>) -> Self {
        self.templater = templater;
        self
    }
}

/// Decoder entry point of one format: source path (for error context)
/// and file text in, tree out.
type DecodeFn = fn(&Path, &str) -> Result<Table, ConfigError>;

/// Read, decode, template, and (when configured) cache-compile `path`.
pub(crate) fn run_pipeline(
    ctx: &LoaderContext,
    path: &Path,
    extensions: &'static [&'static str],
    decode: DecodeFn,
) -> Result<Table, ConfigError> {
    if !is_supported(path, extensions) {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let fresh = || -> Result<Table, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut table = decode(path, &text)?;
        ctx.templater.apply(&mut table);
        Ok(table)
    };

    match &ctx.cache {
        Some(cache) => cache.load_or_compile(path, fresh),
        None => fresh(),
    }
}

fn is_supported(path: &Path, extensions: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions.contains(&ext) && path.is_file()
}

/// Build a `Decode` error from a format library failure.
pub(crate) fn decode_error(
    path: &Path,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ConfigError {
    ConfigError::Decode {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

/// Build a `Decode` error from a plain message, for decoders without a
/// library error type.
pub(crate) fn decode_message(path: &Path, message: impl Into<String>) -> ConfigError {
    let message: String = message.into();
    ConfigError::Decode {
        path: path.to_path_buf(),
        source: message.into(),
    }
}
