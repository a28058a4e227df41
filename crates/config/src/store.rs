//! The lazy dot-path configuration store.
//!
//! Responsibilities:
//! - Resolve dotted keys against an in-memory tree, loading the owning
//!   namespace from disk on first touch.
//! - Memoize every resolved key (hits and misses) in a flat cache.
//! - Arbitrate between registered loaders: first loader to locate a file
//!   for a namespace wins, in registration order.
//! - Forward `env(name)` to the attached overlay, or the ambient process
//!   environment when none is attached.
//!
//! Does NOT handle:
//! - Decoding, templating, or disk caching (see `loader`, `template`,
//!   `cache`).
//!
//! Invariants:
//! - The flat cache and the tree are only mutated together: `set` and
//!   `delete` clear the whole flat cache, never a slice of it.
//! - A namespace whose file is absent is never marked in the tree; each
//!   distinct unqueried sub-key probes the filesystem once and is then
//!   memoized under its exact key string.
//! - Empty and `"."` keys resolve to `None` without touching the
//!   filesystem or the flat cache.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use confdir_env::Env;

use crate::error::ConfigError;
use crate::loader::{Loader, LoaderContext, TomlLoader};
use crate::value::{Table, Value, dot_get, dot_remove, dot_set};

/// Lazy namespace-resolving key-value store.
pub struct Config {
    folder: PathBuf,
    items: Table,
    cache: HashMap<String, Option<Value>>,
    loaders: Vec<Box<dyn Loader>>,
    env: Option<Env>,
}

impl Config {
    pub fn builder(folder: impl Into<PathBuf>) -> ConfigBuilder {
        ConfigBuilder {
            folder: folder.into(),
            env_dir: None,
            loaders: Vec::new(),
        }
    }

    /// Append a loader; it is consulted after all previously registered
    /// ones.
    pub fn add_loader(&mut self, loader: Box<dyn Loader>) {
        self.loaders.push(loader);
    }

    /// Resolve a dotted key.
    ///
    /// Returns `Ok(None)` for empty and `"."` keys, for keys in
    /// namespaces without a config file, and for sub-keys the namespace
    /// file does not define. Decode and cache failures propagate.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>, ConfigError> {
        if key.is_empty() || key == "." {
            return Ok(None);
        }

        if let Some(hit) = self.cache.get(key) {
            return Ok(hit.clone());
        }

        let mut found = dot_get(&self.items, key).cloned();

        if found.is_none() {
            let namespace = key.split('.').next().unwrap_or(key);
            if !self.items.contains_key(namespace) {
                if let Some(loaded) = self.resolve(namespace)? {
                    self.items
                        .insert(namespace.to_string(), Value::Table(loaded));
                    found = dot_get(&self.items, key).cloned();
                }
            }
        }

        self.cache.insert(key.to_string(), found.clone());
        Ok(found)
    }

    /// Presence check with `get` semantics.
    pub fn has(&mut self, key: &str) -> Result<bool, ConfigError> {
        Ok(self.get(key)?.is_some())
    }

    /// Write a dotted key into the tree, creating intermediate tables as
    /// needed, and drop the whole flat cache.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        dot_set(&mut self.items, key, value.into());
        self.cache.clear();
    }

    /// Remove a dotted key from the tree and drop the whole flat cache.
    pub fn delete(&mut self, key: &str) {
        dot_remove(&mut self.items, key);
        self.cache.clear();
    }

    /// Modification time of the file owning `key`'s namespace, without
    /// decoding it. `None` when no loader locates a file.
    pub fn modify_time(&self, key: &str) -> Option<SystemTime> {
        let namespace = key.split('.').next().unwrap_or(key);
        let base = self.folder.join(namespace);

        for loader in &self.loaders {
            if let Some(path) = loader.locate(&base) {
                return fs::metadata(&path).and_then(|meta| meta.modified()).ok();
            }
        }

        None
    }

    /// Read an environment variable through the overlay, or from the
    /// ambient process environment when no overlay is attached.
    pub fn env(&self, name: &str) -> Option<String> {
        match &self.env {
            Some(env) => env.get(name),
            None => std::env::var(name).ok(),
        }
    }

    pub fn env_overlay(&self) -> Option<&Env> {
        self.env.as_ref()
    }

    pub fn env_overlay_mut(&mut self) -> Option<&mut Env> {
        self.env.as_mut()
    }

    fn resolve(&self, namespace: &str) -> Result<Option<Table>, ConfigError> {
        let base = self.folder.join(namespace);

        for loader in &self.loaders {
            if let Some(path) = loader.locate(&base) {
                tracing::debug!(namespace, path = %path.display(), "loading config namespace");
                return loader.load(&path).map(Some);
            }
        }

        Ok(None)
    }
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    folder: PathBuf,
    env_dir: Option<PathBuf>,
    loaders: Vec<Box<dyn Loader>>,
}

impl ConfigBuilder {
    /// Register a loader. Registration order is precedence order.
    pub fn loader(mut self, loader: Box<dyn Loader>) -> Self {
        self.loaders.push(loader);
        self
    }

    /// Attach an environment overlay rooted at `dir` (loads `dir/.env`).
    pub fn env_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.env_dir = Some(dir.into());
        self
    }

    /// Build the store.
    ///
    /// Fails if the config directory does not exist. With no registered
    /// loaders, a plain TOML loader (no cache, empty templater) is the
    /// default.
    pub fn build(self) -> Result<Config, ConfigError> {
        if !self.folder.is_dir() {
            return Err(ConfigError::MissingConfigDir { path: self.folder });
        }

        let loaders = if self.loaders.is_empty() {
            vec![Box::new(TomlLoader::new(LoaderContext::default())) as Box<dyn Loader>]
        } else {
            self.loaders
        };

        let env = match self.env_dir {
            Some(dir) => Some(Env::new(dir)?),
            None => None,
        };

        Ok(Config {
            folder: self.folder,
            items: Table::new(),
            cache: HashMap::new(),
            loaders,
            env,
        })
    }
}
