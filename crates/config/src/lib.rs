//! Lazy per-namespace configuration store.
//!
//! Dotted keys (`database.host`) resolve against one file per top-level
//! key (`database.toml`, `database.yaml`, ...) under a config root
//! directory. Namespaces are decoded on first access by the first
//! registered loader that locates a file, post-processed by a placeholder
//! templater, optionally compiled into a binary disk cache invalidated by
//! source modification time, and memoized in memory until `set` or
//! `delete` mutates the tree.
//!
//! ```no_run
//! use std::sync::Arc;
//! use confdir::{Config, LoaderContext, Templater, TomlLoader, Value, YamlLoader};
//!
//! # fn main() -> Result<(), confdir::ConfigError> {
//! let templater = Arc::new(
//!     Templater::new().constant("BASE", "/srv/app"),
//! );
//! let ctx = LoaderContext::new()
//!     .cache_dir("/var/cache/app")
//!     .templater(templater);
//!
//! let mut config = Config::builder("/etc/app")
//!     .loader(Box::new(TomlLoader::new(ctx.clone())))
//!     .loader(Box::new(YamlLoader::new(ctx)))
//!     .build()?;
//!
//! let host = config.get("database.host")?;
//! # let _ = host;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod loader;
pub mod store;
pub mod template;
pub mod value;

pub use cache::CacheStore;
pub use error::ConfigError;
pub use loader::{IniLoader, JsonLoader, Loader, LoaderContext, TomlLoader, YamlLoader};
pub use store::{Config, ConfigBuilder};
pub use template::Templater;
pub use value::{Table, Value};
