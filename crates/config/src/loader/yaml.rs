//! YAML namespace loader. Probes `.yml` before `.yaml`.

use std::path::Path;

use super::{Loader, LoaderContext, decode_error, decode_message, run_pipeline};
use crate::error::ConfigError;
use crate::value::{Table, Value};

pub struct YamlLoader {
    ctx: LoaderContext,
}

impl YamlLoader {
    pub fn new(ctx: LoaderContext) -> Self {
        Self { ctx }
    }
}

impl Loader for YamlLoader {
    fn extensions(&self) -> &'static [&'static str] {
        &["yml", "yaml"]
    }

    fn load(&self, path: &Path) -> Result<Table, ConfigError> {
        run_pipeline(&self.ctx, path, self.extensions(), decode)
    }
}

fn decode(path: &Path, text: &str) -> Result<Table, ConfigError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| decode_error(path, err))?;
    match convert(value) {
        Value::Table(table) => Ok(table),
        _ => Err(decode_message(path, "top-level value must be a mapping")),
    }
}

fn convert(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(convert).collect())
        }
        serde_yaml::Value::Mapping(map) => Value::Table(
            map.into_iter()
                .map(|(key, value)| (key_string(key), convert(value)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => convert(tagged.value),
    }
}

/// YAML allows non-string mapping keys; they flatten to their scalar
/// rendering so the tree stays string-keyed.
fn key_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
