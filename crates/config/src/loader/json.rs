//! JSON namespace loader.

use std::path::Path;

use super::{Loader, LoaderContext, decode_error, decode_message, run_pipeline};
use crate::error::ConfigError;
use crate::value::{Table, Value};

pub struct JsonLoader {
    ctx: LoaderContext,
}

impl JsonLoader {
    pub fn new(ctx: LoaderContext) -> Self {
        Self { ctx }
    }
}

impl Loader for JsonLoader {
    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn load(&self, path: &Path) -> Result<Table, ConfigError> {
        run_pipeline(&self.ctx, path, self.extensions(), decode)
    }
}

fn decode(path: &Path, text: &str) -> Result<Table, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| decode_error(path, err))?;
    match convert(value) {
        Value::Table(table) => Ok(table),
        _ => Err(decode_message(path, "top-level value must be an object")),
    }
}

fn convert(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(convert).collect())
        }
        serde_json::Value::Object(map) => Value::Table(
            map.into_iter()
                .map(|(key, value)| (key, convert(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::dot_get;

    #[test]
    fn decodes_objects_scalars_and_null() {
        let table = decode(
            Path::new("api.json"),
            r#"{"url": "https://x", "retries": 3, "fallback": null}"#,
        )
        .expect("decode");

        assert_eq!(
            dot_get(&table, "url"),
            Some(&Value::String("https://x".to_string()))
        );
        assert_eq!(dot_get(&table, "retries"), Some(&Value::Integer(3)));
        assert_eq!(dot_get(&table, "fallback"), Some(&Value::Null));
    }

    #[test]
    fn non_object_root_is_a_decode_error() {
        let result = decode(Path::new("api.json"), "[1, 2]");
        assert!(matches!(result, Err(ConfigError::Decode { .. })));
    }
}
