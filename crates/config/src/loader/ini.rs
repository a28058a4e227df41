//! INI namespace loader.
//!
//! Line-based decoding with typed scalars: `[section]` headers are
//! flattened away, `key[] =` appends to an array, unquoted values go
//! through the same inference INI readers traditionally apply
//! (booleans, null, integers, floats), quoted values stay strings.

use std::path::Path;

use super::{Loader, LoaderContext, decode_message, run_pipeline};
use crate::error::ConfigError;
use crate::value::{Table, Value};

pub struct IniLoader {
    ctx: LoaderContext,
}

impl IniLoader {
    pub fn new(ctx: LoaderContext) -> Self {
        Self { ctx }
    }
}

impl Loader for IniLoader {
    fn extensions(&self) -> &'static [&'static str] {
        &["ini"]
    }

    fn load(&self, path: &Path) -> Result<Table, ConfigError> {
        run_pipeline(&self.ctx, path, self.extensions(), decode)
    }
}

fn decode(path: &Path, text: &str) -> Result<Table, ConfigError> {
    let mut table = Table::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(decode_message(
                path,
                format!("line {}: expected `key = value`", index + 1),
            ));
        };

        let key = key.trim();
        let value = scalar(value.trim());

        if let Some(name) = key.strip_suffix("[]") {
            let entry = table
                .entry(name.trim_end().to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(value);
            } else {
                *entry = Value::Array(vec![value]);
            }
        } else {
            table.insert(key.to_string(), value);
        }
    }

    Ok(table)
}

fn scalar(raw: &str) -> Value {
    if raw.len() >= 2 {
        for quote in ['"', '\''] {
            if raw.starts_with(quote) && raw.ends_with(quote) {
                return Value::String(raw[1..raw.len() - 1].to_string());
            }
        }
    }

    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Value::Bool(true),
        "false" | "off" | "no" | "none" => Value::Bool(false),
        "null" => Value::Null,
        "" => Value::String(String::new()),
        _ => raw
            .parse::<i64>()
            .map(Value::Integer)
            .or_else(|_| raw.parse::<f64>().map(Value::Float))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}
