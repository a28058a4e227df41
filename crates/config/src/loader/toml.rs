//! TOML namespace loader — the default format.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{Loader, LoaderContext, decode_error, decode_message, run_pipeline};
use crate::error::ConfigError;
use crate::value::{Table, Value};

pub struct TomlLoader {
    ctx: LoaderContext,
}

impl TomlLoader {
    pub fn new(ctx: LoaderContext) -> Self {
        Self { ctx }
    }
}

impl Loader for TomlLoader {
    fn extensions(&self) -> &'static [&'static str] {
        &["toml"]
    }

    fn load(&self, path: &Path) -> Result<Table, ConfigError> {
        run_pipeline(&self.ctx, path, self.extensions(), decode)
    }
}

fn decode(path: &Path, text: &str) -> Result<Table, ConfigError> {
    let value: ::toml::Value = ::toml::from_str(text).map_err(|err| decode_error(path, err))?;
    match convert(value) {
        Value::Table(table) => Ok(table),
        _ => Err(decode_message(path, "top-level value must be a table")),
    }
}

fn convert(value: ::toml::Value) -> Value {
    match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(n) => Value::Integer(n),
        ::toml::Value::Float(n) => Value::Float(n),
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => convert_datetime(dt),
        ::toml::Value::Array(items) => Value::Array(items.into_iter().map(convert).collect()),
        ::toml::Value::Table(table) => Value::Table(
            table
                .into_iter()
                .map(|(key, value)| (key, convert(value)))
                .collect(),
        ),
    }
}

/// Offset date-times parse as-is; local date-times and dates are assumed
/// UTC. Time-only values have no date to anchor to and stay strings.
fn convert_datetime(datetime: ::toml::value::Datetime) -> Value {
    let text = datetime.to_string();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
        return Value::DateTime(parsed);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, format) {
            return Value::DateTime(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Value::DateTime(naive.and_utc().fixed_offset());
        }
    }

    Value::String(text)
}
