//! Placeholder substitution over decoded trees.
//!
//! Responsibilities:
//! - Replace `%name%` / `%name:arg1,arg2%` string scalars with the return
//!   value of a registered function.
//! - Substitute `${CONST}` occurrences from a registered constant table.
//! - Walk tables and arrays recursively; only string scalars change.
//!
//! Does NOT handle:
//! - Decoding (loaders hand this module an already-decoded tree).
//! - Caching; the cache compiler stores the templated result, so cached
//!   values are frozen at compile time while fresh decodes re-evaluate.
//!
//! Invariants:
//! - Resolution failures are not errors: an unknown function leaves the
//!   whole scalar untouched, an unknown constant stays verbatim.
//! - Functions and constants are injected registries, never ambient
//!   globals, and nothing is ever invoked by reflection.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::value::{Table, Value};

/// A registered template function.
pub type TemplateFn = Box<dyn Fn(&[Value]) -> Value + Send + Sync>;

fn call_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%([A-Za-z0-9_]+)(?::([^%]*))?%").expect("call pattern"))
}

fn constant_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("constant pattern"))
}

/// Whitelist-style registries consulted while templating decoded trees.
#[derive(Default)]
pub struct Templater {
    functions: HashMap<String, TemplateFn>,
    constants: HashMap<String, String>,
}

impl Templater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template function under `name`.
    pub fn function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Box::new(f));
        self
    }

    /// Register a named constant for `${NAME}` substitution.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    /// Rewrite every string scalar in `table`, recursing through nested
    /// tables and arrays.
    pub fn apply(&self, table: &mut Table) {
        for value in table.values_mut() {
            self.apply_value(value);
        }
    }

    fn apply_value(&self, value: &mut Value) {
        match value {
            Value::Table(child) => self.apply(child),
            Value::Array(items) => {
                for item in items {
                    self.apply_value(item);
                }
            }
            Value::String(s) => {
                if let Some(rendered) = self.render(s) {
                    *value = rendered;
                }
            }
            _ => {}
        }
    }

    /// Resolve one scalar. `None` means "leave it unchanged".
    fn render(&self, raw: &str) -> Option<Value> {
        if let Some(caps) = call_pattern().captures(raw) {
            // Unknown function: the scalar stays untouched, constants
            // included.
            let func = self.functions.get(&caps[1])?;

            let value = match caps.get(2) {
                None => func(&[]),
                Some(args) => {
                    let args: Vec<Value> = args
                        .as_str()
                        .split(',')
                        .map(|arg| Value::String(self.substitute_constants(arg.trim())))
                        .collect();
                    func(&args)
                }
            };
            return Some(value);
        }

        let substituted = self.substitute_constants(raw);
        if substituted != raw {
            Some(Value::String(substituted))
        } else {
            None
        }
    }

    fn substitute_constants(&self, raw: &str) -> String {
        constant_pattern()
            .replace_all(raw, |caps: &regex::Captures| {
                match self.constants.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::dot_get;

    fn table_with(key: &str, value: Value) -> Table {
        let mut table = Table::new();
        table.insert(key.to_string(), value);
        table
    }

    #[test]
    fn zero_arg_function_replaces_the_scalar() {
        let templater = Templater::new().function("version", |_| Value::Integer(42));
        let mut table = table_with("v", Value::String("%version%".to_string()));

        templater.apply(&mut table);
        assert_eq!(table["v"], Value::Integer(42));
    }

    #[test]
    fn arguments_are_split_trimmed_and_constant_substituted() {
        let templater = Templater::new()
            .constant("ROOT", "/srv")
            .function("join", |args| {
                let parts: Vec<&str> = args.iter().filter_map(Value::as_str).collect();
                Value::String(parts.join("/"))
            });
        let mut table = table_with("p", Value::String("%join:${ROOT} , logs%".to_string()));

        templater.apply(&mut table);
        assert_eq!(table["p"], Value::String("/srv/logs".to_string()));
    }

    #[test]
    fn unknown_function_leaves_the_scalar_untouched() {
        let templater = Templater::new().constant("ROOT", "/srv");
        let mut table = table_with("v", Value::String("%missing:${ROOT}%".to_string()));

        templater.apply(&mut table);
        assert_eq!(table["v"], Value::String("%missing:${ROOT}%".to_string()));
    }

    #[test]
    fn constants_substitute_inside_plain_strings() {
        let templater = Templater::new().constant("HOST", "db.internal");
        let mut table = table_with("dsn", Value::String("pg://${HOST}:5432".to_string()));

        templater.apply(&mut table);
        assert_eq!(table["dsn"], Value::String("pg://db.internal:5432".to_string()));
    }

    #[test]
    fn unknown_constants_stay_verbatim() {
        let templater = Templater::new();
        let mut table = table_with("v", Value::String("${NOT_SET}/x".to_string()));

        templater.apply(&mut table);
        assert_eq!(table["v"], Value::String("${NOT_SET}/x".to_string()));
    }

    #[test]
    fn templating_recurses_through_arrays_and_tables() {
        let templater = Templater::new().function("one", |_| Value::Integer(1));
        let mut inner = Table::new();
        inner.insert(
            "list".to_string(),
            Value::Array(vec![Value::String("%one%".to_string())]),
        );
        let mut table = table_with("nested", Value::Table(inner));

        templater.apply(&mut table);
        assert_eq!(
            dot_get(&table, "nested.list"),
            Some(&Value::Array(vec![Value::Integer(1)]))
        );
    }
}
