//! Typed view of raw `.env` scalars.
//!
//! `.env` values are plain text, but booleans, numbers, and null are
//! recognized and normalized before they reach the environment: `true`
//! becomes `"1"`, `false` and `null` become `""`, numbers keep their
//! decimal form. Everything else passes through verbatim.

/// A `.env` scalar after type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Null,
    Str(String),
}

impl EnvValue {
    /// Infer the type of a raw scalar.
    ///
    /// `true`/`on`/`yes` and `false`/`off`/`no`/`none` are booleans,
    /// `null` is null, integer- and float-shaped text becomes numeric.
    /// Matching is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => EnvValue::Bool(true),
            "false" | "off" | "no" | "none" => EnvValue::Bool(false),
            "null" => EnvValue::Null,
            _ => raw
                .parse::<i64>()
                .map(EnvValue::Integer)
                .or_else(|_| raw.parse::<f64>().map(EnvValue::Float))
                .unwrap_or_else(|_| EnvValue::Str(raw.to_string())),
        }
    }

    /// The string written into the environment.
    pub fn as_env_str(&self) -> String {
        match self {
            EnvValue::Bool(true) => "1".to_string(),
            EnvValue::Bool(false) | EnvValue::Null => String::new(),
            EnvValue::Integer(n) => n.to_string(),
            EnvValue::Float(n) => n.to_string(),
            EnvValue::Str(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_recognized_in_any_case() {
        assert_eq!(EnvValue::parse("TRUE"), EnvValue::Bool(true));
        assert_eq!(EnvValue::parse("on"), EnvValue::Bool(true));
        assert_eq!(EnvValue::parse("Yes"), EnvValue::Bool(true));
        assert_eq!(EnvValue::parse("off"), EnvValue::Bool(false));
        assert_eq!(EnvValue::parse("none"), EnvValue::Bool(false));
    }

    #[test]
    fn numbers_keep_their_decimal_form() {
        assert_eq!(EnvValue::parse("8080"), EnvValue::Integer(8080));
        assert_eq!(EnvValue::parse("2.5"), EnvValue::Float(2.5));
        assert_eq!(EnvValue::parse("8080").as_env_str(), "8080");
    }

    #[test]
    fn booleans_and_null_stringify_like_the_environment_expects() {
        assert_eq!(EnvValue::parse("true").as_env_str(), "1");
        assert_eq!(EnvValue::parse("false").as_env_str(), "");
        assert_eq!(EnvValue::parse("null").as_env_str(), "");
    }

    #[test]
    fn everything_else_passes_through() {
        assert_eq!(
            EnvValue::parse("postgres://db"),
            EnvValue::Str("postgres://db".to_string())
        );
    }
}
