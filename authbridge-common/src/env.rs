//! Environment variable helpers

use serde_json::Value;
use tracing::error;

/// Read an environment variable, treating empty values as absent.
pub fn var_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Parse a JSON value from an environment variable.
///
/// Missing, empty, and malformed values all yield `None`; malformed input
/// is additionally logged. Callers must treat "no config" and "malformed
/// config" identically.
pub fn json_value(name: &str) -> Option<Value> {
    parse_json_value(name, &std::env::var(name).unwrap_or_default())
}

/// The parsing half of [`json_value`], split out for testability.
pub fn parse_json_value(name: &str, raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(Value::String(text)) if text.is_empty() => None,
        Ok(value) => Some(value),
        Err(err) => {
            error!("Malformed JSON in {}: {}", name, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_json_value("TEST_VAR", ""), None);
        assert_eq!(parse_json_value("TEST_VAR", "   "), None);
    }

    #[test]
    fn test_empty_json_string() {
        assert_eq!(parse_json_value("TEST_VAR", "\"\""), None);
    }

    #[test]
    fn test_null_input() {
        assert_eq!(parse_json_value("TEST_VAR", "null"), None);
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(parse_json_value("TEST_VAR", "invalid json"), None);
    }

    #[test]
    fn test_valid_object() {
        let value = parse_json_value("TEST_VAR", r#"{"key":"value"}"#).unwrap();
        assert_eq!(value["key"], "value");
    }
}
