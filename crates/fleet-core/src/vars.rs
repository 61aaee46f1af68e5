//! Vars objects: parsing user JSON text and unwrapping Fleet's var envelopes
use crate::error::CoreError;
use serde_json::{Map, Value};

/// An unordered map of var name to JSON value.
///
/// `serde_json::Map` is key-ordered (the `preserve_order` feature is not
/// enabled anywhere in the workspace), which makes every serialization of a
/// `Vars` canonical.
pub type Vars = Map<String, Value>;

/// Field that carries the actual value inside a Fleet var envelope.
pub const VALUE_FIELD: &str = "value";

/// Parse user-authored `vars_json` text. Empty text means "not specified".
pub fn parse_vars(text: &str, path: &str) -> Result<Option<Vars>, CoreError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(CoreError::invalid_vars(path, "expected a JSON object")),
        Err(err) => Err(CoreError::invalid_vars(path, err)),
    }
}

/// Unwrap `{"key": {"value": v, ...}}` into `{"key": v}`.
///
/// Entries without a `value` field, or that are not objects at all, are
/// skipped.
pub fn flatten(vars: &Vars) -> Vars {
    vars.iter()
        .filter_map(|(key, envelope)| {
            envelope
                .as_object()
                .and_then(|obj| obj.get(VALUE_FIELD))
                .map(|value| (key.clone(), value.clone()))
        })
        .collect()
}

/// Wrap plain values into Fleet's envelope form: `{"key": {"value": v}}`.
pub fn wrap(vars: &Vars) -> Vars {
    vars.iter()
        .map(|(key, value)| {
            let mut envelope = Map::new();
            envelope.insert(VALUE_FIELD.to_string(), value.clone());
            (key.clone(), Value::Object(envelope))
        })
        .collect()
}

pub fn to_json_string(vars: &Vars) -> Result<String, CoreError> {
    Ok(serde_json::to_string(vars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_vars(value: Value) -> Vars {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_empty_is_none() {
        assert_eq!(parse_vars("", "vars_json").unwrap(), None);
        assert_eq!(parse_vars("  ", "vars_json").unwrap(), None);
    }

    #[test]
    fn test_parse_reports_path() {
        let err = parse_vars("{nope", "input.1.stream.0.vars_json").unwrap_err();
        match err {
            CoreError::InvalidVarsJson { path, .. } => assert_eq!(path, "input.1.stream.0.vars_json"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(parse_vars("[1]", "input.0.vars_json").is_err());
    }

    #[test]
    fn test_flatten_unwraps_value() {
        let vars = as_vars(json!({
            "interval": {"type": "text", "value": "10s"},
            "tags": {"value": ["security"]},
            "no_value": {"type": "bool"},
            "bare": 5
        }));

        assert_eq!(
            Value::Object(flatten(&vars)),
            json!({"interval": "10s", "tags": ["security"]})
        );
    }

    #[test]
    fn test_wrap_then_flatten() {
        let vars = as_vars(json!({"a": 1, "b": {"nested": true}}));
        assert_eq!(flatten(&wrap(&vars)), vars);
    }
}
