//! Merge-filter for vars objects.
//!
//! Fleet enriches every vars object it stores with package defaults and
//! computed entries. Reading those back verbatim would make the stored state
//! differ from what the user wrote on every refresh, so the read value is cut
//! down to the keys the user actually specified.
//!
//! Keys Fleet adds that the user has not declared yet are dropped as well.
//! That is the accepted trade-off: a new upstream default never shows up as a
//! diff until the user names it.

use crate::error::CoreError;
use crate::vars::Vars;
use serde_json::Value;

/// Keep only the keys of `new` that are also present in `old`.
///
/// Values always come from `new`; values in `old` are never compared. The
/// result is canonical JSON text (keys sorted), so callers can compare it as
/// a string.
pub fn filter_unspecified_keys(old: &str, new: &str) -> Result<String, CoreError> {
    let old = parse_object(old, "old")?;
    let new = parse_object(new, "new")?;
    let filtered = filter_unspecified_map(&old, new);
    Ok(serde_json::to_string(&filtered)?)
}

/// Map form of [`filter_unspecified_keys`].
pub fn filter_unspecified_map(old: &Vars, mut new: Vars) -> Vars {
    new.retain(|key, _| old.contains_key(key));
    new
}

/// Re-serialize a JSON object with sorted keys and no insignificant whitespace.
pub fn canonicalize(json: &str) -> Result<String, CoreError> {
    let value = parse_object(json, "value")?;
    Ok(serde_json::to_string(&value)?)
}

fn parse_object(json: &str, which: &str) -> Result<Vars, CoreError> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CoreError::Parse(format!(
            "{} is not a JSON object: {}",
            which, other
        ))),
        Err(err) => Err(CoreError::Parse(format!("{}: {}", which, err))),
    }
}
