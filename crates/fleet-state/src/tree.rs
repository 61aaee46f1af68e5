//! Configuration tree access by dotted path
//!
//! Paths address nested values the way the resource schema lays them out:
//! `input.0.stream.1.vars_json`. Numeric segments index lists.

use crate::error::StateError;
use serde_json::{Map, Value};

/// Typed key-path storage for a resource's configuration and state.
pub trait ConfigTree {
    fn get_string(&self, path: &str) -> Result<Option<String>, StateError>;

    fn get_bool(&self, path: &str) -> Result<Option<bool>, StateError>;

    /// Number of elements in the list at `path`; 0 when absent.
    fn get_list_len(&self, path: &str) -> Result<usize, StateError>;

    fn set(&mut self, path: &str, value: Value);

    fn remove(&mut self, path: &str);
}

/// A [`ConfigTree`] backed by a JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonTree {
    root: Value,
}

impl JsonTree {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn from_json_str(json: &str) -> Result<Self, StateError> {
        serde_json::from_str(json)
            .map(Self::from_value)
            .map_err(|e| StateError::Document(e.to_string()))
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn to_json_string(&self) -> Result<String, StateError> {
        serde_json::to_string_pretty(&self.root).map_err(|e| StateError::Document(e.to_string()))
    }

    fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl ConfigTree for JsonTree {
    fn get_string(&self, path: &str) -> Result<Option<String>, StateError> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(mismatch(path, "string")),
        }
    }

    fn get_bool(&self, path: &str) -> Result<Option<bool>, StateError> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(mismatch(path, "bool")),
        }
    }

    fn get_list_len(&self, path: &str) -> Result<usize, StateError> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Array(items)) => Ok(items.len()),
            Some(_) => Err(mismatch(path, "list")),
        }
    }

    fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut node = &mut self.root;
        for (i, segment) in parents.iter().enumerate() {
            let next_is_index = segments[i + 1].parse::<usize>().is_ok();
            node = child_mut(node, segment, next_is_index);
        }
        *child_mut(node, last, false) = value;
    }

    fn remove(&mut self, path: &str) {
        let (parent, last) = match path.rsplit_once('.') {
            Some((parent, last)) => (self.get_mut(parent), last),
            None => (Some(&mut self.root), path),
        };
        match parent {
            Some(Value::Object(map)) => {
                map.remove(last);
            }
            Some(Value::Array(items)) => {
                if let Ok(i) = last.parse::<usize>() {
                    if i < items.len() {
                        items.remove(i);
                    }
                }
            }
            _ => {}
        }
    }
}

impl JsonTree {
    fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        path.split('.').try_fold(&mut self.root, |node, segment| match node {
            Value::Object(map) => map.get_mut(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(move |i| items.get_mut(i)),
            _ => None,
        })
    }
}

/// Step into `segment`, creating the container on the way. `as_list` picks
/// the container type when the child has to be created.
fn child_mut<'a>(node: &'a mut Value, segment: &str, as_list: bool) -> &'a mut Value {
    match (node, segment.parse::<usize>().ok()) {
        (Value::Array(items), Some(i)) => {
            if items.len() <= i {
                items.resize_with(i + 1, || empty_container(as_list));
            }
            let child = &mut items[i];
            if child.is_null() {
                *child = empty_container(as_list);
            }
            child
        }
        (Value::Object(map), _) => map
            .entry(segment.to_string())
            .or_insert_with(|| empty_container(as_list)),
        // Scalars, and lists addressed by name, become objects.
        (node, _) => {
            *node = Value::Object(Map::new());
            child_mut(node, segment, as_list)
        }
    }
}

fn empty_container(as_list: bool) -> Value {
    if as_list {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn mismatch(path: &str, expected: &'static str) -> StateError {
    StateError::TypeMismatch {
        path: path.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_lists_and_objects() {
        let mut tree = JsonTree::new();
        tree.set("name", json!("p"));
        tree.set("package.0.name", json!("winlog"));
        tree.set("input.1.stream.0.vars_json", json!("{}"));

        assert_eq!(
            tree.as_value(),
            &json!({
                "name": "p",
                "package": [{"name": "winlog"}],
                "input": [{}, {"stream": [{"vars_json": "{}"}]}]
            })
        );
    }

    #[test]
    fn test_set_replaces_scalars_on_the_way() {
        let mut tree = JsonTree::from_value(json!({"package": "winlog", "input": [1]}));
        tree.set("package.0.name", json!("winlog"));
        tree.set("input.type", json!("winlog"));

        assert_eq!(
            tree.as_value(),
            &json!({
                "package": {"0": {"name": "winlog"}},
                "input": {"type": "winlog"}
            })
        );
    }

    #[test]
    fn test_json_document_roundtrip() {
        let mut tree = JsonTree::new();
        tree.set("id", json!("pp-1"));
        tree.set("input.0.stream.0.vars_json", json!(r#"{"channel":"Security"}"#));

        let text = tree.to_json_string().unwrap();
        let restored = JsonTree::from_json_str(&text).unwrap();
        assert_eq!(restored, tree);
        assert_eq!(
            restored.get_string("input.0.stream.0.vars_json").unwrap().as_deref(),
            Some(r#"{"channel":"Security"}"#)
        );

        assert!(matches!(
            JsonTree::from_json_str("{not json"),
            Err(StateError::Document(_))
        ));
    }

    #[test]
    fn test_typed_gets() {
        let tree = JsonTree::from_value(json!({
            "name": "p",
            "input": [{"enabled": false, "stream": [{}, {}]}]
        }));

        assert_eq!(tree.get_string("name").unwrap().as_deref(), Some("p"));
        assert_eq!(tree.get_string("description").unwrap(), None);
        assert_eq!(tree.get_bool("input.0.enabled").unwrap(), Some(false));
        assert_eq!(tree.get_list_len("input.0.stream").unwrap(), 2);
        assert_eq!(tree.get_list_len("input.3.stream").unwrap(), 0);
    }

    #[test]
    fn test_type_mismatch() {
        let tree = JsonTree::from_value(json!({"name": 5, "input": {}}));
        assert_eq!(
            tree.get_string("name").unwrap_err(),
            StateError::TypeMismatch {
                path: "name".to_string(),
                expected: "string"
            }
        );
        assert!(tree.get_list_len("input").is_err());
        assert!(tree.get_bool("name").is_err());
    }

    #[test]
    fn test_remove() {
        let mut tree = JsonTree::from_value(json!({
            "id": "pp-1",
            "input": [{"type": "a"}, {"type": "b"}]
        }));
        tree.remove("id");
        tree.remove("input.0");
        tree.remove("missing.path");

        assert_eq!(tree.as_value(), &json!({"input": [{"type": "b"}]}));
    }
}
