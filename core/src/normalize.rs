//! Normalization of list responses whose shape is not fixed.
//!
//! The service may answer a listing with a bare array or with the array
//! wrapped under one of a few conventional keys. `ListShape` strategies are
//! tried in order and the first match wins.

use serde_json::Value;

/// A way a list can appear in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// The body is the array.
    Bare,
    /// The body is an object holding the array under this key.
    Wrapped(&'static str),
    /// The body is an object; treat it as a one-element list.
    SingleWrap,
}

/// Shapes accepted for task listings. The trailing `SingleWrap` is a
/// degraded fallback, not a data contract.
pub const TASK_LIST_SHAPES: &[ListShape] = &[
    ListShape::Bare,
    ListShape::Wrapped("tasks"),
    ListShape::Wrapped("items"),
    ListShape::Wrapped("data"),
    ListShape::Wrapped("results"),
    ListShape::SingleWrap,
];

pub const PROJECT_LIST_SHAPES: &[ListShape] = &[
    ListShape::Bare,
    ListShape::Wrapped("projects"),
    ListShape::Wrapped("data"),
    ListShape::Wrapped("items"),
    ListShape::Wrapped("results"),
];

pub const WORKSPACE_LIST_SHAPES: &[ListShape] = &[
    ListShape::Bare,
    ListShape::Wrapped("workspaces"),
    ListShape::Wrapped("organizations"),
    ListShape::Wrapped("data"),
];

impl ListShape {
    /// Extract the list if `value` has this shape.
    pub fn extract(self, value: &mut Value) -> Option<Vec<Value>> {
        match (self, value) {
            (ListShape::Bare, Value::Array(items)) => Some(std::mem::take(items)),
            (ListShape::Wrapped(key), Value::Object(map)) => match map.get_mut(key) {
                Some(Value::Array(items)) => Some(std::mem::take(items)),
                _ => None,
            },
            (ListShape::SingleWrap, object @ Value::Object(_)) => Some(vec![object.take()]),
            _ => None,
        }
    }
}

/// Apply `shapes` in order and return the first extracted list.
///
/// Returns an empty list when no shape matches.
pub fn normalize_list(mut value: Value, shapes: &[ListShape]) -> Vec<Value> {
    for shape in shapes {
        if let Some(items) = shape.extract(&mut value) {
            if *shape == ListShape::SingleWrap {
                tracing::warn!("no list found in response, wrapping the whole object");
            }
            return items;
        }
    }
    tracing::warn!(kind = value_kind(&value), "response is not a recognized list shape");
    Vec::new()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
