//! Content repairer — best-effort conformance to presence and type constraints.
//!
//! Weaker than validation on purpose: the output is guaranteed to have every
//! schema property present with the right JSON type, so it is safe to merge
//! and display. Length, pattern, and cardinality constraints may still fail.

use serde_json::{Map, Value};

use crate::optimizer::schema::SchemaNode;

/// Rebuilds `candidate` to satisfy the presence and type constraints of `node`.
///
/// The result contains exactly the schema's properties; unknown keys are
/// dropped. Missing or mistyped strings become `""`, missing or mistyped
/// arrays become `[]`, and array elements that do not match the item type
/// are filtered out. Nested objects are repaired recursively.
pub fn repair(candidate: &Value, node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Object(obj) => {
            let empty = Map::new();
            let map = candidate.as_object().unwrap_or(&empty);
            let mut out = Map::new();
            for (key, prop) in &obj.properties {
                let current = map.get(*key).unwrap_or(&Value::Null);
                out.insert((*key).into(), repair(current, prop));
            }
            Value::Object(out)
        }
        SchemaNode::String(_) => Value::String(candidate.as_str().unwrap_or_default().to_string()),
        SchemaNode::Array(a) => {
            let items = candidate.as_array().cloned().unwrap_or_default();
            Value::Array(
                items
                    .into_iter()
                    .filter_map(|item| match &*a.items {
                        SchemaNode::String(_) => item.is_string().then_some(item),
                        SchemaNode::Array(_) => item.is_array().then_some(item),
                        SchemaNode::Object(_) => Some(repair(&item, &a.items)),
                    })
                    .collect(),
            )
        }
    }
}
