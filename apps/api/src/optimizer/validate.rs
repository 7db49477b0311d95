//! Structural validator — checks a candidate value against a schema node.
//!
//! Purely structural: it never inspects prose quality beyond what length and
//! pattern constraints encode. It also never fails — a missing property or a
//! wrong type is reported as a violation, not an error.

use serde_json::Value;

use crate::optimizer::schema::SchemaNode;

/// Outcome of one validation call. Constructed fresh per call, never mutated.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub is_valid: bool,
    pub violations: Vec<String>,
}

/// Validates `value` against `node`, collecting every violation.
pub fn validate(value: &Value, node: &SchemaNode) -> Verdict {
    let mut violations = Vec::new();
    check(value, node, "value", &mut violations);
    Verdict {
        is_valid: violations.is_empty(),
        violations,
    }
}

fn check(value: &Value, node: &SchemaNode, label: &str, out: &mut Vec<String>) {
    match node {
        SchemaNode::Object(obj) => {
            let Some(map) = value.as_object() else {
                out.push(format!("{label} must be an object, got {}", kind(value)));
                return;
            };
            for required in &obj.required {
                if !map.contains_key(*required) {
                    out.push(format!("missing required property: {required}"));
                }
            }
            for (key, prop) in &obj.properties {
                if let Some(present) = map.get(*key) {
                    check(present, prop, key, out);
                }
            }
        }
        SchemaNode::String(s) => {
            let Some(text) = value.as_str() else {
                out.push(format!("{label} must be a string, got {}", kind(value)));
                return;
            };
            let len = text.chars().count();
            if let Some(min) = s.min_length {
                if len < min {
                    out.push(format!("{label} is too short (min {min} characters)"));
                }
            }
            if let Some(max) = s.max_length {
                if len > max {
                    out.push(format!("{label} is too long (max {max} characters)"));
                }
            }
            if let Some(pattern) = &s.pattern {
                if !pattern.is_match(text) {
                    out.push(format!("{label} does not match required pattern"));
                }
            }
        }
        SchemaNode::Array(a) => {
            let Some(items) = value.as_array() else {
                out.push(format!("{label} must be an array, got {}", kind(value)));
                return;
            };
            if let Some(min) = a.min_items {
                if items.len() < min {
                    out.push(format!("{label} must have at least {min} items"));
                }
            }
            if let Some(max) = a.max_items {
                if items.len() > max {
                    out.push(format!("{label} must have at most {max} items"));
                }
            }
            if a.unique_items && has_duplicates(items) {
                out.push(format!("{label} must not contain duplicates"));
            }
            for (index, item) in items.iter().enumerate() {
                check(item, &a.items, &format!("{label}[{index}]"), out);
            }
        }
    }
}

fn has_duplicates(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, a)| items[..i].iter().any(|b| a == b))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
