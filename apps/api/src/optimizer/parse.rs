//! Response parser — converts raw generation output into a candidate value.
//!
//! The generation service is prompted to return a single JSON value but is not
//! trustworthy. Parsing is a staged fallback chain, each stage more permissive
//! and more lossy than the last:
//!
//! 1. parse the whole response (code fences stripped) as JSON
//! 2. parse the first balanced `{...}` or `[...]` substring
//! 3. heuristic field extraction driven by the target schema
//!
//! `parse` always returns a value. Stage 3 can only produce empty fields, never
//! an error; the repairer downstream guarantees presence and type.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::optimizer::schema::{ObjectNode, SchemaNode};

/// Parses `raw` into a candidate value shaped for `node`. Never fails.
pub fn parse(raw: &str, node: &SchemaNode) -> Value {
    let text = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return value;
    }

    if let Some(candidate) = first_balanced_json(text) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            debug!("parsed generation response from embedded JSON substring");
            return value;
        }
    }

    debug!("generation response is not JSON; falling back to field extraction");
    extract_fields(text, node)
}

/// Strips ```json ... ``` or ``` ... ``` fences that models wrap JSON in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let stripped = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match stripped {
        Some(inner) => {
            let inner = inner.trim_start();
            inner
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(inner)
        }
        None => text,
    }
}

/// Finds the first balanced `{...}` or `[...]` substring, tracking string
/// literals so braces inside quoted text do not miscount.
fn first_balanced_json(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();

    for (index, &byte) in bytes.iter().enumerate() {
        if byte != b'{' && byte != b'[' {
            continue;
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, &b) in bytes[index..].iter().enumerate() {
            if escaped {
                escaped = false;
                continue;
            }
            match b {
                b'\\' if in_string => escaped = true,
                b'"' => in_string = !in_string,
                b'{' | b'[' if !in_string => depth += 1,
                b'}' | b']' if !in_string => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(&text[index..index + offset + 1]);
                    }
                }
                _ => {}
            }
        }
        // This opener never closed; retry from the next one.
    }
    None
}

/// Stage 3: best-effort extraction of schema fields from free text.
fn extract_fields(text: &str, node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Object(obj) => extract_object(text, obj),
        // Category schemas are all objects; for bare nodes return the text itself
        // in the closest shape and let the repairer sort out the rest.
        SchemaNode::String(_) => Value::String(text.trim().to_string()),
        SchemaNode::Array(_) => Value::Array(
            bullet_lines(text)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
    }
}

fn extract_object(text: &str, obj: &ObjectNode) -> Value {
    let mut out = Map::new();
    for (key, prop) in &obj.properties {
        match prop {
            SchemaNode::String(_) => {
                out.insert((*key).into(), Value::String(extract_string_field(text, key)));
            }
            SchemaNode::Array(_) => {
                out.insert(
                    (*key).into(),
                    Value::Array(
                        extract_array_field(text, key)
                            .into_iter()
                            .map(Value::String)
                            .collect(),
                    ),
                );
            }
            // Nested objects (e.g. skill categories) have no usable free-text
            // form; leave them absent for the repairer to default.
            SchemaNode::Object(_) => {}
        }
    }
    Value::Object(out)
}

/// Looks for `key: "value"` or `key: rest-of-line` style lines.
fn extract_string_field(text: &str, key: &str) -> String {
    let escaped = regex::escape(key);
    let patterns = [
        format!(r#"(?i){escaped}:\s*"([^"]+)""#),
        format!(r"(?i){escaped}:\s*([^\n]+)"),
        format!(r"(?i){escaped}[^:\n]*:\s*([^\n]+)"),
    ];
    for pattern in &patterns {
        let Some(re) = regex(pattern) else { continue };
        if let Some(captures) = re.captures(text) {
            if let Some(found) = captures.get(1) {
                return found.as_str().trim().to_string();
            }
        }
    }
    String::new()
}

/// Prefers bullet-marked lines; falls back to a comma-separated `key:` line.
fn extract_array_field(text: &str, key: &str) -> Vec<String> {
    let bullets = bullet_lines(text);
    if !bullets.is_empty() {
        return bullets;
    }

    let escaped = regex::escape(key);
    if let Some(re) = regex(&format!(r"(?i){escaped}:\s*([^\n]+)")) {
        if let Some(captures) = re.captures(text) {
            if let Some(found) = captures.get(1) {
                return found
                    .as_str()
                    .split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect();
            }
        }
    }
    Vec::new()
}

fn bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let stripped = trimmed
                .strip_prefix('•')
                .or_else(|| trimmed.strip_prefix('-'))
                .or_else(|| trimmed.strip_prefix('*'))?;
            let content = stripped.trim();
            (!content.is_empty()).then(|| content.to_string())
        })
        .collect()
}

fn regex(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}
