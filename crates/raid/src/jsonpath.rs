// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Path queries over JSON documents
//!
//! A path is a list of dot separated segments:
//!
//! * a plain segment selects an object key, or an array index if numeric
//! * `#` applies the remainder of the path to every array element and collects the
//!   results, skipping elements where the remainder matched nothing
//! * a segment containing `*` or `?` selects the first object key matching it
//!
//! ```
//! use raid::jsonpath;
//!
//! let doc = serde_json::json!({"Controllers": [{"Response Data": {"Number of Controllers": 2}}]});
//! let count = jsonpath::query(&doc, "Controllers.#.Response Data.Number of Controllers");
//! assert_eq!(count, Some(serde_json::json!([2])));
//! ```

use glob::Pattern;
use serde_json::Value;

/// Runs `path` against `value`, returning `None` if nothing matched
pub fn query(value: &Value, path: &str) -> Option<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    select(value, &segments)
}

/// Runs `path` and renders the result as a string, empty if nothing matched.
///
/// Strings are returned without quotes, other values as their JSON text.
pub fn query_str(value: &Value, path: &str) -> String {
    match query(value, path) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Runs `path` and flattens any nested arrays in the result into one list
pub fn query_flat(value: &Value, path: &str) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(v) = query(value, path) {
        flatten(v, &mut out);
    }
    out
}

fn flatten(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|v| flatten(v, out)),
        other => out.push(other),
    }
}

fn select(value: &Value, segments: &[&str]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match value {
        Value::Array(items) if *head == "#" => {
            if rest.is_empty() {
                return Some(Value::from(items.len()));
            }
            let collected = items.iter().filter_map(|item| select(item, rest)).collect();
            Some(Value::Array(collected))
        }
        Value::Array(items) => {
            let index: usize = head.parse().ok()?;
            select(items.get(index)?, rest)
        }
        Value::Object(map) if is_wildcard(head) => {
            let pattern = Pattern::new(head).ok()?;
            let (_, child) = map.iter().find(|(key, _)| pattern.matches(key))?;
            select(child, rest)
        }
        Value::Object(map) => select(map.get(*head)?, rest),
        _ => None,
    }
}

fn is_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?'])
}
