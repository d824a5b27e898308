// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Dotted-path accessors over schema-less Kubernetes objects

use crate::error::{KubedogError, Result};
use kube::core::DynamicObject;
use serde_json::{Map, Value};

/// Split a `.path.to.field` string into its non-empty segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Full content of an object, metadata and type fields included
pub fn object_content(obj: &DynamicObject) -> Result<Value> {
    serde_json::to_value(obj).map_err(|e| KubedogError::InvalidField {
        path: ".".to_string(),
        message: format!("object is not serializable: {}", e),
    })
}

pub fn nested_field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

pub fn nested_string<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    nested_field(value, path).and_then(Value::as_str)
}

pub fn nested_slice<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    nested_field(value, path).and_then(Value::as_array)
}

/// Render a scalar field the way it would appear in a manifest
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Set a field, creating intermediate maps. Fails if a non-map is in the way.
pub fn set_nested_field(target: &mut Value, path: &[&str], new_value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Err(KubedogError::InvalidField {
            path: String::new(),
            message: "field path is empty".to_string(),
        });
    };

    let mut current = target;
    for (depth, key) in parents.iter().enumerate() {
        let map = current.as_object_mut().ok_or_else(|| not_a_map(&path[..depth]))?;
        current = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = current
        .as_object_mut()
        .ok_or_else(|| not_a_map(parents))?;
    map.insert(last.to_string(), new_value);
    Ok(())
}

fn not_a_map(path: &[&str]) -> KubedogError {
    KubedogError::InvalidField {
        path: format!(".{}", path.join(".")),
        message: "value is not a map".to_string(),
    }
}
