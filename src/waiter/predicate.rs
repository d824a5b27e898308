// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Convergence targets evaluated on every poll.

use crate::error::{is_not_found, KubedogError, Result};
use crate::kubernetes::unstructured::{
    nested_field, nested_slice, object_content, scalar_string, split_path,
};
use kube::core::DynamicObject;
use std::fmt;
use std::str::FromStr;

/// Result of evaluating a predicate against one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    Pending,
}

/// A `.path.to.field=value` selector.
///
/// There is no escaping: keys cannot contain `.` or `=` and values cannot
/// contain `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    pub path: Vec<String>,
    pub value: String,
}

impl FromStr for FieldSelector {
    type Err = KubedogError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('=').collect();
        let [key, value] = parts.as_slice() else {
            return Err(KubedogError::InvalidSelector(s.to_string()));
        };

        let path: Vec<String> = split_path(key.trim()).into_iter().map(String::from).collect();
        if path.is_empty() {
            return Err(KubedogError::InvalidSelector(s.to_string()));
        }

        Ok(FieldSelector {
            path,
            value: value.trim().to_string(),
        })
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}={}", self.path.join("."), self.value)
    }
}

/// What a waiter is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The resource can be fetched
    Created,
    /// The resource can no longer be fetched
    Deleted,
    /// A field of the live object holds the selector's value
    Selector(FieldSelector),
    /// `status.conditions` holds an entry of this type with this status
    Condition { condition_type: String, status: String },
}

impl Predicate {
    /// Parse the `created` / `deleted` states used by existence steps
    pub fn from_state(state: &str) -> Result<Self> {
        match state.trim() {
            "created" => Ok(Predicate::Created),
            "deleted" => Ok(Predicate::Deleted),
            other => Err(KubedogError::Config(format!(
                "unsupported state '{}', expected created or deleted",
                other
            ))),
        }
    }

    /// Evaluate one fetch. Errors other than an awaited "not found" are hard failures.
    pub fn evaluate(&self, fetched: std::result::Result<DynamicObject, kube::Error>) -> Result<Outcome> {
        match (self, fetched) {
            (Predicate::Created, Ok(_)) => Ok(Outcome::Matched),
            (Predicate::Created, Err(e)) if is_not_found(&e) => Ok(Outcome::Pending),
            (Predicate::Deleted, Ok(_)) => Ok(Outcome::Pending),
            (Predicate::Deleted, Err(e)) if is_not_found(&e) => Ok(Outcome::Matched),
            (Predicate::Selector(selector), Ok(obj)) => selector_matches(selector, &obj),
            (Predicate::Condition { condition_type, status }, Ok(obj)) => {
                condition_matches(condition_type, status, &obj)
            }
            (_, Err(e)) => Err(KubedogError::KubeError(e)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Created => f.write_str("created"),
            Predicate::Deleted => f.write_str("deleted"),
            Predicate::Selector(selector) => write!(f, "converged to {}", selector),
            Predicate::Condition { condition_type, status } => {
                write!(f, "in condition {}={}", condition_type, status)
            }
        }
    }
}

fn selector_matches(selector: &FieldSelector, obj: &DynamicObject) -> Result<Outcome> {
    let content = object_content(obj)?;
    let path: Vec<&str> = selector.path.iter().map(String::as_str).collect();

    let matched = nested_field(&content, &path)
        .and_then(scalar_string)
        .is_some_and(|actual| actual == selector.value);

    Ok(if matched { Outcome::Matched } else { Outcome::Pending })
}

fn condition_matches(condition_type: &str, status: &str, obj: &DynamicObject) -> Result<Outcome> {
    let content = object_content(obj)?;

    let matched = nested_slice(&content, &["status", "conditions"])
        .into_iter()
        .flatten()
        .filter(|c| c.get("type").and_then(|t| t.as_str()) == Some(condition_type))
        .filter_map(|c| c.get("status").and_then(|s| s.as_str()))
        .any(|actual| actual.eq_ignore_ascii_case(status));

    Ok(if matched { Outcome::Matched } else { Outcome::Pending })
}
