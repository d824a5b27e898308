// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest templating.
//!
//! Manifests are rendered with minijinja in strict mode: any reference to an
//! argument that was not supplied fails the render. Go-style field references
//! such as `{{.Name}}` or `{{ .Spec.Size }}` are accepted and rewritten to
//! `{{Name}}` / `{{ Spec.Size }}` before rendering.

use crate::error::{KubedogError, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;
use std::path::Path;

/// Render a manifest. Without arguments the source passes through untouched.
pub fn render(path: &Path, source: &str, args: Option<&Value>) -> Result<String> {
    let Some(args) = args else {
        return Ok(source.to_string());
    };

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);

    env.render_str(&normalize_field_references(source), args)
        .map_err(|e| KubedogError::Template {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Strip the leading `.` from identifiers inside `{{ ... }}` expressions.
fn normalize_field_references(template: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut remaining = template;

    while let Some(start) = remaining.find("{{") {
        result.push_str(&remaining[..start + 2]);
        remaining = &remaining[start + 2..];

        let Some(end) = remaining.find("}}") else {
            break;
        };
        result.push_str(&strip_leading_dots(&remaining[..end]));
        result.push_str("}}");
        remaining = &remaining[end + 2..];
    }

    result.push_str(remaining);
    result
}

fn strip_leading_dots(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut in_string: Option<char> = None;
    let mut previous: Option<char> = None;
    let mut chars = expression.chars().peekable();

    while let Some(c) = chars.next() {
        let last = previous.replace(c);

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            out.push(c);
            continue;
        }
        if c == '"' || c == '\'' {
            in_string = Some(c);
            out.push(c);
            continue;
        }

        let starts_identifier = chars
            .peek()
            .is_some_and(|next| next.is_alphabetic() || *next == '_');
        let after_boundary =
            last.map_or(true, |p| matches!(p, ' ' | '\t' | '(' | ',' | '|' | '-' | '='));
        if c == '.' && starts_identifier && after_boundary {
            continue;
        }
        out.push(c);
    }
    out
}
