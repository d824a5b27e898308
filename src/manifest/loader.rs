// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest loading: read, render, split, decode and resolve.

use crate::constants::DOCUMENT_SEPARATOR;
use crate::error::{KubedogError, Result};
use crate::kubernetes::discovery::{resolve_type, CachedDiscovery, TypeMapping};
use crate::manifest::template;
use kube::core::{DynamicObject, GroupVersionKind};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::{debug, instrument};

/// One decoded manifest document together with its resolved REST mapping
#[derive(Debug, Clone)]
pub struct Resource {
    pub object: DynamicObject,
    pub gvk: GroupVersionKind,
    pub mapping: TypeMapping,
}

impl Resource {
    pub fn name(&self) -> &str {
        self.object.metadata.name.as_deref().unwrap_or_default()
    }

    /// Namespace declared in the manifest, if any
    pub fn namespace(&self) -> Option<&str> {
        self.object
            .metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(ns) => write!(f, "{} {}/{}", self.gvk.kind, ns, self.name()),
            None => write!(f, "{} {}", self.gvk.kind, self.name()),
        }
    }
}

/// Load a manifest holding exactly one document
#[instrument(skip(args, discovery))]
pub async fn load_resource(
    path: &Path,
    args: Option<&Value>,
    discovery: Option<&CachedDiscovery>,
) -> Result<Resource> {
    let content = read_manifest(path, args).await?;
    let mut objects = parse_documents(path, &content)?;

    if objects.len() != 1 {
        return Err(KubedogError::Config(format!(
            "{} must hold exactly one document, found {}",
            path.display(),
            objects.len()
        )));
    }

    resolve(objects.remove(0), discovery).await
}

/// Load every document of a manifest, in file order
#[instrument(skip(args, discovery))]
pub async fn load_resources(
    path: &Path,
    args: Option<&Value>,
    discovery: Option<&CachedDiscovery>,
) -> Result<Vec<Resource>> {
    let content = read_manifest(path, args).await?;
    let objects = parse_documents(path, &content)?;

    let mut resources = Vec::with_capacity(objects.len());
    for object in objects {
        resources.push(resolve(object, discovery).await?);
    }
    Ok(resources)
}

/// Read a manifest from disk and render it against the template arguments
pub async fn read_manifest(path: &Path, args: Option<&Value>) -> Result<String> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| KubedogError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    template::render(path, &source, args)
}

/// Split rendered content on the document separator, dropping blank documents
pub fn split_documents(content: &str) -> Vec<&str> {
    content
        .split(DOCUMENT_SEPARATOR)
        .map(|segment| segment.trim_matches(|c: char| c == '\n' || c == '\r' || c == ' '))
        .filter(|segment| !segment.is_empty())
        .collect()
}

pub fn parse_documents(path: &Path, content: &str) -> Result<Vec<DynamicObject>> {
    split_documents(content)
        .into_iter()
        .enumerate()
        .map(|(index, segment)| decode_document(path, index, segment))
        .collect()
}

fn decode_document(path: &Path, index: usize, segment: &str) -> Result<DynamicObject> {
    let decode_error = |message: String| KubedogError::Decode {
        path: path.to_path_buf(),
        document: index,
        message,
    };

    let value: Value = serde_yaml::from_str(segment).map_err(|e| decode_error(e.to_string()))?;
    if !value.is_object() {
        return Err(decode_error("document is not a map".to_string()));
    }

    let object: DynamicObject =
        serde_json::from_value(value).map_err(|e| decode_error(e.to_string()))?;

    match &object.types {
        Some(types) if !types.api_version.is_empty() && !types.kind.is_empty() => {}
        _ => return Err(decode_error("missing apiVersion or kind".to_string())),
    }
    if object.metadata.name.as_deref().unwrap_or_default().is_empty() {
        return Err(decode_error("missing metadata.name".to_string()));
    }

    debug!("Decoded document {} of {}", index, path.display());
    Ok(object)
}

/// Group, version and kind from an object's apiVersion and kind fields
pub fn object_gvk(object: &DynamicObject) -> Option<GroupVersionKind> {
    let types = object.types.as_ref()?;
    let (group, version) = match types.api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", types.api_version.as_str()),
    };
    Some(GroupVersionKind::gvk(group, version, &types.kind))
}

async fn resolve(object: DynamicObject, discovery: Option<&CachedDiscovery>) -> Result<Resource> {
    let gvk = object_gvk(&object).ok_or_else(|| {
        KubedogError::Config("object has no apiVersion or kind".to_string())
    })?;
    let mapping = resolve_type(&gvk, discovery).await?;
    Ok(Resource {
        object,
        gvk,
        mapping,
    })
}
