// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kind to REST mapping resolution with a per-client discovery cache

use crate::error::{KubedogError, Result};
use kube::{
    core::GroupVersionKind,
    discovery::{self, ApiCapabilities, ApiResource, Scope},
    Client,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// REST coordinates needed to address a kind through the dynamic API
#[derive(Debug, Clone)]
pub struct TypeMapping {
    pub resource: ApiResource,
    pub namespaced: bool,
}

impl TypeMapping {
    pub fn new(resource: ApiResource, capabilities: &ApiCapabilities) -> Self {
        Self {
            resource,
            namespaced: matches!(capabilities.scope, Scope::Namespaced),
        }
    }

    pub fn plural(&self) -> &str {
        &self.resource.plural
    }
}

/// Cache key, ordered as (group, kind, version)
type CacheKey = (String, String, String);

/// Discovery client wrapper that remembers every mapping it resolves.
///
/// One instance per client; callers that need isolation construct their own.
pub struct CachedDiscovery {
    client: Client,
    mappings: Mutex<HashMap<CacheKey, TypeMapping>>,
}

impl CachedDiscovery {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            mappings: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a kind, querying the API server only on first use
    #[instrument(skip(self, gvk), fields(gvk = %format_gvk(gvk)))]
    pub async fn resolve(&self, gvk: &GroupVersionKind) -> Result<TypeMapping> {
        let key = (gvk.group.clone(), gvk.kind.clone(), gvk.version.clone());

        if let Some(mapping) = self.mappings.lock().await.get(&key) {
            debug!("Using cached mapping for {}", mapping.plural());
            return Ok(mapping.clone());
        }

        let (resource, capabilities) = discovery::pinned_kind(&self.client, gvk)
            .await
            .map_err(|e| KubedogError::TypeResolution {
                gvk: format_gvk(gvk),
                source: e,
            })?;
        let mapping = TypeMapping::new(resource, &capabilities);

        info!(
            "Resolved {} to resource '{}' ({})",
            format_gvk(gvk),
            mapping.plural(),
            if mapping.namespaced { "namespaced" } else { "cluster-scoped" }
        );

        self.mappings.lock().await.insert(key, mapping.clone());
        Ok(mapping)
    }
}

/// Resolve a kind, failing fast when no discovery client was configured
pub async fn resolve_type(
    gvk: &GroupVersionKind,
    discovery: Option<&CachedDiscovery>,
) -> Result<TypeMapping> {
    let Some(discovery) = discovery else {
        return Err(KubedogError::Config(
            "discovery client is not initialized".to_string(),
        ));
    };
    discovery.resolve(gvk).await
}

pub fn format_gvk(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        format!("{}/{}", gvk.version, gvk.kind)
    } else {
        format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
    }
}
