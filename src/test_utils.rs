// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use crate::kubernetes::discovery::TypeMapping;
use crate::manifest::Resource;
use http::{Request, Response};
use kube::client::Body;
use kube::core::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::Client;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

type Key = (String, String);

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Responses queued for the same method and path are served in order; the
/// last one is repeated once the queue is drained. Every request is recorded
/// together with its body.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Key, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<(Key, Vec<u8>)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response for requests matching the exact method and path
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests received so far, as (method, path)
    pub fn requests(&self) -> Vec<Key> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// JSON bodies sent with the given method and path, in order
    pub fn bodies(&self, method: &str, path: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|((m, p), _)| m == method && p == path)
            .map(|(_, body)| serde_json::from_slice(body).unwrap_or(Value::Null))
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|((m, p), _)| m == method && p == path)
            .count()
    }

    /// Number of requests with the given method, any path
    pub fn count_method(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|((m, _), _)| m == method)
            .count()
    }

    fn find_response(&self, method: &str, path: &str, body: Vec<u8>) -> Option<(u16, String)> {
        let key = (method.to_string(), path.to_string());
        self.requests.lock().unwrap().push((key.clone(), body));

        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mock = self.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let sent = req.into_body().collect_bytes().await?;

            let (status, body) = mock
                .find_response(&method, &path, sent.to_vec())
                .unwrap_or_else(|| (404, not_found_json("resource", &path)));

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))?)
        })
    }
}

/// Discovery document for a group version, listing the kinds tests use
pub fn api_resource_list_json(group_version: &str) -> String {
    let resources: &[(&str, &str, bool)] = match group_version {
        "v1" => &[
            ("configmaps", "ConfigMap", true),
            ("secrets", "Secret", true),
            ("namespaces", "Namespace", false),
        ],
        "apps/v1" => &[("deployments", "Deployment", true)],
        "rbac.authorization.k8s.io/v1" => &[
            ("roles", "Role", true),
            ("clusterroles", "ClusterRole", false),
        ],
        _ => &[],
    };

    let resources: Vec<_> = resources
        .iter()
        .map(|(name, kind, namespaced)| {
            serde_json::json!({
                "name": name,
                "singularName": kind.to_lowercase(),
                "namespaced": namespaced,
                "kind": kind,
                "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]
            })
        })
        .collect();

    serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources
    })
    .to_string()
}

/// Create a mock ConfigMap JSON response
pub fn configmap_json(name: &str, namespace: &str, data: serde_json::Value) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "42"
        },
        "data": data
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!("{} \"{}\" already exists", resource, name),
    )
}

pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// A resolved ConfigMap resource, optionally declaring a namespace
pub fn config_map(name: &str, namespace: Option<&str>) -> Resource {
    let mut object: DynamicObject = serde_json::from_value(serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {"name": name},
        "data": {"key": "value"}
    }))
    .unwrap();
    object.metadata.namespace = namespace.map(str::to_string);
    resource(object, "", "v1", "ConfigMap", "configmaps", true)
}

/// A resolved cluster-scoped ClusterRole resource
pub fn cluster_role(name: &str) -> Resource {
    let object: DynamicObject = serde_json::from_value(serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRole",
        "metadata": {"name": name},
        "rules": []
    }))
    .unwrap();
    resource(object, "rbac.authorization.k8s.io", "v1", "ClusterRole", "clusterroles", false)
}

fn resource(
    object: DynamicObject,
    group: &str,
    version: &str,
    kind: &str,
    plural: &str,
    namespaced: bool,
) -> Resource {
    let gvk = GroupVersionKind::gvk(group, version, kind);
    Resource {
        object,
        mapping: TypeMapping {
            resource: ApiResource::from_gvk_with_plural(&gvk, plural),
            namespaced,
        },
        gvk,
    }
}
