// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Create, update and delete of arbitrary resources through the dynamic API

use crate::error::{is_already_exists, is_not_found, KubedogError, Result};
use crate::manifest::Resource;
use kube::{
    api::{DeleteParams, PostParams},
    core::DynamicObject,
    Api, Client,
};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Mutating verbs a step can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    /// Same as `Create`
    Submit,
    Update,
    Delete,
}

impl FromStr for Operation {
    type Err = KubedogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "create" => Ok(Operation::Create),
            "submit" => Ok(Operation::Submit),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(KubedogError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Create => "create",
            Operation::Submit => "submit",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// Outcome a step declares for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    Succeed,
    Fail,
}

impl FromStr for ExpectedResult {
    type Err = KubedogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "succeed" => Ok(ExpectedResult::Succeed),
            "fail" => Ok(ExpectedResult::Fail),
            other => Err(KubedogError::Config(format!(
                "unsupported expected result '{}', expected succeed or fail",
                other
            ))),
        }
    }
}

impl fmt::Display for ExpectedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedResult::Succeed => f.write_str("succeed"),
            ExpectedResult::Fail => f.write_str("fail"),
        }
    }
}

/// Namespace the resource will be addressed in, after checking that exactly
/// one source declares it. `None` means cluster-scoped or the client default.
pub fn target_namespace<'a>(
    resource: &'a Resource,
    namespace: Option<&'a str>,
) -> Result<Option<&'a str>> {
    let requested = namespace.filter(|ns| !ns.is_empty());
    let declared = resource.namespace();

    if !resource.mapping.namespaced {
        if let Some(ns) = requested.or(declared) {
            return Err(KubedogError::Config(format!(
                "{} is cluster-scoped and cannot be placed in namespace '{}'",
                resource, ns
            )));
        }
        return Ok(None);
    }

    match (declared, requested) {
        (Some(declared), Some(requested)) => Err(KubedogError::Config(format!(
            "ambiguous namespace for {}: manifest declares '{}' and '{}' was requested",
            resource, declared, requested
        ))),
        (declared, requested) => Ok(declared.or(requested)),
    }
}

/// Dynamic API handle for a resource, honouring the namespace rules
pub fn dynamic_api(
    client: &Client,
    resource: &Resource,
    namespace: Option<&str>,
) -> Result<Api<DynamicObject>> {
    let ar = &resource.mapping.resource;
    let target = target_namespace(resource, namespace)?;

    Ok(match (resource.mapping.namespaced, target) {
        (false, _) => Api::all_with(client.clone(), ar),
        (true, Some(ns)) => Api::namespaced_with(client.clone(), ns, ar),
        (true, None) => Api::default_namespaced_with(client.clone(), ar),
    })
}

/// Human readable target, e.g. `ConfigMap team-a/settings`
pub fn describe(resource: &Resource, namespace: Option<&str>) -> String {
    match target_namespace(resource, namespace).ok().flatten() {
        Some(ns) => format!("{} {}/{}", resource.gvk.kind, ns, resource.name()),
        None => format!("{} {}", resource.gvk.kind, resource.name()),
    }
}

pub fn require_client(client: Option<&Client>) -> Result<&Client> {
    client.ok_or_else(|| KubedogError::Config("kubernetes client is not initialized".to_string()))
}

/// Apply an operation to a single resource.
///
/// Creating something that already exists and deleting something that is
/// already gone both count as success.
#[instrument(skip(client, resource), fields(resource = %resource))]
pub async fn apply(
    client: Option<&Client>,
    resource: &Resource,
    operation: Operation,
    namespace: Option<&str>,
) -> Result<()> {
    let client = require_client(client)?;
    let api = dynamic_api(client, resource, namespace)?;
    let target = describe(resource, namespace);
    let api_error = |action: &str, source: kube::Error| KubedogError::Api {
        action: action.to_string(),
        resource: target.clone(),
        source,
    };

    match operation {
        Operation::Create | Operation::Submit => {
            let mut object = resource.object.clone();
            if let Some(ns) = target_namespace(resource, namespace)? {
                object.metadata.namespace = Some(ns.to_string());
            }

            info!("Creating {}", target);
            match api.create(&PostParams::default(), &object).await {
                Ok(_) => {
                    info!("{} created", target);
                    Ok(())
                }
                Err(e) if is_already_exists(&e) => {
                    info!("{} already exists", target);
                    Ok(())
                }
                Err(e) => Err(api_error("create", e)),
            }
        }
        Operation::Update => {
            let current = api
                .get(resource.name())
                .await
                .map_err(|e| api_error("get", e))?;

            let mut object = resource.object.clone();
            object.metadata.namespace = current.metadata.namespace.clone();
            object.metadata.resource_version = current.metadata.resource_version.clone();

            info!("Updating {}", target);
            api.replace(resource.name(), &PostParams::default(), &object)
                .await
                .map_err(|e| api_error("update", e))?;
            info!("{} updated", target);
            Ok(())
        }
        Operation::Delete => {
            info!("Deleting {}", target);
            match api.delete(resource.name(), &DeleteParams::default()).await {
                Ok(_) => {
                    info!("{} deleted", target);
                    Ok(())
                }
                Err(e) if is_not_found(&e) => {
                    info!("{} already deleted", target);
                    Ok(())
                }
                Err(e) => Err(api_error("delete", e)),
            }
        }
    }
}

/// Apply an operation and check its outcome against the declared expectation
#[instrument(skip(client, resource), fields(resource = %resource))]
pub async fn apply_with_expected_result(
    client: Option<&Client>,
    resource: &Resource,
    operation: Operation,
    expected: ExpectedResult,
    namespace: Option<&str>,
) -> Result<()> {
    let outcome = apply(client, resource, operation, namespace).await;

    match (expected, outcome) {
        (ExpectedResult::Succeed, Ok(())) => Ok(()),
        (ExpectedResult::Fail, Err(e)) => {
            warn!("{} of {} failed as expected: {}", operation, resource, e);
            Ok(())
        }
        (ExpectedResult::Succeed, Err(e)) => Err(KubedogError::UnexpectedResult {
            operation: operation.to_string(),
            resource: describe(resource, namespace),
            expected: expected.to_string(),
            actual: format!("failed: {}", e),
        }),
        (ExpectedResult::Fail, Ok(())) => Err(KubedogError::UnexpectedResult {
            operation: operation.to_string(),
            resource: describe(resource, namespace),
            expected: expected.to_string(),
            actual: "succeeded".to_string(),
        }),
    }
}
