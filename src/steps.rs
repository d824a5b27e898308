// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Step handlers exposed to the BDD runner.
//!
//! Each handler takes the raw strings captured from a step phrase, resolves
//! the manifest name against the configured files path and runs to completion.

use crate::config::{Config, WaiterConfig};
use crate::error::{KubedogError, Result};
use crate::kubernetes::discovery::CachedDiscovery;
use crate::kubernetes::unstructured::{object_content, set_nested_field, split_path};
use crate::manifest::{load_resource, load_resources, Resource};
use crate::resources::{
    apply, apply_all, apply_with_expected_result, delete_all_at_path, describe, dynamic_api,
    require_client, ExpectedResult, Operation,
};
use crate::waiter::{wait_for, FieldSelector, Predicate};
use kube::{api::PostParams, core::DynamicObject, Client};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// Clients and settings shared by every step of a scenario
pub struct ClientSet {
    client: Option<Client>,
    discovery: Option<CachedDiscovery>,
    config: Config,
    template_args: Option<Value>,
}

impl ClientSet {
    /// Connect using the ambient kubeconfig or in-cluster configuration
    pub async fn connect(config: Config) -> Result<Self> {
        let client = Client::try_default().await?;
        info!("Connected to Kubernetes cluster");
        Ok(Self::new(client, config))
    }

    pub fn new(client: Client, config: Config) -> Self {
        Self {
            discovery: Some(CachedDiscovery::new(client.clone())),
            client: Some(client),
            config,
            template_args: None,
        }
    }

    /// A client set with no cluster behind it; every API step fails with a configuration error
    pub fn unconnected(config: Config) -> Self {
        Self {
            client: None,
            discovery: None,
            config,
            template_args: None,
        }
    }

    pub fn with_files_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.files_path = path.into();
        self
    }

    pub fn with_waiter_interval(mut self, interval: Duration) -> Self {
        self.config.waiter = WaiterConfig::new(Some(self.config.waiter.tries()), Some(interval));
        self
    }

    pub fn with_waiter_tries(mut self, tries: u32) -> Self {
        self.config.waiter = WaiterConfig::new(Some(tries), Some(self.config.waiter.interval()));
        self
    }

    /// Arguments every manifest is rendered against
    pub fn with_template_arguments<T: Serialize>(mut self, args: &T) -> Result<Self> {
        let args = serde_json::to_value(args).map_err(|e| {
            KubedogError::Config(format!("template arguments are not serializable: {}", e))
        })?;
        self.template_args = Some(args);
        Ok(self)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn manifest_path(&self, manifest: &str) -> PathBuf {
        self.config.files_path.join(manifest)
    }

    async fn load(&self, manifest: &str) -> Result<Resource> {
        load_resource(
            &self.manifest_path(manifest),
            self.template_args.as_ref(),
            self.discovery.as_ref(),
        )
        .await
    }

    async fn load_all(&self, manifest: &str) -> Result<Vec<Resource>> {
        load_resources(
            &self.manifest_path(manifest),
            self.template_args.as_ref(),
            self.discovery.as_ref(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn resource_operation(&self, operation: &str, manifest: &str) -> Result<()> {
        self.resource_operation_in_namespace(operation, manifest, "").await
    }

    #[instrument(skip(self))]
    pub async fn resource_operation_in_namespace(
        &self,
        operation: &str,
        manifest: &str,
        namespace: &str,
    ) -> Result<()> {
        let operation: Operation = operation.parse()?;
        let resource = self.load(manifest).await?;
        apply(self.client.as_ref(), &resource, operation, Some(namespace)).await
    }

    #[instrument(skip(self))]
    pub async fn multi_resource_operation(&self, operation: &str, manifest: &str) -> Result<()> {
        self.multi_resource_operation_in_namespace(operation, manifest, "").await
    }

    #[instrument(skip(self))]
    pub async fn multi_resource_operation_in_namespace(
        &self,
        operation: &str,
        manifest: &str,
        namespace: &str,
    ) -> Result<()> {
        let operation: Operation = operation.parse()?;
        let resources = self.load_all(manifest).await?;
        apply_all(self.client.as_ref(), &resources, operation, Some(namespace)).await
    }

    #[instrument(skip(self))]
    pub async fn resource_operation_with_result(
        &self,
        operation: &str,
        manifest: &str,
        expected: &str,
    ) -> Result<()> {
        self.resource_operation_with_result_in_namespace(operation, manifest, "", expected)
            .await
    }

    #[instrument(skip(self))]
    pub async fn resource_operation_with_result_in_namespace(
        &self,
        operation: &str,
        manifest: &str,
        namespace: &str,
        expected: &str,
    ) -> Result<()> {
        let operation: Operation = operation.parse()?;
        let expected: ExpectedResult = expected.parse()?;
        let resource = self.load(manifest).await?;
        apply_with_expected_result(
            self.client.as_ref(),
            &resource,
            operation,
            expected,
            Some(namespace),
        )
        .await
    }

    /// Wait until the resource is `created` or `deleted`
    #[instrument(skip(self))]
    pub async fn resource_should_be(&self, manifest: &str, state: &str) -> Result<()> {
        let predicate = Predicate::from_state(state)?;
        self.wait_for_resource(manifest, predicate).await
    }

    /// Wait until a field of the live resource matches a `.path=value` selector
    #[instrument(skip(self))]
    pub async fn resource_should_converge_to_selector(
        &self,
        manifest: &str,
        selector: &str,
    ) -> Result<()> {
        let selector: FieldSelector = selector.parse()?;
        self.wait_for_resource(manifest, Predicate::Selector(selector))
            .await
    }

    #[instrument(skip(self))]
    pub async fn resource_condition_should_be(
        &self,
        manifest: &str,
        condition_type: &str,
        value: &str,
    ) -> Result<()> {
        let predicate = Predicate::Condition {
            condition_type: condition_type.to_string(),
            status: value.to_string(),
        };
        self.wait_for_resource(manifest, predicate).await
    }

    async fn wait_for_resource(&self, manifest: &str, predicate: Predicate) -> Result<()> {
        let resource = self.load(manifest).await?;
        let client = require_client(self.client.as_ref())?;
        let api = dynamic_api(client, &resource, None)?;

        wait_for(
            &api,
            resource.name(),
            &describe(&resource, None),
            &self.config.waiter,
            &predicate,
        )
        .await
    }

    /// Set one field on the live resource. Integer-looking values are written as integers.
    #[instrument(skip(self))]
    pub async fn update_resource_with_field(
        &self,
        manifest: &str,
        field_path: &str,
        value: &str,
    ) -> Result<()> {
        let path = split_path(field_path);
        if path.is_empty() {
            return Err(KubedogError::InvalidField {
                path: field_path.to_string(),
                message: "field path is empty".to_string(),
            });
        }
        let new_value = value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(value));

        let resource = self.load(manifest).await?;
        let client = require_client(self.client.as_ref())?;
        let api = dynamic_api(client, &resource, None)?;
        let target = describe(&resource, None);
        let api_error = |action: &str, source: kube::Error| KubedogError::Api {
            action: action.to_string(),
            resource: target.clone(),
            source,
        };

        let live = api
            .get(resource.name())
            .await
            .map_err(|e| api_error("get", e))?;
        let mut content = object_content(&live)?;
        set_nested_field(&mut content, &path, new_value)?;
        let updated: DynamicObject =
            serde_json::from_value(content).map_err(|e| KubedogError::InvalidField {
                path: field_path.to_string(),
                message: e.to_string(),
            })?;

        info!("Setting {} on {}", field_path, target);
        api.replace(resource.name(), &PostParams::default(), &updated)
            .await
            .map_err(|e| api_error("update", e))?;
        Ok(())
    }

    /// Delete everything declared under the files path
    #[instrument(skip(self))]
    pub async fn delete_all_test_resources(&self) -> Result<()> {
        delete_all_at_path(
            self.client.as_ref(),
            self.discovery.as_ref(),
            &self.config.files_path,
            self.template_args.as_ref(),
        )
        .await
    }
}
