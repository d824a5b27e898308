// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operations over every document of a multi-resource manifest

use crate::constants::MANIFEST_EXTENSIONS;
use crate::error::{KubedogError, Result};
use crate::kubernetes::discovery::CachedDiscovery;
use crate::manifest::{load_resources, Resource};
use crate::resources::operator::{apply, Operation};
use kube::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

/// Apply the same operation to each resource in order, stopping at the first failure
#[instrument(skip(client, resources), fields(count = resources.len()))]
pub async fn apply_all(
    client: Option<&Client>,
    resources: &[Resource],
    operation: Operation,
    namespace: Option<&str>,
) -> Result<()> {
    for resource in resources {
        apply(client, resource, operation, namespace).await?;
    }
    Ok(())
}

/// Delete every resource declared by the manifests at a path.
///
/// A directory is walked recursively in sorted order. Resources that are
/// already gone are skipped.
#[instrument(skip(client, args, discovery))]
pub async fn delete_all_at_path(
    client: Option<&Client>,
    discovery: Option<&CachedDiscovery>,
    path: &Path,
    args: Option<&Value>,
) -> Result<()> {
    let manifests = manifest_files(path)?;
    info!("Deleting resources from {} manifests", manifests.len());

    for manifest in manifests {
        let resources = load_resources(&manifest, args, discovery).await?;
        apply_all(client, &resources, Operation::Delete, None).await?;
    }
    Ok(())
}

/// Manifest files at a path: the path itself, or every manifest below a
/// directory in depth-first, name-sorted order
pub fn manifest_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| KubedogError::Io {
            path: e.path().unwrap_or(path).to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.depth() == 0 || is_manifest(entry.path()) {
            files.push(entry.into_path());
        } else {
            debug!("Skipping {}", entry.path().display());
        }
    }
    Ok(files)
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        api_resource_list_json, config_map, configmap_json, not_found_json, status_json,
        MockService,
    };
    use serde_json::json;
    use std::fs;

    const CM_COLLECTION: &str = "/api/v1/namespaces/default/configmaps";

    #[tokio::test]
    async fn test_apply_all_in_order() {
        let mock = MockService::new().on_post(CM_COLLECTION, 201, &configmap_json("x", "default", json!({})));
        let client = mock.clone().into_client();
        let resources = vec![config_map("a", None), config_map("b", None), config_map("c", None)];

        apply_all(Some(&client), &resources, Operation::Create, None)
            .await
            .unwrap();

        assert_eq!(mock.count("POST", CM_COLLECTION), 3);
    }

    #[tokio::test]
    async fn test_apply_all_stops_at_first_failure() {
        let mock = MockService::new()
            .on_post(CM_COLLECTION, 201, &configmap_json("a", "default", json!({})))
            .on_post(CM_COLLECTION, 422, &status_json(422, "Invalid", "second is invalid"))
            .on_post(CM_COLLECTION, 201, &configmap_json("c", "default", json!({})));
        let client = mock.clone().into_client();
        let resources = vec![config_map("a", None), config_map("b", None), config_map("c", None)];

        let err = apply_all(Some(&client), &resources, Operation::Create, None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ConfigMap b"));
        assert_eq!(mock.count("POST", CM_COLLECTION), 2);
    }

    #[tokio::test]
    async fn test_apply_all_namespace_conflict_stops_batch() {
        let mock = MockService::new().on_post(
            "/api/v1/namespaces/team-a/configmaps",
            201,
            &configmap_json("a", "team-a", json!({})),
        );
        let client = mock.clone().into_client();
        let resources = vec![config_map("a", None), config_map("b", Some("team-b"))];

        let err = apply_all(Some(&client), &resources, Operation::Create, Some("team-a"))
            .await
            .unwrap_err();

        assert!(matches!(err, KubedogError::Config(_)));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_manifest_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.yaml"), "").unwrap();
        fs::write(dir.path().join("a.yml"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();
        fs::write(dir.path().join("nested/c.yaml"), "").unwrap();

        let files = manifest_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.yml"),
                PathBuf::from("b.yaml"),
                PathBuf::from("nested/c.yaml"),
            ]
        );
    }

    #[test]
    fn test_manifest_files_single_file_is_taken_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("cluster.tmpl");
        fs::write(&manifest, "").unwrap();

        assert_eq!(manifest_files(&manifest).unwrap(), vec![manifest]);
    }

    #[test]
    fn test_manifest_files_missing_path() {
        let err = manifest_files(Path::new("/nonexistent/templates")).unwrap_err();
        assert!(matches!(err, KubedogError::Io { .. }));
    }

    #[tokio::test]
    async fn test_delete_all_at_path_tolerates_missing_resources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("configmaps.yaml"),
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: one\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: two\n",
        )
        .unwrap();

        let mock = MockService::new()
            .on_get("/api/v1", 200, &api_resource_list_json("v1"))
            .on_delete(&format!("{}/one", CM_COLLECTION), 200, &configmap_json("one", "default", json!({})))
            .on_delete(&format!("{}/two", CM_COLLECTION), 404, &not_found_json("configmaps", "two"));
        let client = mock.clone().into_client();
        let discovery = CachedDiscovery::new(client.clone());

        delete_all_at_path(Some(&client), Some(&discovery), dir.path(), None)
            .await
            .unwrap();

        assert_eq!(mock.count_method("DELETE"), 2);
    }
}
