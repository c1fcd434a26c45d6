// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::SpecsConfig;
use crate::types::error::{Error, ParseManifestSnafu, ReadManifestSnafu, WriteOutputSnafu};
use crate::types::v1alpha1::cluster::{Cluster, PodRole};
use kube::CustomResourceExt;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::path::Path;
use std::pin::Pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod types;


shadow_rs::shadow!(build);

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

async fn open_output(file: Option<&Path>) -> Result<Pin<Box<dyn AsyncWrite + Send>>, Error> {
    let writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await
                .context(WriteOutputSnafu)?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    Ok(writer)
}

async fn write_output(file: Option<&Path>, content: &str) -> Result<(), Error> {
    let mut writer = open_output(file).await?;
    writer
        .write_all(content.as_bytes())
        .await
        .context(WriteOutputSnafu)?;
    writer.flush().await.context(WriteOutputSnafu)
}

async fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context(ReadManifestSnafu { path })?;

    serde_yaml_ng::from_str(&content).context(ParseManifestSnafu { path })
}

pub async fn load_cluster(path: &Path) -> Result<Cluster, Error> {
    load_yaml(path).await
}

/// Missing path means the built-in defaults
pub async fn load_specs_config(path: Option<&Path>) -> Result<SpecsConfig, Error> {
    match path {
        Some(path) => {
            debug!("loading specs configuration from {}", path.display());
            load_yaml(path).await
        }
        None => Ok(SpecsConfig::default()),
    }
}

pub async fn crd(file: Option<&Path>) -> Result<(), Error> {
    write_output(file, &serde_yaml_ng::to_string(&Cluster::crd())?).await
}

/// Render the Pod of one instance of the cluster described in `cluster_path`
pub async fn pod(
    cluster_path: &Path,
    node_serial: u32,
    role: PodRole,
    namespace: Option<String>,
    config_path: Option<&Path>,
    file: Option<&Path>,
) -> Result<(), Error> {
    let mut cluster = load_cluster(cluster_path).await?;
    if namespace.is_some() {
        cluster.metadata.namespace = namespace;
    }
    let namespace = cluster.namespace()?;

    let specs = load_specs_config(config_path).await?;
    let pod = cluster.new_pod(&specs, node_serial, role);

    info!(
        "rendered {role} pod {} for cluster {namespace}/{}",
        cluster.instance_name(node_serial),
        cluster.name()
    );

    write_output(file, &serde_yaml_ng::to_string(&pod)?).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod lib_tests {
    use super::*;
    use crate::types::v1alpha1::cluster::{is_primary, node_serial};
    use k8s_openapi::api::core::v1 as corev1;
    use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;

    const CLUSTER_MANIFEST: &str = r#"
apiVersion: postgresql.k8s.2ndq.io/v1alpha1
kind: Cluster
metadata:
  name: pg1
  namespace: db
spec:
  instances: 3
  applicationConfiguration:
    database: app
    owner: app
  storage:
    size: 1Gi
"#;

    fn write_manifest(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("Should write manifest");
        path
    }

    fn read_pod(path: &Path) -> corev1::Pod {
        let content = std::fs::read_to_string(path).expect("Should read output");
        serde_yaml_ng::from_str(&content).expect("Output should be a Pod")
    }

    #[tokio::test]
    async fn test_crd_to_file() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let output = dir.path().join("crd.yaml");

        crd(Some(&output)).await.expect("Should write CRD");

        let content = std::fs::read_to_string(&output).expect("Should read output");
        let crd: CustomResourceDefinition =
            serde_yaml_ng::from_str(&content).expect("Output should be a CRD");
        assert_eq!(crd.spec.names.kind, "Cluster");
        assert_eq!(
            crd.spec.names.short_names,
            Some(vec!["pg".to_string()])
        );
    }

    #[tokio::test]
    async fn test_pod_from_manifest() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let cluster = write_manifest(&dir, "cluster.yaml", CLUSTER_MANIFEST);
        let output = dir.path().join("pod.yaml");

        pod(&cluster, 3, PodRole::Primary, None, None, Some(&output))
            .await
            .expect("Should render pod");

        let rendered = read_pod(&output);
        let specs = SpecsConfig::default();
        assert_eq!(rendered.metadata.name.as_deref(), Some("pg1-3"));
        assert_eq!(rendered.metadata.namespace.as_deref(), Some("db"));
        assert_eq!(node_serial(&rendered, &specs), Some(3));
        assert!(is_primary(&rendered, &specs));
        // not stored yet, so nothing to own the pod
        assert!(rendered.metadata.owner_references.is_none());
    }

    #[tokio::test]
    async fn test_pod_with_specs_config_and_namespace_override() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let cluster = write_manifest(&dir, "cluster.yaml", CLUSTER_MANIFEST);
        let config = write_manifest(
            &dir,
            "specs.yaml",
            "serialAnnotationName: example.com/serial\n",
        );
        let output = dir.path().join("pod.yaml");

        pod(
            &cluster,
            2,
            PodRole::Replica,
            Some("staging".to_string()),
            Some(&config),
            Some(&output),
        )
        .await
        .expect("Should render pod");

        let rendered = read_pod(&output);
        assert_eq!(rendered.metadata.namespace.as_deref(), Some("staging"));
        assert_eq!(
            rendered
                .metadata
                .annotations
                .as_ref()
                .and_then(|a| a.get("example.com/serial"))
                .map(String::as_str),
            Some("2")
        );
        assert!(!is_primary(&rendered, &SpecsConfig::default()));
    }

    #[tokio::test]
    async fn test_pod_requires_namespace() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let cluster = write_manifest(
            &dir,
            "cluster.yaml",
            &CLUSTER_MANIFEST.replace("  namespace: db\n", ""),
        );
        let output = dir.path().join("pod.yaml");

        let result = pod(&cluster, 1, PodRole::Primary, None, None, Some(&output)).await;
        assert!(matches!(result, Err(Error::NoNamespace)));
        assert!(!output.exists(), "Nothing should be written on error");
    }

    #[tokio::test]
    async fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().expect("Should create temp dir");

        let missing = dir.path().join("missing.yaml");
        let err = load_cluster(&missing).await.expect_err("Should fail");
        assert!(matches!(err, Error::ReadManifest { .. }));
        assert!(err.to_string().contains("missing.yaml"));

        let broken = write_manifest(&dir, "broken.yaml", "spec: [unterminated");
        let err = load_cluster(&broken).await.expect_err("Should fail");
        assert!(matches!(err, Error::ParseManifest { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[tokio::test]
    async fn test_specs_config_defaults_without_path() {
        let specs = load_specs_config(None).await.expect("Should load defaults");
        assert_eq!(specs, SpecsConfig::default());
    }
}
