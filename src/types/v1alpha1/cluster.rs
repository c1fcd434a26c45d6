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
use crate::types;
use crate::types::error::NoNamespaceSnafu;
use crate::types::v1alpha1::backup::BackupConfiguration;
use crate::types::v1alpha1::storage::StorageConfiguration;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::{CustomResource, KubeSchema, Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

mod affinity;
mod container;
mod credentials;
mod pods;
mod security;
mod volumes;

pub use affinity::new_affinity;
pub use credentials::{access_key_id_env_var, secret_access_key_env_var};
pub use pods::{PodRole, is_primary, node_serial};
pub use security::new_security_context;

const DEFAULT_MAX_START_DELAY: i32 = 30;
const DEFAULT_MAX_STOP_DELAY: i32 = 30;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default)]
#[kube(
    group = "postgresql.k8s.2ndq.io",
    version = "v1alpha1",
    kind = "Cluster",
    namespaced,
    shortname = "pg",
    plural = "clusters",
    singular = "cluster",
    printcolumn = r#"{"name":"Instances", "type":"integer", "jsonPath":".spec.instances"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    #[x_kube(validation = Rule::new("self > 0").message("instances must be greater than 0"))]
    pub instances: i32,

    pub application_configuration: ApplicationConfiguration,

    /// PGDATA lives on ephemeral storage when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfiguration>,

    /// Seconds allowed for an instance to start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_start_delay: Option<i32>,

    /// Seconds allowed for an instance to shut down gracefully
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stop_delay: Option<i32>,

    #[serde(default)]
    pub affinity: AffinityConfiguration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<corev1::ResourceRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupConfiguration>,
}

/// Database created for the application and its owner
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfiguration {
    pub database: String,

    pub owner: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffinityConfiguration {
    /// Prefer scheduling the instances of a cluster on different topology domains
    #[serde(default)]
    pub enable_pod_anti_affinity: bool,

    /// Defaults to the node hostname label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_key: Option<String>,
}

impl Cluster {
    pub fn namespace(&self) -> Result<String, types::error::Error> {
        ResourceExt::namespace(self).context(NoNamespaceSnafu)
    }

    pub fn name(&self) -> String {
        ResourceExt::name_any(self)
    }

    /// Name of the instance with the given serial, also used as its hostname
    /// and as the name of its PersistentVolumeClaim
    pub fn instance_name(&self, node_serial: u32) -> String {
        format!("{}-{node_serial}", self.name())
    }

    pub fn image_name(&self, specs: &SpecsConfig) -> String {
        self.spec
            .image_name
            .clone()
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| specs.postgres_image.clone())
    }

    pub fn image_pull_secret(&self) -> Option<&str> {
        self.spec
            .image_pull_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
    }

    pub fn is_using_persistent_storage(&self) -> bool {
        self.spec.storage.is_some()
    }

    /// Service pointing to the current primary
    pub fn service_read_write_name(&self) -> String {
        format!("{}-rw", self.name())
    }

    /// Headless service covering every instance, ready or not
    pub fn service_any_name(&self) -> String {
        format!("{}-any", self.name())
    }

    pub fn superuser_secret_name(&self) -> String {
        format!("{}-superuser", self.name())
    }

    pub fn application_secret_name(&self) -> String {
        format!("{}-app", self.name())
    }

    pub fn max_start_delay(&self) -> i32 {
        self.spec
            .max_start_delay
            .filter(|delay| *delay > 0)
            .unwrap_or(DEFAULT_MAX_START_DELAY)
    }

    pub fn max_stop_delay(&self) -> i32 {
        self.spec
            .max_stop_delay
            .filter(|delay| *delay > 0)
            .unwrap_or(DEFAULT_MAX_STOP_DELAY)
    }

    /// a new owner reference for cluster
    pub fn new_owner_ref(&self) -> metav1::OwnerReference {
        metav1::OwnerReference {
            api_version: Self::api_version(&()).to_string(),
            kind: Self::kind(&()).to_string(),
            name: self.name(),
            uid: self.meta().uid.clone().unwrap_or_default(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }

    /// Zero or one pull secret, depending on the cluster configuration
    pub fn new_image_pull_secrets(&self) -> Vec<corev1::LocalObjectReference> {
        self.image_pull_secret()
            .map(|name| corev1::LocalObjectReference {
                name: name.to_owned(),
            })
            .into_iter()
            .collect()
    }
}
