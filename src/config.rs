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

//! Labels, paths and ports shared by every generated Pod.
//!
//! The in-container `manager` executable relies on these values, so the
//! defaults must stay stable. A deployment can still override any subset of
//! them from a YAML file, every missing field keeping its default.

use serde::{Deserialize, Serialize};

const OPERATOR_IMAGE_REPOSITORY: &str = "quay.io/2ndquadrant/cloud-native-postgresql-operator";
const DEFAULT_POSTGRES_IMAGE: &str = "quay.io/2ndquadrant/postgres:12";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecsConfig {
    /// Label linking a Pod to its owning cluster
    pub cluster_label_name: String,

    /// Label marking primary Pods
    pub role_label_name: String,

    pub role_label_primary: String,

    /// Annotation holding the node serial
    pub serial_annotation_name: String,

    pub postgres_container_name: String,

    /// Image of the init container staging the manager executable
    pub operator_image: String,

    /// Image used when the cluster doesn't set one
    pub postgres_image: String,

    /// Manager executable inside the operator image
    pub manager_binary: String,

    pub controller_mount_path: String,
    pub pgdata_mount_path: String,
    pub pgdata_subdirectory: String,
    pub config_mount_path: String,
    pub superuser_secret_mount_path: String,
    pub app_secret_mount_path: String,

    pub health_port: i32,
    pub readiness_path: String,
    pub liveness_path: String,
    pub probe_timeout_seconds: i32,

    /// Used when anti-affinity is enabled without a topology key
    pub default_topology_key: String,
    pub anti_affinity_weight: i32,
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            cluster_label_name: "postgresql".to_owned(),
            role_label_name: "role".to_owned(),
            role_label_primary: "primary".to_owned(),
            serial_annotation_name: "k8s.2ndq.io/nodeSerial".to_owned(),
            postgres_container_name: "postgres".to_owned(),
            operator_image: format!("{OPERATOR_IMAGE_REPOSITORY}:{}", crate::build::PKG_VERSION),
            postgres_image: DEFAULT_POSTGRES_IMAGE.to_owned(),
            manager_binary: "/manager".to_owned(),
            controller_mount_path: "/controller".to_owned(),
            pgdata_mount_path: "/var/lib/postgresql/data".to_owned(),
            pgdata_subdirectory: "pgdata".to_owned(),
            config_mount_path: "/etc/configuration".to_owned(),
            superuser_secret_mount_path: "/etc/superuser-secret".to_owned(),
            app_secret_mount_path: "/etc/app-secret".to_owned(),
            health_port: 8000,
            readiness_path: "/readyz".to_owned(),
            liveness_path: "/healthz".to_owned(),
            probe_timeout_seconds: 5,
            default_topology_key: "kubernetes.io/hostname".to_owned(),
            anti_affinity_weight: 100,
        }
    }
}

impl SpecsConfig {
    /// Where the bootstrap init container copies the manager executable
    pub fn manager_path(&self) -> String {
        format!("{}/manager", self.controller_mount_path.trim_end_matches('/'))
    }

    /// Value of PGDATA
    pub fn pgdata(&self) -> String {
        format!(
            "{}/{}",
            self.pgdata_mount_path.trim_end_matches('/'),
            self.pgdata_subdirectory
        )
    }

    pub fn superuser_password_file(&self) -> String {
        format!(
            "{}/password",
            self.superuser_secret_mount_path.trim_end_matches('/')
        )
    }

    pub fn app_password_file(&self) -> String {
        format!("{}/password", self.app_secret_mount_path.trim_end_matches('/'))
    }

    pub fn hba_rules_file(&self) -> String {
        format!("{}/postgresHBA", self.config_mount_path.trim_end_matches('/'))
    }

    pub fn postgresql_config_file(&self) -> String {
        format!(
            "{}/postgresConfiguration",
            self.config_mount_path.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let specs = SpecsConfig::default();
        assert_eq!(specs.pgdata(), "/var/lib/postgresql/data/pgdata");
        assert_eq!(specs.manager_path(), "/controller/manager");
        assert_eq!(
            specs.superuser_password_file(),
            "/etc/superuser-secret/password"
        );
        assert_eq!(specs.app_password_file(), "/etc/app-secret/password");
        assert_eq!(specs.hba_rules_file(), "/etc/configuration/postgresHBA");
        assert_eq!(
            specs.postgresql_config_file(),
            "/etc/configuration/postgresConfiguration"
        );
    }

    #[test]
    fn test_operator_image_tagged_with_crate_version() {
        let specs = SpecsConfig::default();
        assert!(
            specs
                .operator_image
                .ends_with(&format!(":{}", env!("CARGO_PKG_VERSION")))
        );
    }

    // Test: a partial document only overrides the fields it names
    #[test]
    fn test_partial_override_keeps_defaults() {
        let specs: SpecsConfig = serde_yaml_ng::from_str(
            "healthPort: 9187\noperatorImage: registry.local/pg-operator:dev\n",
        )
        .expect("Should parse partial config");

        assert_eq!(specs.health_port, 9187);
        assert_eq!(specs.operator_image, "registry.local/pg-operator:dev");
        assert_eq!(specs.readiness_path, "/readyz");
        assert_eq!(specs.cluster_label_name, "postgresql");
        assert_eq!(specs.anti_affinity_weight, 100);
    }

    #[test]
    fn test_trailing_slash_in_mount_path() {
        let specs = SpecsConfig {
            controller_mount_path: "/controller/".to_owned(),
            ..Default::default()
        };
        assert_eq!(specs.manager_path(), "/controller/manager");
    }
}
