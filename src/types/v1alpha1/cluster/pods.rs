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

use super::Cluster;
use super::affinity::new_affinity;
use super::container::{CLUSTER_NAME_ENV, NAMESPACE_ENV, PGDATA_ENV, POD_NAME_ENV, env_var};
use super::security::new_security_context;
use super::volumes::{controller_volume_mount, instance_volume_mounts};
use crate::config::SpecsConfig;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use strum::Display;
use tracing::debug;

const BOOTSTRAP_CONTROLLER_CONTAINER_NAME: &str = "bootstrap-controller";
const BOOTSTRAP_INSTANCE_CONTAINER_NAME: &str = "bootstrap-instance";
const BOOTSTRAP_REPLICA_CONTAINER_NAME: &str = "bootstrap-replica";

/// Lifecycle role of an instance Pod
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, clap::ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum PodRole {
    /// Fresh primary, initializing a new PGDATA
    Primary,

    /// Replica cloning PGDATA from the current primary
    Replica,

    /// Primary restarted on a PGDATA that already exists
    ExistingStorage,
}

impl PodRole {
    pub fn is_primary(self) -> bool {
        !matches!(self, PodRole::Replica)
    }
}

/// Node serial recorded on a Pod built by this module
pub fn node_serial(pod: &corev1::Pod, specs: &SpecsConfig) -> Option<u32> {
    pod.metadata
        .annotations
        .as_ref()?
        .get(&specs.serial_annotation_name)?
        .parse()
        .ok()
}

/// Whether a Pod carries the primary role label
pub fn is_primary(pod: &corev1::Pod, specs: &SpecsConfig) -> bool {
    pod.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(&specs.role_label_name))
        .is_some_and(|role| *role == specs.role_label_primary)
}

/// Stages the manager executable into the controller volume
fn bootstrap_controller_container(specs: &SpecsConfig) -> corev1::Container {
    corev1::Container {
        name: BOOTSTRAP_CONTROLLER_CONTAINER_NAME.to_owned(),
        image: Some(specs.operator_image.clone()),
        command: Some(vec![
            specs.manager_binary.clone(),
            "bootstrap".to_owned(),
            specs.manager_path(),
        ]),
        volume_mounts: Some(vec![controller_volume_mount(specs)]),
        ..Default::default()
    }
}

impl Cluster {
    pub fn new_pod(&self, specs: &SpecsConfig, node_serial: u32, role: PodRole) -> corev1::Pod {
        match role {
            PodRole::Primary => self.new_primary_pod(specs, node_serial),
            PodRole::Replica => self.new_replica_pod(specs, node_serial),
            PodRole::ExistingStorage => self.new_pod_with_existing_storage(specs, node_serial),
        }
    }

    /// a new primary instance, creating the application database and owner
    pub fn new_primary_pod(&self, specs: &SpecsConfig, node_serial: u32) -> corev1::Pod {
        let pod_name = self.instance_name(node_serial);
        let init_containers = vec![
            bootstrap_controller_container(specs),
            self.new_bootstrap_instance_container(specs, &pod_name),
        ];

        self.new_pod_base(specs, node_serial, PodRole::Primary, pod_name, init_containers)
    }

    /// a new replica instance, copying PGDATA from the read-write service
    pub fn new_replica_pod(&self, specs: &SpecsConfig, node_serial: u32) -> corev1::Pod {
        let pod_name = self.instance_name(node_serial);
        let init_containers = vec![
            bootstrap_controller_container(specs),
            self.new_bootstrap_replica_container(specs, &pod_name),
        ];

        self.new_pod_base(specs, node_serial, PodRole::Replica, pod_name, init_containers)
    }

    /// a new primary instance running on an already initialized PGDATA
    pub fn new_pod_with_existing_storage(
        &self,
        specs: &SpecsConfig,
        node_serial: u32,
    ) -> corev1::Pod {
        let pod_name = self.instance_name(node_serial);
        let init_containers = vec![bootstrap_controller_container(specs)];

        self.new_pod_base(
            specs,
            node_serial,
            PodRole::ExistingStorage,
            pod_name,
            init_containers,
        )
    }

    fn new_pod_base(
        &self,
        specs: &SpecsConfig,
        node_serial: u32,
        role: PodRole,
        pod_name: String,
        init_containers: Vec<corev1::Container>,
    ) -> corev1::Pod {
        debug!("building {role} pod {pod_name} for cluster {}", self.name());

        let mut labels = BTreeMap::from([(specs.cluster_label_name.clone(), self.name())]);
        if role.is_primary() {
            labels.insert(
                specs.role_label_name.clone(),
                specs.role_label_primary.clone(),
            );
        }

        let annotations = BTreeMap::from([(
            specs.serial_annotation_name.clone(),
            node_serial.to_string(),
        )]);

        let image_pull_secrets = self.new_image_pull_secrets();

        corev1::Pod {
            metadata: metav1::ObjectMeta {
                name: Some(pod_name.clone()),
                namespace: ResourceExt::namespace(self),
                labels: Some(labels),
                annotations: Some(annotations),
                // the uid only exists once the cluster has been stored
                owner_references: self
                    .meta()
                    .uid
                    .as_ref()
                    .map(|_| vec![self.new_owner_ref()]),
                ..Default::default()
            },
            spec: Some(corev1::PodSpec {
                hostname: Some(pod_name.clone()),
                subdomain: Some(self.service_any_name()),
                init_containers: Some(init_containers),
                containers: vec![self.new_postgres_container(specs, &pod_name)],
                image_pull_secrets: if image_pull_secrets.is_empty() {
                    None
                } else {
                    Some(image_pull_secrets)
                },
                volumes: Some(self.new_postgres_volumes(&pod_name)),
                affinity: new_affinity(specs, &self.name(), &self.spec.affinity),
                security_context: Some(new_security_context()),
                service_account_name: Some(self.name()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn new_bootstrap_instance_container(
        &self,
        specs: &SpecsConfig,
        pod_name: &str,
    ) -> corev1::Container {
        let app = &self.spec.application_configuration;

        corev1::Container {
            name: BOOTSTRAP_INSTANCE_CONTAINER_NAME.to_owned(),
            image: Some(self.image_name(specs)),
            env: Some(vec![
                env_var(PGDATA_ENV, specs.pgdata()),
                env_var(POD_NAME_ENV, pod_name),
                env_var(CLUSTER_NAME_ENV, self.name()),
                env_var(
                    NAMESPACE_ENV,
                    ResourceExt::namespace(self).unwrap_or_default(),
                ),
            ]),
            command: Some(vec![
                specs.manager_path(),
                "instance".to_owned(),
                "init".to_owned(),
                "-pw-file".to_owned(),
                specs.superuser_password_file(),
                "-app-db-name".to_owned(),
                app.database.clone(),
                "-app-user".to_owned(),
                app.owner.clone(),
                "-app-pw-file".to_owned(),
                specs.app_password_file(),
                "-hba-rules-file".to_owned(),
                specs.hba_rules_file(),
                "-postgresql-config-file".to_owned(),
                specs.postgresql_config_file(),
                "-parent-node".to_owned(),
                self.service_read_write_name(),
            ]),
            volume_mounts: Some(instance_volume_mounts(specs)),
            ..Default::default()
        }
    }

    fn new_bootstrap_replica_container(
        &self,
        specs: &SpecsConfig,
        pod_name: &str,
    ) -> corev1::Container {
        corev1::Container {
            name: BOOTSTRAP_REPLICA_CONTAINER_NAME.to_owned(),
            image: Some(self.image_name(specs)),
            env: Some(vec![
                env_var(PGDATA_ENV, specs.pgdata()),
                env_var(POD_NAME_ENV, pod_name),
            ]),
            command: Some(vec![
                specs.manager_path(),
                "instance".to_owned(),
                "join".to_owned(),
                "-parent-node".to_owned(),
                self.service_read_write_name(),
            ]),
            volume_mounts: Some(instance_volume_mounts(specs)),
            ..Default::default()
        }
    }
}
