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
use crate::config::SpecsConfig;
use k8s_openapi::api::core::v1 as corev1;

pub(super) const PGDATA_VOLUME_NAME: &str = "pgdata";
pub(super) const CONFIG_VOLUME_NAME: &str = "config";
pub(super) const SUPERUSER_SECRET_VOLUME_NAME: &str = "superuser-secret";
pub(super) const APP_SECRET_VOLUME_NAME: &str = "app-secret";
pub(super) const CONTROLLER_VOLUME_NAME: &str = "controller";

fn volume_mount(name: &str, mount_path: &str) -> corev1::VolumeMount {
    corev1::VolumeMount {
        name: name.to_owned(),
        mount_path: mount_path.to_owned(),
        ..Default::default()
    }
}

/// Mount of the scratch volume receiving the manager executable
pub(super) fn controller_volume_mount(specs: &SpecsConfig) -> corev1::VolumeMount {
    volume_mount(CONTROLLER_VOLUME_NAME, &specs.controller_mount_path)
}

/// Mounts of the PostgreSQL container: data and manager
pub(super) fn postgres_volume_mounts(specs: &SpecsConfig) -> Vec<corev1::VolumeMount> {
    vec![
        volume_mount(PGDATA_VOLUME_NAME, &specs.pgdata_mount_path),
        controller_volume_mount(specs),
    ]
}

/// Mounts of the init containers preparing PGDATA: every pod volume
pub(super) fn instance_volume_mounts(specs: &SpecsConfig) -> Vec<corev1::VolumeMount> {
    vec![
        volume_mount(PGDATA_VOLUME_NAME, &specs.pgdata_mount_path),
        volume_mount(CONFIG_VOLUME_NAME, &specs.config_mount_path),
        volume_mount(
            SUPERUSER_SECRET_VOLUME_NAME,
            &specs.superuser_secret_mount_path,
        ),
        volume_mount(APP_SECRET_VOLUME_NAME, &specs.app_secret_mount_path),
        controller_volume_mount(specs),
    ]
}

impl Cluster {
    /// The five volumes of an instance, in the same order for every role
    pub fn new_postgres_volumes(&self, pod_name: &str) -> Vec<corev1::Volume> {
        vec![
            self.new_pgdata_volume(pod_name),
            corev1::Volume {
                name: CONFIG_VOLUME_NAME.to_owned(),
                config_map: Some(corev1::ConfigMapVolumeSource {
                    name: self.name(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            corev1::Volume {
                name: SUPERUSER_SECRET_VOLUME_NAME.to_owned(),
                secret: Some(corev1::SecretVolumeSource {
                    secret_name: Some(self.superuser_secret_name()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            corev1::Volume {
                name: APP_SECRET_VOLUME_NAME.to_owned(),
                secret: Some(corev1::SecretVolumeSource {
                    secret_name: Some(self.application_secret_name()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            corev1::Volume {
                name: CONTROLLER_VOLUME_NAME.to_owned(),
                empty_dir: Some(corev1::EmptyDirVolumeSource::default()),
                ..Default::default()
            },
        ]
    }

    /// PGDATA volume: the PVC named after the instance with persistent
    /// storage, an emptyDir otherwise
    pub fn new_pgdata_volume(&self, pod_name: &str) -> corev1::Volume {
        if self.is_using_persistent_storage() {
            corev1::Volume {
                name: PGDATA_VOLUME_NAME.to_owned(),
                persistent_volume_claim: Some(corev1::PersistentVolumeClaimVolumeSource {
                    claim_name: pod_name.to_owned(),
                    ..Default::default()
                }),
                ..Default::default()
            }
        } else {
            corev1::Volume {
                name: PGDATA_VOLUME_NAME.to_owned(),
                empty_dir: Some(corev1::EmptyDirVolumeSource::default()),
                ..Default::default()
            }
        }
    }
}
