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
use super::credentials::{access_key_id_env_var, secret_access_key_env_var};
use super::volumes::postgres_volume_mounts;
use crate::config::SpecsConfig;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

pub(super) const PGDATA_ENV: &str = "PGDATA";
pub(super) const POD_NAME_ENV: &str = "POD_NAME";
pub(super) const NAMESPACE_ENV: &str = "NAMESPACE";
pub(super) const CLUSTER_NAME_ENV: &str = "CLUSTER_NAME";

pub(super) fn env_var(name: &str, value: impl Into<String>) -> corev1::EnvVar {
    corev1::EnvVar {
        name: name.to_owned(),
        value: Some(value.into()),
        ..Default::default()
    }
}

/// HTTP probe against the instance manager
fn http_probe(specs: &SpecsConfig, path: &str) -> corev1::Probe {
    corev1::Probe {
        timeout_seconds: Some(specs.probe_timeout_seconds),
        http_get: Some(corev1::HTTPGetAction {
            path: Some(path.to_owned()),
            port: IntOrString::Int(specs.health_port),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl Cluster {
    /// The PostgreSQL container, identical for every role
    pub fn new_postgres_container(&self, specs: &SpecsConfig, pod_name: &str) -> corev1::Container {
        let backup = self.spec.backup.as_ref();

        // liveness only: readiness has no grace period
        let mut liveness_probe = http_probe(specs, &specs.liveness_path);
        liveness_probe.initial_delay_seconds = Some(self.max_start_delay());

        corev1::Container {
            name: specs.postgres_container_name.clone(),
            image: Some(self.image_name(specs)),
            env: Some(vec![
                env_var(PGDATA_ENV, specs.pgdata()),
                env_var(POD_NAME_ENV, pod_name),
                env_var(
                    NAMESPACE_ENV,
                    ResourceExt::namespace(self).unwrap_or_default(),
                ),
                env_var(CLUSTER_NAME_ENV, self.name()),
                access_key_id_env_var(backup),
                secret_access_key_env_var(backup),
            ]),
            volume_mounts: Some(postgres_volume_mounts(specs)),
            readiness_probe: Some(http_probe(specs, &specs.readiness_path)),
            liveness_probe: Some(liveness_probe),
            lifecycle: Some(self.new_postgres_lifecycle()),
            command: Some(vec![
                specs.manager_path(),
                "instance".to_owned(),
                "run".to_owned(),
                "-app-db-name".to_owned(),
                self.spec.application_configuration.database.clone(),
            ]),
            resources: self.spec.resources.clone(),
            ..Default::default()
        }
    }

    /// preStop hook running a smart shutdown: sessions are allowed to end
    /// within the configured stop delay
    fn new_postgres_lifecycle(&self) -> corev1::Lifecycle {
        corev1::Lifecycle {
            pre_stop: Some(corev1::LifecycleHandler {
                exec: Some(corev1::ExecAction {
                    command: Some(vec![
                        "pg_ctl".to_owned(),
                        "stop".to_owned(),
                        "-m".to_owned(),
                        "smart".to_owned(),
                        "-t".to_owned(),
                        self.max_stop_delay().to_string(),
                    ]),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
