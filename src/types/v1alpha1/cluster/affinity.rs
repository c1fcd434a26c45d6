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

use super::AffinityConfiguration;
use crate::config::SpecsConfig;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

/// Pod anti-affinity keeping the instances of a cluster apart.
///
/// Returns `None` unless enabled in the cluster. The rule is only preferred,
/// so instances stay schedulable when there are fewer topology domains than
/// instances.
pub fn new_affinity(
    specs: &SpecsConfig,
    cluster_name: &str,
    config: &AffinityConfiguration,
) -> Option<corev1::Affinity> {
    if !config.enable_pod_anti_affinity {
        return None;
    }

    let topology_key = config
        .topology_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .unwrap_or(&specs.default_topology_key)
        .to_owned();

    Some(corev1::Affinity {
        pod_anti_affinity: Some(corev1::PodAntiAffinity {
            preferred_during_scheduling_ignored_during_execution: Some(vec![
                corev1::WeightedPodAffinityTerm {
                    weight: specs.anti_affinity_weight,
                    pod_affinity_term: corev1::PodAffinityTerm {
                        label_selector: Some(metav1::LabelSelector {
                            match_expressions: Some(vec![metav1::LabelSelectorRequirement {
                                key: specs.cluster_label_name.clone(),
                                operator: "In".to_owned(),
                                values: Some(vec![cluster_name.to_owned()]),
                            }]),
                            ..Default::default()
                        }),
                        topology_key,
                        ..Default::default()
                    },
                },
            ]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn preferred_term(affinity: corev1::Affinity) -> corev1::WeightedPodAffinityTerm {
        let terms = affinity
            .pod_anti_affinity
            .expect("Should have pod anti-affinity")
            .preferred_during_scheduling_ignored_during_execution
            .expect("Should be a preferred rule");
        assert_eq!(terms.len(), 1);
        terms.into_iter().next().expect("Should have one term")
    }

    #[test]
    fn test_disabled_by_default() {
        let specs = SpecsConfig::default();
        assert!(new_affinity(&specs, "pg1", &AffinityConfiguration::default()).is_none());

        // a topology key alone doesn't enable anything
        let config = AffinityConfiguration {
            enable_pod_anti_affinity: false,
            topology_key: Some("topology.kubernetes.io/zone".to_owned()),
        };
        assert!(new_affinity(&specs, "pg1", &config).is_none());
    }

    // Test: enabled without a key falls back to the hostname label
    #[test]
    fn test_default_topology_key() {
        let specs = SpecsConfig::default();
        for topology_key in [None, Some(String::new())] {
            let config = AffinityConfiguration {
                enable_pod_anti_affinity: true,
                topology_key,
            };
            let term = preferred_term(
                new_affinity(&specs, "pg1", &config).expect("Should have affinity"),
            );

            assert_eq!(term.weight, 100);
            assert_eq!(term.pod_affinity_term.topology_key, "kubernetes.io/hostname");
        }
    }

    #[test]
    fn test_explicit_topology_key() {
        let specs = SpecsConfig::default();
        let config = AffinityConfiguration {
            enable_pod_anti_affinity: true,
            topology_key: Some("topology.kubernetes.io/zone".to_owned()),
        };
        let term =
            preferred_term(new_affinity(&specs, "pg1", &config).expect("Should have affinity"));

        assert_eq!(term.weight, 100);
        assert_eq!(
            term.pod_affinity_term.topology_key,
            "topology.kubernetes.io/zone"
        );
    }

    #[test]
    fn test_selects_cluster_members() {
        let specs = SpecsConfig::default();
        let config = AffinityConfiguration {
            enable_pod_anti_affinity: true,
            topology_key: None,
        };
        let affinity = new_affinity(&specs, "pg1", &config).expect("Should have affinity");
        assert!(
            affinity
                .pod_anti_affinity
                .as_ref()
                .and_then(|a| a.required_during_scheduling_ignored_during_execution.as_ref())
                .is_none(),
            "Anti-affinity should never be required"
        );

        let expressions = preferred_term(affinity)
            .pod_affinity_term
            .label_selector
            .and_then(|selector| selector.match_expressions)
            .expect("Should match on expressions");

        assert_eq!(
            expressions,
            vec![metav1::LabelSelectorRequirement {
                key: "postgresql".to_owned(),
                operator: "In".to_owned(),
                values: Some(vec!["pg1".to_owned()]),
            }]
        );
    }
}
