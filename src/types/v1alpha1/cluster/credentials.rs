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

use crate::types::v1alpha1::backup::BackupConfiguration;
use k8s_openapi::api::core::v1 as corev1;

pub(super) const ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub(super) const SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// AWS_ACCESS_KEY_ID, read from the backup credentials secret.
///
/// Without a backup configuration the variable is still declared, with an
/// empty value.
pub fn access_key_id_env_var(backup: Option<&BackupConfiguration>) -> corev1::EnvVar {
    credential_env_var(
        ACCESS_KEY_ID_ENV,
        backup.map(|b| &b.s3_credentials.access_key_id),
    )
}

/// AWS_SECRET_ACCESS_KEY, same rules as [`access_key_id_env_var`]
pub fn secret_access_key_env_var(backup: Option<&BackupConfiguration>) -> corev1::EnvVar {
    credential_env_var(
        SECRET_ACCESS_KEY_ENV,
        backup.map(|b| &b.s3_credentials.secret_access_key),
    )
}

fn credential_env_var(name: &str, selector: Option<&corev1::SecretKeySelector>) -> corev1::EnvVar {
    match selector {
        None => corev1::EnvVar {
            name: name.to_owned(),
            value: Some(String::new()),
            ..Default::default()
        },
        Some(selector) => corev1::EnvVar {
            name: name.to_owned(),
            value_from: Some(corev1::EnvVarSource {
                secret_key_ref: Some(selector.clone()),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_without_backup() {
        for env in [
            access_key_id_env_var(None),
            secret_access_key_env_var(None),
        ] {
            assert_eq!(env.value, Some(String::new()));
            assert!(env.value_from.is_none());
        }
        assert_eq!(access_key_id_env_var(None).name, "AWS_ACCESS_KEY_ID");
        assert_eq!(secret_access_key_env_var(None).name, "AWS_SECRET_ACCESS_KEY");
    }

    #[test]
    fn test_secret_references_with_backup() {
        let backup = crate::tests::create_test_backup();

        let access_key = access_key_id_env_var(Some(&backup));
        assert_eq!(access_key.name, "AWS_ACCESS_KEY_ID");
        assert!(access_key.value.is_none(), "Should never carry a literal");
        assert_eq!(
            access_key
                .value_from
                .and_then(|source| source.secret_key_ref)
                .expect("Should reference a secret key"),
            backup.s3_credentials.access_key_id
        );

        let secret_key = secret_access_key_env_var(Some(&backup));
        assert_eq!(secret_key.name, "AWS_SECRET_ACCESS_KEY");
        assert!(secret_key.value.is_none(), "Should never carry a literal");
        assert_eq!(
            secret_key
                .value_from
                .and_then(|source| source.secret_key_ref)
                .expect("Should reference a secret key"),
            backup.s3_credentials.secret_access_key
        );
    }
}
