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

use k8s_openapi::api::core::v1 as corev1;

// uid and gid of the postgres user in the PostgreSQL images.
// Not derived from the configured image.
const POSTGRES_USER: i64 = 26;
const POSTGRES_GROUP: i64 = 26;

/// Non-root identity shared by every container of an instance
pub fn new_security_context() -> corev1::PodSecurityContext {
    corev1::PodSecurityContext {
        run_as_user: Some(POSTGRES_USER),
        run_as_group: Some(POSTGRES_GROUP),
        fs_group: Some(POSTGRES_GROUP),
        ..Default::default()
    }
}
