// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Namespace and name of a service contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ContractDescription {
    namespace: String,
    name: String,
}

impl ContractDescription {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ContractDescription {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Action used when an operation does not declare one:
    /// `{namespace without trailing slashes}/{contract}/{operation}`
    pub fn default_action(&self, operation: &str) -> String {
        format!(
            "{}/{}/{}",
            self.namespace.trim_end_matches('/'),
            self.name,
            operation
        )
    }
}
