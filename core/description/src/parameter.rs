// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use crate::contract::ContractDescription;
use crate::metadata::ParameterContract;

/// A method parameter paired with its resolved wire name and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    name: String,
    namespace: String,
    position: usize,
    parameter: ParameterContract,
}

impl ParameterBinding {
    /// Resolve the wire identity of the parameter declared at `position`.
    ///
    /// Name: element name override, then message name override, then the
    /// declared name. Namespace: element namespace override, then the
    /// contract namespace.
    pub fn resolve(
        contract: &ContractDescription,
        position: usize,
        parameter: ParameterContract,
    ) -> Self {
        let name = parameter
            .element_name()
            .or(parameter.message_name())
            .unwrap_or(parameter.name())
            .to_string();
        let namespace = parameter
            .element_namespace()
            .unwrap_or(contract.namespace())
            .to_string();

        ParameterBinding {
            name,
            namespace,
            position,
            parameter,
        }
    }

    /// Wire element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire element namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Position in the declared parameter list
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn parameter(&self) -> &ParameterContract {
        &self.parameter
    }
}
