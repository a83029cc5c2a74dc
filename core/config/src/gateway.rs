// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use soap_codec::CodecKind;
use soap_description::{ContractDescription, OperationContract, ServiceDescriptionBuilder};
use soap_tracing::TracingConfiguration;

use crate::configuration::Configuration;
use crate::errors::ConfigError;

/// Contract declared in configuration, with operation metadata keyed by
/// method name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    namespace: String,
    name: String,

    #[serde(default)]
    operations: HashMap<String, OperationContract>,
}

impl ContractConfig {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ContractConfig {
            namespace: namespace.into(),
            name: name.into(),
            operations: HashMap::new(),
        }
    }

    pub fn with_operation(mut self, method: impl Into<String>, metadata: OperationContract) -> Self {
        self.operations.insert(method.into(), metadata);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &HashMap<String, OperationContract> {
        &self.operations
    }

    pub fn contract(&self) -> ContractDescription {
        ContractDescription::new(self.namespace.as_str(), self.name.as_str())
    }

    /// Service builder for this contract, carrying the declared operation
    /// metadata and the given default codec
    pub fn service_builder(&self, default_codec: CodecKind) -> ServiceDescriptionBuilder {
        ServiceDescriptionBuilder::new(self.contract())
            .with_overrides(self.operations.clone())
            .with_default_codec(default_codec)
    }
}

impl Configuration for ContractConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.namespace.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "contract {}: empty namespace",
                self.name
            )));
        }
        if self.name.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "contract in {}: empty name",
                self.namespace
            )));
        }

        for (method, metadata) in &self.operations {
            if method.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "contract {}: empty method name",
                    self.name
                )));
            }
            if metadata.action().is_some_and(str::is_empty) {
                return Err(ConfigError::Invalid(format!(
                    "contract {}: empty action for method {}",
                    self.name, method
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    tracing: TracingConfiguration,

    /// Codec for operations that do not choose one
    #[serde(default)]
    codec: CodecKind,

    #[serde(default)]
    contracts: Vec<ContractConfig>,
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracing(self, tracing: TracingConfiguration) -> Self {
        GatewayConfig { tracing, ..self }
    }

    pub fn with_codec(self, codec: CodecKind) -> Self {
        GatewayConfig { codec, ..self }
    }

    pub fn with_contract(mut self, contract: ContractConfig) -> Self {
        self.contracts.push(contract);
        self
    }

    pub fn tracing(&self) -> &TracingConfiguration {
        &self.tracing
    }

    pub fn codec(&self) -> CodecKind {
        self.codec
    }

    pub fn contracts(&self) -> &[ContractConfig] {
        &self.contracts
    }

    pub fn contract(&self, namespace: &str, name: &str) -> Option<&ContractConfig> {
        self.contracts
            .iter()
            .find(|c| c.namespace == namespace && c.name == name)
    }

    /// Service builder for a declared contract, using the gateway codec
    pub fn service_builder(&self, namespace: &str, name: &str) -> Option<ServiceDescriptionBuilder> {
        self.contract(namespace, name)
            .map(|c| c.service_builder(self.codec))
    }
}

impl Configuration for GatewayConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        let mut seen = HashSet::new();
        for contract in &self.contracts {
            contract.validate()?;
            if !seen.insert((contract.namespace(), contract.name())) {
                return Err(ConfigError::DuplicateContract {
                    namespace: contract.namespace.clone(),
                    name: contract.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING_NS: &str = "http://example.org/PingService";

    #[test]
    fn test_validate() {
        let config = GatewayConfig::new()
            .with_contract(ContractConfig::new(PING_NS, "IPingService"))
            .with_contract(ContractConfig::new(PING_NS, "IOther"));
        assert!(config.validate().is_ok());

        let config = config.with_contract(ContractConfig::new(PING_NS, "IPingService"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateContract { .. })
        ));
    }

    #[test]
    fn test_validate_contract() {
        assert!(ContractConfig::new("", "IPing").validate().is_err());
        assert!(ContractConfig::new(PING_NS, "").validate().is_err());

        let contract = ContractConfig::new(PING_NS, "IPing")
            .with_operation("Echo", OperationContract::new().with_action(""));
        assert!(matches!(contract.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_lookup() {
        let config = GatewayConfig::new()
            .with_codec(CodecKind::AnnotationDriven)
            .with_contract(ContractConfig::new(PING_NS, "IPingService"));

        assert!(config.contract(PING_NS, "IPingService").is_some());
        assert!(config.contract(PING_NS, "IMissing").is_none());
        assert!(config.service_builder(PING_NS, "IPingService").is_some());
        assert_eq!(
            config.contracts()[0].contract(),
            ContractDescription::new(PING_NS, "IPingService")
        );
    }
}
