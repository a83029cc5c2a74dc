// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0
//
// ConfigLoader reads the configuration file once and exposes lazy, cached
// accessors for each section. Contracts are validated only when requested,
// so callers that only need tracing can proceed even if contracts are absent.

use lazy_static::lazy_static;
use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_yaml::{Value, from_str};
use soap_codec::CodecKind;
use soap_tracing::TracingConfiguration;
use tracing::{debug, warn};

use crate::configuration::Configuration;
use crate::errors::ConfigError;
use crate::gateway::{ContractConfig, GatewayConfig};

lazy_static! {
    static ref CONFIG_KEYS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("tracing");
        s.insert("codec");
        s.insert("contracts");
        s
    };
}

pub struct ConfigLoader {
    root: Value,
    tracing: Option<TracingConfiguration>,
    codec: Option<CodecKind>,
    contracts: Option<Vec<ContractConfig>>,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let root_keys = self
            .root
            .as_mapping()
            .map(|m| {
                m.keys()
                    .filter_map(|k| k.as_str())
                    .map(|s| s.to_string())
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();

        f.debug_struct("ConfigLoader")
            .field("root_keys", &root_keys)
            .field("tracing_loaded", &self.tracing.is_some())
            .field("codec", &self.codec)
            .field("contracts_count", &self.contracts.as_ref().map(Vec::len))
            .finish()
    }
}

impl ConfigLoader {
    pub fn new(file_path: &str) -> Result<Self, ConfigError> {
        let config_str =
            std::fs::read_to_string(file_path).map_err(|e| ConfigError::NotFound(e.to_string()))?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let root: Value = from_str(config_str).map_err(|_| ConfigError::InvalidYaml)?;

        // an empty document is a valid, empty configuration
        if !root.is_null() {
            let mapping = root.as_mapping().ok_or(ConfigError::InvalidYaml)?;
            for key in mapping.keys() {
                let k = key.as_str().ok_or(ConfigError::InvalidYaml)?;
                if !CONFIG_KEYS.contains(k) {
                    return Err(ConfigError::InvalidKey(k.to_string()));
                }
            }
        }

        Ok(Self {
            root,
            tracing: None,
            codec: None,
            contracts: None,
        })
    }

    pub fn tracing(&mut self) -> &TracingConfiguration {
        let root = &self.root;
        self.tracing.get_or_insert_with(|| {
            let cfg = section_or_default::<TracingConfiguration>(root, "tracing");
            debug!(?cfg, "Tracing configuration loaded");
            cfg
        })
    }

    /// Default codec kind. An unknown kind is an error: falling back would
    /// silently change the wire encoding of every operation.
    pub fn codec(&mut self) -> Result<CodecKind, ConfigError> {
        if let Some(codec) = self.codec {
            return Ok(codec);
        }

        let codec = match self.root.get("codec") {
            Some(v) => serde_yaml::from_value::<CodecKind>(v.clone()).map_err(|e| {
                debug!(error = ?e, "Codec configuration is invalid");
                e
            })?,
            None => CodecKind::default(),
        };
        debug!(%codec, "Default codec loaded");

        self.codec = Some(codec);
        Ok(codec)
    }

    pub fn contracts(&mut self) -> Result<&[ContractConfig], ConfigError> {
        if self.contracts.is_none() {
            let value = match self.root.get("contracts") {
                Some(v) => v.clone(),
                None => return Err(ConfigError::InvalidNoContracts),
            };

            let contracts: Vec<ContractConfig> = serde_yaml::from_value(value)?;
            if contracts.is_empty() {
                return Err(ConfigError::InvalidNoContracts);
            }

            // same checks as the full gateway configuration
            let gateway = contracts
                .iter()
                .cloned()
                .fold(GatewayConfig::new(), GatewayConfig::with_contract);
            gateway.validate().map_err(|e| {
                debug!(error = ?e, "Contract configuration validation failed");
                e
            })?;

            let names: Vec<_> = contracts.iter().map(|c| c.name().to_string()).collect();
            debug!(count = contracts.len(), ?names, "Contracts configuration loaded");

            self.contracts = Some(contracts);
        }

        Ok(self.contracts.as_deref().unwrap_or_default())
    }

    /// Load every section into a validated gateway configuration
    pub fn gateway(&mut self) -> Result<GatewayConfig, ConfigError> {
        let tracing = self.tracing().clone();
        let codec = self.codec()?;
        let contracts = self.contracts()?.to_vec();

        Ok(contracts.into_iter().fold(
            GatewayConfig::new().with_tracing(tracing).with_codec(codec),
            GatewayConfig::with_contract,
        ))
    }
}

// Invalid optional sections are logged and replaced by their default.
fn section_or_default<T>(root: &Value, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    root.get(key)
        .cloned()
        .map(|v| {
            serde_yaml::from_value(v).unwrap_or_else(|e| {
                warn!(error = ?e, section = key, "invalid configuration section, falling back to default");
                T::default()
            })
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_invalid_tracing_falls_back() {
        let mut loader = ConfigLoader::from_yaml("tracing:\n  level: loud\n").unwrap();

        assert_eq!(loader.tracing(), &TracingConfiguration::default());
        assert!(logs_contain("falling back to default"));
    }

    #[test]
    fn test_invalid_codec_is_an_error() {
        let mut loader = ConfigLoader::from_yaml("codec: xml\n").unwrap();

        assert!(matches!(loader.codec(), Err(ConfigError::YamlError(_))));
        assert!(loader.gateway().is_err());
    }

    #[test]
    fn test_codec_default() {
        let mut loader = ConfigLoader::from_yaml("tracing: {}\n").unwrap();
        assert_eq!(loader.codec().unwrap(), CodecKind::SchemaDriven);
    }

    #[test]
    fn test_unknown_key() {
        let res = ConfigLoader::from_yaml("services: {}\n");
        assert!(matches!(res, Err(ConfigError::InvalidKey(k)) if k == "services"));
    }

    #[test]
    fn test_not_a_mapping() {
        assert!(matches!(
            ConfigLoader::from_yaml("- a\n- b\n"),
            Err(ConfigError::InvalidYaml)
        ));
    }

    #[test]
    fn test_debug_output() {
        let loader = ConfigLoader::from_yaml("codec: annotation_driven\n").unwrap();
        let out = format!("{:?}", loader);
        assert!(out.contains("codec"));
        assert!(out.contains("root_keys"));
    }
}
