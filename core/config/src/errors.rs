// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    // File / I/O
    #[error("not found: {0}")]
    NotFound(String),

    // Parsing / structural validity
    #[error("invalid configuration - impossible to parse yaml")]
    InvalidYaml,
    #[error("invalid configuration - key {0} not valid")]
    InvalidKey(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("yaml parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    // Contracts
    #[error("invalid configuration - missing contracts")]
    InvalidNoContracts,
    #[error("duplicate contract {{{namespace}}}{name}")]
    DuplicateContract { namespace: String, name: String },
}
