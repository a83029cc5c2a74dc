// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod configuration;
pub mod errors;
pub mod gateway;
pub mod loader;

pub use configuration::Configuration;
pub use errors::ConfigError;
pub use gateway::{ContractConfig, GatewayConfig};
pub use loader::ConfigLoader;
