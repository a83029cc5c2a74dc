// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration of the gateway.
//!
//! The `tracing` section sets one threshold for everything plus optional
//! per-target thresholds, so that for example codec construction can be
//! traced without the rest of the gateway:
//!
//! ```yaml
//! tracing:
//!   level: warn
//!   targets:
//!     soap_codec: trace
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;

pub type SetupError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // directive syntax is lowercase
        write!(f, "{}", Level::from(*self).as_str().to_lowercase())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfiguration {
    #[serde(default)]
    level: LogLevel,

    /// Thresholds by target (module path prefix), overriding `level`
    #[serde(default)]
    targets: BTreeMap<String, LogLevel>,

    #[serde(default)]
    ansi: bool,

    #[serde(default = "show_target_default")]
    show_target: bool,
}

fn show_target_default() -> bool {
    true
}

impl Default for TracingConfiguration {
    fn default() -> Self {
        TracingConfiguration {
            level: LogLevel::default(),
            targets: BTreeMap::new(),
            ansi: false,
            show_target: show_target_default(),
        }
    }
}

impl TracingConfiguration {
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_target_level(mut self, target: impl Into<String>, level: LogLevel) -> Self {
        self.targets.insert(target.into(), level);
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn with_show_target(mut self, show_target: bool) -> Self {
        self.show_target = show_target;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn targets(&self) -> &BTreeMap<String, LogLevel> {
        &self.targets
    }

    /// Threshold applied to events of `target`: the longest configured
    /// prefix wins, otherwise the global level
    pub fn level_for(&self, target: &str) -> LogLevel {
        self.targets
            .iter()
            .filter(|(prefix, _)| {
                target == prefix.as_str()
                    || target
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with("::"))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level)
            .unwrap_or(self.level)
    }

    pub fn ansi(&self) -> bool {
        self.ansi
    }

    pub fn show_target(&self) -> bool {
        self.show_target
    }

    /// `EnvFilter` directives: the global level first, then one per target
    pub fn directives(&self) -> String {
        std::iter::once(self.level.to_string())
            .chain(
                self.targets
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn env_filter(&self) -> Result<EnvFilter, SetupError> {
        Ok(EnvFilter::try_new(self.directives())?)
    }

    /// Install the global stdout subscriber. Fails if a target does not form
    /// a valid directive, or if a global subscriber is already set.
    pub fn init_subscriber(&self) -> Result<(), SetupError> {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter()?)
            .with_ansi(self.ansi)
            .with_target(self.show_target)
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TracingConfiguration::default();
        assert_eq!(config.level(), LogLevel::Info);
        assert!(config.targets().is_empty());
        assert!(!config.ansi());
        assert!(config.show_target());
        assert_eq!(config.directives(), "info");
    }

    #[test]
    fn test_level_for_target() {
        let config = TracingConfiguration::default()
            .with_level(LogLevel::Warn)
            .with_target_level("soap_codec", LogLevel::Debug)
            .with_target_level("soap_codec::cache", LogLevel::Trace);

        assert_eq!(config.level_for("soap_codec"), LogLevel::Debug);
        assert_eq!(config.level_for("soap_codec::schema"), LogLevel::Debug);
        assert_eq!(config.level_for("soap_codec::cache"), LogLevel::Trace);
        assert_eq!(config.level_for("soap_codecs"), LogLevel::Warn);
        assert_eq!(config.level_for("soap_description"), LogLevel::Warn);
    }

    #[test]
    fn test_directives() {
        let config = TracingConfiguration::default()
            .with_level(LogLevel::Error)
            .with_target_level("soap_description", LogLevel::Info)
            .with_target_level("soap_codec", LogLevel::Trace);

        assert_eq!(
            config.directives(),
            "error,soap_codec=trace,soap_description=info"
        );
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert!(LogLevel::Error < LogLevel::Trace);
    }

    #[test]
    fn test_init_twice_fails() {
        let config = TracingConfiguration::default().with_show_target(false);
        assert!(config.init_subscriber().is_ok());
        assert!(config.init_subscriber().is_err());
    }
}
