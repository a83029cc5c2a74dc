// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Declared metadata of operations and parameters.
//!
//! Every override is optional. Missing values are resolved by
//! [`OperationDescription::new`](crate::OperationDescription::new) through a
//! fixed fallback chain, so no combination of metadata is an error here.

use serde::{Deserialize, Serialize};
use soap_codec::CodecKind;

/// Operation-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperationContract {
    /// Logical operation name, defaults to the method name
    #[serde(default)]
    name: Option<String>,

    /// SOAP action, defaults to `{namespace}/{contract}/{name}`
    #[serde(default)]
    action: Option<String>,

    #[serde(default)]
    is_one_way: bool,

    #[serde(default)]
    reply_action: Option<String>,

    /// Wire name of the return value, defaults to `{name}Result`
    #[serde(default)]
    return_name: Option<String>,

    /// Codec used for this operation's bodies
    #[serde(default)]
    codec: Option<CodecKind>,
}

impl OperationContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        OperationContract {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn with_action(self, action: impl Into<String>) -> Self {
        OperationContract {
            action: Some(action.into()),
            ..self
        }
    }

    pub fn with_one_way(self, is_one_way: bool) -> Self {
        OperationContract { is_one_way, ..self }
    }

    pub fn with_reply_action(self, reply_action: impl Into<String>) -> Self {
        OperationContract {
            reply_action: Some(reply_action.into()),
            ..self
        }
    }

    pub fn with_return_name(self, return_name: impl Into<String>) -> Self {
        OperationContract {
            return_name: Some(return_name.into()),
            ..self
        }
    }

    pub fn with_codec(self, codec: CodecKind) -> Self {
        OperationContract {
            codec: Some(codec),
            ..self
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_one_way(&self) -> bool {
        self.is_one_way
    }

    pub fn reply_action(&self) -> Option<&str> {
        self.reply_action.as_deref()
    }

    pub fn return_name(&self) -> Option<&str> {
        self.return_name.as_deref()
    }

    pub fn codec(&self) -> Option<CodecKind> {
        self.codec
    }
}

/// How a parameter travels between request and reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
    /// Passed by value in the request
    #[default]
    In,
    /// Produced by the operation and returned in the reply
    Out,
    /// Passed by reference: treated as an output slot of the reply
    Ref,
}

impl ParameterDirection {
    pub fn is_output(self) -> bool {
        !matches!(self, ParameterDirection::In)
    }
}

/// Declared parameter with its wire overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterContract {
    name: String,

    #[serde(default)]
    element_name: Option<String>,

    #[serde(default)]
    element_namespace: Option<String>,

    #[serde(default)]
    message_name: Option<String>,

    #[serde(default)]
    direction: ParameterDirection,
}

impl ParameterContract {
    pub fn new(name: impl Into<String>, direction: ParameterDirection) -> Self {
        ParameterContract {
            name: name.into(),
            element_name: None,
            element_namespace: None,
            message_name: None,
            direction,
        }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, ParameterDirection::In)
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, ParameterDirection::Out)
    }

    pub fn by_ref(name: impl Into<String>) -> Self {
        Self::new(name, ParameterDirection::Ref)
    }

    pub fn with_element_name(self, element_name: impl Into<String>) -> Self {
        ParameterContract {
            element_name: Some(element_name.into()),
            ..self
        }
    }

    pub fn with_element_namespace(self, element_namespace: impl Into<String>) -> Self {
        ParameterContract {
            element_namespace: Some(element_namespace.into()),
            ..self
        }
    }

    pub fn with_message_name(self, message_name: impl Into<String>) -> Self {
        ParameterContract {
            message_name: Some(message_name.into()),
            ..self
        }
    }

    /// Name declared by the method signature
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_name(&self) -> Option<&str> {
        self.element_name.as_deref()
    }

    pub fn element_namespace(&self) -> Option<&str> {
        self.element_namespace.as_deref()
    }

    pub fn message_name(&self) -> Option<&str> {
        self.message_name.as_deref()
    }

    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_contract_builder() {
        let op = OperationContract::new()
            .with_name("Ping")
            .with_action("urn:ping")
            .with_one_way(true)
            .with_reply_action("urn:pong")
            .with_return_name("PingOut")
            .with_codec(CodecKind::AnnotationDriven);

        assert_eq!(op.name(), Some("Ping"));
        assert_eq!(op.action(), Some("urn:ping"));
        assert!(op.is_one_way());
        assert_eq!(op.reply_action(), Some("urn:pong"));
        assert_eq!(op.return_name(), Some("PingOut"));
        assert_eq!(op.codec(), Some(CodecKind::AnnotationDriven));
    }

    #[test]
    fn test_operation_contract_defaults() {
        let op = OperationContract::default();
        assert_eq!(op.name(), None);
        assert_eq!(op.action(), None);
        assert!(!op.is_one_way());
        assert_eq!(op.reply_action(), None);
        assert_eq!(op.return_name(), None);
        assert_eq!(op.codec(), None);
    }

    #[test]
    fn test_parameter_directions() {
        assert!(!ParameterContract::input("a").direction().is_output());
        assert!(ParameterContract::output("b").direction().is_output());
        assert!(ParameterContract::by_ref("c").direction().is_output());
    }
}
