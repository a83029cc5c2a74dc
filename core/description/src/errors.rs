// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("duplicate soap action {action} (operations {first} and {second})")]
    DuplicateAction {
        action: String,
        first: String,
        second: String,
    },

    #[error("operation {operation}: duplicate wire name {{{namespace}}}{name}")]
    DuplicateWireName {
        operation: String,
        name: String,
        namespace: String,
    },

    #[error("no operation declared for method {0}")]
    MissingOperation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("missing argument at position {0}")]
    MissingArgument(usize),

    #[error("argument at position {index} is not a {expected}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
    },

    #[error("result is not a {0}")]
    ResultType(&'static str),

    #[error("operation failed: {0}")]
    Fault(String),
}
