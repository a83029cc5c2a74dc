// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::kind::CodecKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown codec kind ({0})")]
    UnknownCodecKind(i32),

    #[error("invalid element name: {0:?}")]
    InvalidElementName(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cached codec does not match the requested payload type")]
    TypeMismatch,

    #[error("{requested} codec requested for an operation using {configured} codecs")]
    KindMismatch {
        configured: CodecKind,
        requested: CodecKind,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
