// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CodecError;

/// Encoding scheme used to map a payload type to XML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    /// Shape and order come from the payload's own serde derive.
    #[default]
    SchemaDriven = 0,
    /// Shape comes from explicit per-member name/namespace declarations.
    AnnotationDriven = 1,
}

impl CodecKind {
    /// Stable integer code, as used in cache keys and external configuration.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for CodecKind {
    type Error = CodecError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CodecKind::SchemaDriven),
            1 => Ok(CodecKind::AnnotationDriven),
            other => Err(CodecError::UnknownCodecKind(other)),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::SchemaDriven => write!(f, "schema_driven"),
            CodecKind::AnnotationDriven => write!(f, "annotation_driven"),
        }
    }
}
