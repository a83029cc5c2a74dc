// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::io::BufRead;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::{CodecError, Result};
use crate::kind::CodecKind;
use crate::value::XmlValue;

/// Strategy to decode and encode a payload of type `T`, rooted at a fixed
/// element name and namespace.
pub trait BodyCodec<T>: Send + Sync {
    /// Encoding scheme implemented by this codec
    fn kind(&self) -> CodecKind;

    /// Local name of the root element
    fn root_name(&self) -> &str;

    /// Namespace of the root element
    fn root_namespace(&self) -> &str;

    /// Read one root element from `reader` and rebuild the payload
    fn decode(&self, reader: &mut dyn BufRead) -> Result<T>;

    /// Write the payload as a single root element
    fn encode(&self, value: &T) -> Result<String>;
}

/// Payload usable with either codec kind.
pub trait Payload: Serialize + DeserializeOwned + XmlValue + Send + Sync + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + XmlValue + Send + Sync + 'static {}

// Root names must be a non-qualified XML name (NCName).
pub(crate) fn validate_element_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(CodecError::InvalidElementName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_element_name() {
        assert!(validate_element_name("Echo").is_ok());
        assert!(validate_element_name("_echo-result.v2").is_ok());
        assert!(validate_element_name("").is_err());
        assert!(validate_element_name("1abc").is_err());
        assert!(validate_element_name("soap:Body").is_err());
        assert!(validate_element_name("with space").is_err());
    }
}
