// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::io::BufRead;
use std::marker::PhantomData;

use crate::codec::{BodyCodec, validate_element_name};
use crate::element::XmlElement;
use crate::errors::{CodecError, Result};
use crate::kind::CodecKind;
use crate::value::XmlValue;

/// Codec driven by the payload's [`XmlValue`] member declarations.
#[derive(Debug)]
pub struct AnnotatedCodec<T> {
    name: String,
    namespace: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T: XmlValue> AnnotatedCodec<T> {
    pub fn new(name: &str, namespace: &str) -> Result<Self> {
        validate_element_name(name)?;

        Ok(AnnotatedCodec {
            name: name.to_string(),
            namespace: namespace.to_string(),
            _payload: PhantomData,
        })
    }
}

impl<T: XmlValue> BodyCodec<T> for AnnotatedCodec<T> {
    fn kind(&self) -> CodecKind {
        CodecKind::AnnotationDriven
    }

    fn root_name(&self) -> &str {
        &self.name
    }

    fn root_namespace(&self) -> &str {
        &self.namespace
    }

    fn decode(&self, reader: &mut dyn BufRead) -> Result<T> {
        let root = XmlElement::read_from(reader)?;
        if !root.is(&self.name, &self.namespace) {
            return Err(CodecError::MalformedPayload(format!(
                "expected root element {{{}}}{}, found {{{}}}{}",
                self.namespace,
                self.name,
                root.namespace(),
                root.name()
            )));
        }

        T::read_content(&root)
    }

    fn encode(&self, value: &T) -> Result<String> {
        let mut root = XmlElement::new(self.name.as_str(), self.namespace.as_str());
        value.write_content(&mut root);
        Ok(root.to_xml())
    }
}
