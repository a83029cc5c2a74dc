// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Annotation-driven mapping between values and [`XmlElement`] content.
//!
//! Records implement [`XmlValue`] by walking a table of [`XmlMember`]
//! declarations, one per field:
//!
//! ```
//! use soap_codec::{CodecError, XmlElement, XmlMember, XmlValue};
//!
//! struct Customer {
//!     id: u32,
//!     name: String,
//! }
//!
//! const ID: XmlMember = XmlMember::new("id").element("CustomerId");
//! const NAME: XmlMember = XmlMember::new("name").namespace("urn:people");
//!
//! impl XmlValue for Customer {
//!     fn write_content(&self, element: &mut XmlElement) {
//!         ID.write(element, &self.id);
//!         NAME.write(element, &self.name);
//!     }
//!
//!     fn read_content(element: &XmlElement) -> Result<Self, CodecError> {
//!         Ok(Customer {
//!             id: ID.read(element)?,
//!             name: NAME.read(element)?,
//!         })
//!     }
//! }
//! ```

use crate::element::XmlElement;
use crate::errors::{CodecError, Result};

/// Element name used for the entries of a sequence.
pub const ITEM_ELEMENT: &str = "item";

/// A value that can be written into, and read back from, the content of an
/// XML element. The element itself (its name and namespace) is chosen by the
/// caller.
pub trait XmlValue: Sized {
    fn write_content(&self, element: &mut XmlElement);

    fn read_content(element: &XmlElement) -> Result<Self>;
}

/// Declared wire shape of one record member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlMember {
    field: &'static str,
    element: Option<&'static str>,
    namespace: Option<&'static str>,
}

impl XmlMember {
    pub const fn new(field: &'static str) -> Self {
        XmlMember {
            field,
            element: None,
            namespace: None,
        }
    }

    /// Override the element name (defaults to the field name)
    pub const fn element(self, element: &'static str) -> Self {
        XmlMember {
            element: Some(element),
            ..self
        }
    }

    /// Override the namespace (defaults to the enclosing element's namespace)
    pub const fn namespace(self, namespace: &'static str) -> Self {
        XmlMember {
            namespace: Some(namespace),
            ..self
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn element_name(&self) -> &'static str {
        self.element.unwrap_or(self.field)
    }

    pub fn resolve_namespace<'a>(&self, parent: &'a XmlElement) -> &'a str {
        self.namespace.unwrap_or(parent.namespace())
    }

    pub fn write<V: XmlValue>(&self, parent: &mut XmlElement, value: &V) {
        let namespace = self.resolve_namespace(parent).to_string();
        let mut child = XmlElement::new(self.element_name(), namespace);
        value.write_content(&mut child);
        parent.push(child);
    }

    /// Absent values produce no element at all
    pub fn write_optional<V: XmlValue>(&self, parent: &mut XmlElement, value: &Option<V>) {
        if let Some(value) = value {
            self.write(parent, value);
        }
    }

    pub fn read<V: XmlValue>(&self, parent: &XmlElement) -> Result<V> {
        self.read_optional(parent)?.ok_or_else(|| {
            CodecError::MalformedPayload(format!(
                "missing element {{{}}}{} in {}",
                self.resolve_namespace(parent),
                self.element_name(),
                parent.name()
            ))
        })
    }

    pub fn read_optional<V: XmlValue>(&self, parent: &XmlElement) -> Result<Option<V>> {
        parent
            .child(self.element_name(), self.resolve_namespace(parent))
            .map(V::read_content)
            .transpose()
    }
}

impl XmlValue for String {
    fn write_content(&self, element: &mut XmlElement) {
        element.set_text(self.clone());
    }

    fn read_content(element: &XmlElement) -> Result<Self> {
        Ok(element.text().to_string())
    }
}

impl XmlValue for bool {
    fn write_content(&self, element: &mut XmlElement) {
        element.set_text(self.to_string());
    }

    fn read_content(element: &XmlElement) -> Result<Self> {
        // xsd:boolean also allows the numeric forms
        match element.text().trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(CodecError::MalformedPayload(format!(
                "element {}: invalid boolean {:?}",
                element.name(),
                other
            ))),
        }
    }
}

macro_rules! text_value {
    ($($t:ty),*) => {
        $(
            impl XmlValue for $t {
                fn write_content(&self, element: &mut XmlElement) {
                    element.set_text(self.to_string());
                }

                fn read_content(element: &XmlElement) -> Result<Self> {
                    element.text().trim().parse::<$t>().map_err(|e| {
                        CodecError::MalformedPayload(format!("element {}: {}", element.name(), e))
                    })
                }
            }
        )*
    };
}

text_value!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl<T: XmlValue> XmlValue for Vec<T> {
    fn write_content(&self, element: &mut XmlElement) {
        for value in self {
            let mut item = XmlElement::new(ITEM_ELEMENT, element.namespace());
            value.write_content(&mut item);
            element.push(item);
        }
    }

    fn read_content(element: &XmlElement) -> Result<Self> {
        element
            .children_named(ITEM_ELEMENT, element.namespace())
            .map(T::read_content)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        label: Option<String>,
    }

    const X: XmlMember = XmlMember::new("x").element("X");
    const LABEL: XmlMember = XmlMember::new("label").namespace("urn:labels");

    impl XmlValue for Point {
        fn write_content(&self, element: &mut XmlElement) {
            X.write(element, &self.x);
            LABEL.write_optional(element, &self.label);
        }

        fn read_content(element: &XmlElement) -> Result<Self> {
            Ok(Point {
                x: X.read(element)?,
                label: LABEL.read_optional(element)?,
            })
        }
    }

    #[test]
    fn test_member_resolution() {
        let parent = XmlElement::new("Point", "urn:points");

        assert_eq!(X.field(), "x");
        assert_eq!(X.element_name(), "X");
        assert_eq!(X.resolve_namespace(&parent), "urn:points");
        assert_eq!(LABEL.element_name(), "label");
        assert_eq!(LABEL.resolve_namespace(&parent), "urn:labels");
    }

    #[test]
    fn test_record_members() {
        let point = Point {
            x: -4,
            label: Some("origin".to_string()),
        };

        let mut element = XmlElement::new("Point", "urn:points");
        point.write_content(&mut element);

        assert_eq!(element.child("X", "urn:points").unwrap().text(), "-4");
        assert_eq!(element.child("label", "urn:labels").unwrap().text(), "origin");
        assert_eq!(Point::read_content(&element).unwrap(), point);
    }

    #[test]
    fn test_absent_optional_member() {
        let point = Point { x: 1, label: None };

        let mut element = XmlElement::new("Point", "");
        point.write_content(&mut element);

        assert_eq!(element.children().len(), 1);
        assert_eq!(Point::read_content(&element).unwrap(), point);
    }

    #[test]
    fn test_missing_member() {
        let element = XmlElement::new("Point", "urn:points");
        let err = Point::read_content(&element).unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedPayload("missing element {urn:points}X in Point".to_string())
        );
    }

    #[test]
    fn test_primitives() {
        let mut element = XmlElement::new("v", "");
        element.set_text(" 42 ");
        assert_eq!(u16::read_content(&element).unwrap(), 42);

        element.set_text("1");
        assert!(bool::read_content(&element).unwrap());

        element.set_text("yes");
        assert!(bool::read_content(&element).is_err());

        element.set_text("abc");
        assert!(matches!(
            i32::read_content(&element),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_sequence_items() {
        let mut element = XmlElement::new("values", "urn:v");
        vec![3u8, 1, 2].write_content(&mut element);

        assert_eq!(element.children().len(), 3);
        assert!(element.children().iter().all(|c| c.is(ITEM_ELEMENT, "urn:v")));
        assert_eq!(Vec::<u8>::read_content(&element).unwrap(), vec![3, 1, 2]);
    }
}
