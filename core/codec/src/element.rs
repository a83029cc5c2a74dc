// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Minimal namespace-aware XML element tree.
//!
//! Only element structure and text content are kept; attributes other than
//! namespace declarations carry no meaning for SOAP body payloads and are
//! dropped on read.

use std::io::BufRead;

use quick_xml::NsReader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::errors::{CodecError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    namespace: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// True if the element has the given local name and namespace
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace == namespace
    }

    /// First child with the given qualified name
    pub fn child(&self, name: &str, namespace: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(name, namespace))
    }

    /// All children with the given qualified name, in document order
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.is(name, namespace))
    }

    /// Parse the first root element available in `reader`.
    ///
    /// Text content is kept as written, except whitespace-only text of an
    /// element that has child elements, which is dropped. Anything after the
    /// closing tag of the root element is left unread.
    pub fn read_from(reader: &mut dyn BufRead) -> Result<Self> {
        let mut reader = NsReader::from_reader(reader);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let (ns, event) = reader
                .read_resolved_event_into(&mut buf)
                .map_err(|e| CodecError::MalformedPayload(e.to_string()))?;

            let completed = match event {
                Event::Start(start) => {
                    stack.push(Self::open(ns, &start)?);
                    None
                }
                Event::Empty(start) => attach(&mut stack, Self::open(ns, &start)?),
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| CodecError::MalformedPayload(e.to_string()))?;
                        top.text.push_str(&text);
                    }
                    None
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let text = std::str::from_utf8(&data)
                            .map_err(|e| CodecError::MalformedPayload(e.to_string()))?;
                        top.text.push_str(text);
                    }
                    None
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        CodecError::MalformedPayload("unbalanced end tag".to_string())
                    })?;
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    attach(&mut stack, element)
                }
                Event::Eof => {
                    return Err(CodecError::MalformedPayload(
                        "unexpected end of document".to_string(),
                    ));
                }
                // declarations, comments, processing instructions, doctype
                _ => None,
            };

            if let Some(root) = completed {
                return Ok(root);
            }
            buf.clear();
        }
    }

    fn open(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Self> {
        let namespace = match ns {
            ResolveResult::Bound(ns) => std::str::from_utf8(ns.as_ref())
                .map_err(|e| CodecError::MalformedPayload(e.to_string()))?
                .to_string(),
            ResolveResult::Unbound => String::new(),
            ResolveResult::Unknown(prefix) => {
                return Err(CodecError::MalformedPayload(format!(
                    "unknown namespace prefix {}",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };
        let name = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|e| CodecError::MalformedPayload(e.to_string()))?
            .to_string();

        Ok(XmlElement::new(name, namespace))
    }

    /// Serialize the element as a standalone XML fragment. A default
    /// namespace declaration is emitted wherever the namespace changes.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out, None);
        out
    }

    fn write_into(&self, out: &mut String, parent_namespace: Option<&str>) {
        out.push('<');
        out.push_str(&self.name);

        let declare = match parent_namespace {
            None => !self.namespace.is_empty(),
            Some(parent) => parent != self.namespace,
        };
        if declare {
            out.push_str(" xmlns=\"");
            out.push_str(&escape(self.namespace.as_str()));
            out.push('"');
        }

        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write_into(out, Some(&self.namespace));
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

// Attach a closed element to its parent, or hand it back if it is the root.
fn attach(stack: &mut [XmlElement], element: XmlElement) -> Option<XmlElement> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            None
        }
        None => Some(element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = xml.as_bytes();
        XmlElement::read_from(&mut reader)
    }

    #[test]
    fn test_read_resolves_namespaces() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <p:Echo xmlns:p="http://example.org/PingService">
                <p:str>hello &amp; bye</p:str>
                <other xmlns="urn:other"/>
            </p:Echo>"#,
        )
        .unwrap();

        assert!(root.is("Echo", "http://example.org/PingService"));
        assert_eq!(root.children().len(), 2);

        let str_el = root.child("str", "http://example.org/PingService").unwrap();
        assert_eq!(str_el.text(), "hello & bye");
        assert!(root.child("other", "urn:other").is_some());
        assert!(root.child("other", "").is_none());
    }

    #[test]
    fn test_read_keeps_text_as_written() {
        let root = parse("<a>\n  <b>  padded  </b>\n  <c>   </c>\n</a>").unwrap();

        assert_eq!(root.text(), "");
        assert_eq!(root.child("b", "").unwrap().text(), "  padded  ");
        assert_eq!(root.child("c", "").unwrap().text(), "   ");
    }

    #[test]
    fn test_read_cdata() {
        let root = parse("<a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(root.text(), "<raw>");
    }

    #[test]
    fn test_read_errors() {
        assert!(matches!(
            parse("<a><b></b>"),
            Err(CodecError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse("<x:a/>"),
            Err(CodecError::MalformedPayload(_))
        ));
        assert!(matches!(parse(""), Err(CodecError::MalformedPayload(_))));
    }

    #[test]
    fn test_write_declares_namespace_changes() {
        let mut root = XmlElement::new("Echo", "urn:a");
        let mut same = XmlElement::new("str", "urn:a");
        same.set_text("1 < 2");
        root.push(same);
        root.push(XmlElement::new("other", "urn:b"));
        root.push(XmlElement::new("plain", ""));

        assert_eq!(
            root.to_xml(),
            r#"<Echo xmlns="urn:a"><str>1 &lt; 2</str><other xmlns="urn:b"/><plain xmlns=""/></Echo>"#
        );
    }

    #[test]
    fn test_write_then_read() {
        let mut root = XmlElement::new("Batch", "urn:batch");
        for v in ["1", "2"] {
            let mut item = XmlElement::new("item", "urn:batch");
            item.set_text(v);
            root.push(item);
        }

        let xml = root.to_xml();
        assert_eq!(parse(&xml).unwrap(), root);
    }
}
