// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::cell::Cell;
use std::io::BufRead;
use std::marker::PhantomData;

use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{DeError, NsReader, Writer};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize, forward_to_deserialize_any};

use crate::codec::{BodyCodec, validate_element_name};
use crate::errors::{CodecError, Result};
use crate::kind::CodecKind;
use crate::lenient::{AbsentFields, Lenient};

/// Codec whose XML shape follows the payload's serde derive: one child
/// element per field, in declaration order.
///
/// A payload that is itself a sequence is written as one `item` child per
/// entry, so the body is always a single element. Sequence fields left out
/// of the input read as empty.
#[derive(Debug)]
pub struct SchemaCodec<T> {
    name: String,
    namespace: String,
    sequence: bool,
    _payload: PhantomData<fn() -> T>,
}

// Wrapper for sequence payloads; the field name matches `ITEM_ELEMENT`.
#[derive(Serialize, Deserialize)]
struct Items<T> {
    item: T,
}

impl<T> SchemaCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(name: &str, namespace: &str) -> Result<Self> {
        validate_element_name(name)?;

        Ok(SchemaCodec {
            name: name.to_string(),
            namespace: namespace.to_string(),
            sequence: is_sequence::<T>(),
            _payload: PhantomData,
        })
    }

    // serde ignores the root tag, so the qualified name is checked here
    fn check_root(&self, ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<()> {
        let namespace: &[u8] = match &ns {
            ResolveResult::Bound(ns) => ns.as_ref(),
            _ => b"",
        };
        let local = start.local_name();
        if local.as_ref() == self.name.as_bytes() && namespace == self.namespace.as_bytes() {
            return Ok(());
        }

        Err(CodecError::MalformedPayload(format!(
            "expected root element {{{}}}{}, found {{{}}}{}",
            self.namespace,
            self.name,
            String::from_utf8_lossy(namespace),
            String::from_utf8_lossy(local.as_ref()),
        )))
    }

    /// Copy the next element of `input`, and nothing after it, into a
    /// standalone document.
    ///
    /// Text is re-emitted as CDATA so that the deserializer keeps it as
    /// written. Whitespace-only text is kept only as the whole content of an
    /// element without children.
    fn read_root(&self, input: &mut dyn BufRead) -> Result<String> {
        let mut reader = NsReader::from_reader(input);
        let mut writer = Writer::new(Vec::new());
        let mut buf = Vec::new();

        let mut depth = 0usize;
        let mut content = Content::AfterStart;
        let mut pending: Option<String> = None;

        loop {
            let (ns, event) = reader.read_resolved_event_into(&mut buf).map_err(malformed)?;

            match event {
                Event::Start(start) => {
                    if depth == 0 {
                        self.check_root(ns, &start)?;
                    }
                    depth += 1;
                    pending = None;
                    content = Content::AfterStart;
                    write_event(&mut writer, Event::Start(start))?;
                }
                Event::Empty(start) => {
                    if depth == 0 {
                        self.check_root(ns, &start)?;
                    }
                    pending = None;
                    content = Content::AfterChild;
                    write_event(&mut writer, Event::Empty(start))?;
                    if depth == 0 {
                        break;
                    }
                }
                Event::End(end) => {
                    if depth == 0 {
                        return Err(CodecError::MalformedPayload(
                            "unbalanced end tag".to_string(),
                        ));
                    }
                    if let (Content::AfterStart, Some(text)) = (content, pending.take()) {
                        write_text(&mut writer, &text)?;
                    }
                    pending = None;
                    depth -= 1;
                    content = Content::AfterChild;
                    write_event(&mut writer, Event::End(end))?;
                    if depth == 0 {
                        break;
                    }
                }
                Event::Text(text) if depth > 0 => {
                    let text = text.unescape().map_err(malformed)?;
                    if text.trim().is_empty() && content != Content::Text {
                        pending.get_or_insert_with(String::new).push_str(&text);
                    } else {
                        if let Some(space) = pending.take() {
                            write_text(&mut writer, &space)?;
                        }
                        write_text(&mut writer, &text)?;
                        content = Content::Text;
                    }
                }
                Event::CData(data) if depth > 0 => {
                    if let Some(space) = pending.take() {
                        write_text(&mut writer, &space)?;
                    }
                    content = Content::Text;
                    write_event(&mut writer, Event::CData(data))?;
                }
                Event::Eof if depth == 0 => {
                    return Err(CodecError::MalformedPayload(
                        "missing root element".to_string(),
                    ));
                }
                Event::Eof => {
                    return Err(CodecError::MalformedPayload(
                        "unexpected end of document".to_string(),
                    ));
                }
                // declarations, comments, processing instructions, doctype
                _ => {}
            }
            buf.clear();
        }

        String::from_utf8(writer.into_inner()).map_err(malformed)
    }

    // Missing fields are retried as absent values one name at a time, so that
    // empty sequences (which the serializer leaves out) read back as empty.
    fn read_value<P: DeserializeOwned>(xml: &str) -> Result<P> {
        let mut absent = AbsentFields::new();
        loop {
            let mut de = quick_xml::de::Deserializer::from_str(xml);
            let err = match P::deserialize(Lenient::new(&mut de, &absent)) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let field = match &err {
                DeError::Custom(msg) => msg
                    .strip_prefix("missing field `")
                    .and_then(|rest| rest.strip_suffix('`')),
                _ => None,
            };
            match field {
                Some(field) if absent.insert(field.to_string()) => continue,
                _ => return Err(malformed(err)),
            }
        }
    }
}

impl<T> BodyCodec<T> for SchemaCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn kind(&self) -> CodecKind {
        CodecKind::SchemaDriven
    }

    fn root_name(&self) -> &str {
        &self.name
    }

    fn root_namespace(&self) -> &str {
        &self.namespace
    }

    fn decode(&self, reader: &mut dyn BufRead) -> Result<T> {
        let xml = self.read_root(reader)?;

        if self.sequence {
            Self::read_value::<Items<T>>(&xml).map(|items| items.item)
        } else {
            Self::read_value::<T>(&xml)
        }
    }

    fn encode(&self, value: &T) -> Result<String> {
        let body = if self.sequence {
            quick_xml::se::to_string_with_root(&self.name, &Items { item: value })
        } else {
            quick_xml::se::to_string_with_root(&self.name, value)
        }
        .map_err(|e| CodecError::Serialization(e.to_string()))?;

        if self.namespace.is_empty() {
            return Ok(body);
        }

        let open = format!("<{}", self.name);
        match body.strip_prefix(open.as_str()) {
            Some(rest) => Ok(format!(
                "{} xmlns=\"{}\"{}",
                open,
                escape(self.namespace.as_str()),
                rest
            )),
            None => Err(CodecError::Serialization(format!(
                "serializer did not produce a {} root element",
                self.name
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    AfterStart,
    Text,
    AfterChild,
}

fn malformed(e: impl std::fmt::Display) -> CodecError {
    CodecError::MalformedPayload(e.to_string())
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(malformed)
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    for data in BytesCData::escaped(text) {
        write_event(writer, Event::CData(data))?;
    }
    Ok(())
}

/// True if `T` deserializes from a sequence, looking through newtypes.
fn is_sequence<T: DeserializeOwned>() -> bool {
    let found = Cell::new(false);
    let _ = T::deserialize(SequenceCheck(&found));
    found.get()
}

// Records whether the type asks for a sequence; never produces a value.
struct SequenceCheck<'a>(&'a Cell<bool>);

impl<'de> Deserializer<'de> for SequenceCheck<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, Self::Error> {
        Err(de::Error::custom("shape only"))
    }

    fn deserialize_seq<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, Self::Error> {
        self.0.set(true);
        Err(de::Error::custom("shape only"))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.set(true);
        Err(de::Error::custom("shape only"))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct tuple_struct map struct enum
        identifier ignored_any
    }
}
