// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! XML body codecs for SOAP operations.
//!
//! A [`BodyCodec`] turns the XML content of a SOAP body element into a typed
//! payload and back. Two encodings are supported, selected by [`CodecKind`]:
//! schema-driven codecs follow the payload's own serde shape, annotation-driven
//! codecs follow explicit [`XmlMember`] declarations. Codecs are built lazily
//! and kept for the lifetime of their owner by a [`CodecCache`].

pub mod annotated;
pub mod cache;
pub mod codec;
pub mod element;
pub mod errors;
pub mod kind;
mod lenient;
pub mod schema;
pub mod value;

pub use annotated::AnnotatedCodec;
pub use cache::CodecCache;
pub use codec::{BodyCodec, Payload};
pub use element::XmlElement;
pub use errors::CodecError;
pub use kind::CodecKind;
pub use schema::SchemaCodec;
pub use value::{ITEM_ELEMENT, XmlMember, XmlValue};
