// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Deserializer adapter that supplies selected missing struct fields.
//!
//! The XML serializer writes nothing for an empty sequence, so a record whose
//! sequence field is empty comes back without that element. [`Lenient`]
//! wraps a deserializer and, for every struct it reads, hands the fields
//! named in an [`AbsentFields`] set that did not appear in the input to the
//! struct as absent values: sequences read as empty and options as `None`.
//! Any other type still fails with the usual missing-field error.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use serde::de::value::StrDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;

/// Field names that may be missing from the input
pub(crate) type AbsentFields = HashSet<String>;

pub(crate) struct Lenient<'a, D> {
    inner: D,
    absent: &'a AbsentFields,
}

impl<'a, D> Lenient<'a, D> {
    pub(crate) fn new(inner: D, absent: &'a AbsentFields) -> Self {
        Lenient { inner, absent }
    }

    fn wrap<V>(&self, visitor: V, fields: &'static [&'static str]) -> Wrap<'a, V> {
        Wrap {
            inner: visitor,
            fields,
            absent: self.absent,
        }
    }
}

macro_rules! forward_deserialize {
    ($($method:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $method<V: Visitor<'de>>(
                self,
                $($arg: $ty,)*
                visitor: V,
            ) -> Result<V::Value, Self::Error> {
                let visitor = self.wrap(visitor, &[]);
                self.inner.$method($($arg,)* visitor)
            }
        )*
    };
}

impl<'de, D: Deserializer<'de>> Deserializer<'de> for Lenient<'_, D> {
    type Error = D::Error;

    forward_deserialize! {
        deserialize_any();
        deserialize_bool();
        deserialize_i8();
        deserialize_i16();
        deserialize_i32();
        deserialize_i64();
        deserialize_i128();
        deserialize_u8();
        deserialize_u16();
        deserialize_u32();
        deserialize_u64();
        deserialize_u128();
        deserialize_f32();
        deserialize_f64();
        deserialize_char();
        deserialize_str();
        deserialize_string();
        deserialize_bytes();
        deserialize_byte_buf();
        deserialize_option();
        deserialize_unit();
        deserialize_unit_struct(name: &'static str);
        deserialize_newtype_struct(name: &'static str);
        deserialize_seq();
        deserialize_tuple(len: usize);
        deserialize_tuple_struct(name: &'static str, len: usize);
        deserialize_map();
        deserialize_enum(name: &'static str, variants: &'static [&'static str]);
        deserialize_identifier();
        deserialize_ignored_any();
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let visitor = self.wrap(visitor, fields);
        self.inner.deserialize_struct(name, fields, visitor)
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

struct Wrap<'a, V> {
    inner: V,
    fields: &'static [&'static str],
    absent: &'a AbsentFields,
}

macro_rules! forward_visit {
    ($($method:ident($ty:ty);)*) => {
        $(
            fn $method<E: de::Error>(self, v: $ty) -> Result<Self::Value, E> {
                self.inner.$method(v)
            }
        )*
    };
}

impl<'de, V: Visitor<'de>> Visitor<'de> for Wrap<'_, V> {
    type Value = V::Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.expecting(f)
    }

    forward_visit! {
        visit_bool(bool);
        visit_i8(i8);
        visit_i16(i16);
        visit_i32(i32);
        visit_i64(i64);
        visit_i128(i128);
        visit_u8(u8);
        visit_u16(u16);
        visit_u32(u32);
        visit_u64(u64);
        visit_u128(u128);
        visit_f32(f32);
        visit_f64(f64);
        visit_char(char);
        visit_str(&str);
        visit_borrowed_str(&'de str);
        visit_string(String);
        visit_bytes(&[u8]);
        visit_borrowed_bytes(&'de [u8]);
        visit_byte_buf(Vec<u8>);
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        self.inner.visit_none()
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        self.inner.visit_unit()
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        self.inner
            .visit_some(Lenient::new(deserializer, self.absent))
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        self.inner
            .visit_newtype_struct(Lenient::new(deserializer, self.absent))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        self.inner.visit_seq(LenientSeq {
            inner: seq,
            absent: self.absent,
        })
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        self.inner.visit_map(LenientMap {
            inner: Some(map),
            fields: self.fields,
            absent: self.absent,
            seen: Vec::new(),
            next_field: 0,
            pending: None,
        })
    }

    // variant payloads are read as they are
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Self::Value, A::Error> {
        self.inner.visit_enum(data)
    }
}

struct Seed<'a, S> {
    inner: S,
    absent: &'a AbsentFields,
}

impl<'de, S: DeserializeSeed<'de>> DeserializeSeed<'de> for Seed<'_, S> {
    type Value = S::Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        self.inner
            .deserialize(Lenient::new(deserializer, self.absent))
    }
}

struct LenientSeq<'a, A> {
    inner: A,
    absent: &'a AbsentFields,
}

impl<'de, A: SeqAccess<'de>> SeqAccess<'de> for LenientSeq<'_, A> {
    type Error = A::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        self.inner.next_element_seed(Seed {
            inner: seed,
            absent: self.absent,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

struct LenientMap<'a, A> {
    // None once the input entries are exhausted
    inner: Option<A>,
    fields: &'static [&'static str],
    absent: &'a AbsentFields,
    seen: Vec<String>,
    next_field: usize,
    pending: Option<&'static str>,
}

impl<'de, A: MapAccess<'de>> MapAccess<'de> for LenientMap<'_, A> {
    type Error = A::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        // plain maps are passed through
        if self.fields.is_empty() {
            return match self.inner.as_mut() {
                Some(inner) => inner.next_key_seed(Seed {
                    inner: seed,
                    absent: self.absent,
                }),
                None => Ok(None),
            };
        }

        let mut slot = Some(seed);
        if let Some(inner) = self.inner.as_mut() {
            let key = inner.next_key_seed(KeySeed {
                slot: &mut slot,
                seen: &mut self.seen,
            })?;
            if key.is_some() {
                return Ok(key);
            }
            self.inner = None;
        }

        let Some(seed) = slot.take() else {
            return Err(de::Error::custom("struct key read twice"));
        };

        while let Some(field) = self.fields.get(self.next_field).copied() {
            self.next_field += 1;
            if self.absent.contains(field) && !self.seen.iter().any(|s| s == field) {
                self.pending = Some(field);
                let key: StrDeserializer<'_, A::Error> = field.into_deserializer();
                return seed.deserialize(key).map(Some);
            }
        }

        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        if let Some(field) = self.pending.take() {
            return seed.deserialize(Absent {
                field,
                marker: PhantomData,
            });
        }

        match self.inner.as_mut() {
            Some(inner) => inner.next_value_seed(Seed {
                inner: seed,
                absent: self.absent,
            }),
            None => Err(de::Error::custom("struct value read after the last key")),
        }
    }
}

// Reads a struct key through the caller's seed and records its name. The
// seed stays in `slot` if the map has no more keys.
struct KeySeed<'s, K> {
    slot: &'s mut Option<K>,
    seen: &'s mut Vec<String>,
}

impl<'de, K: DeserializeSeed<'de>> DeserializeSeed<'de> for KeySeed<'_, K> {
    type Value = K::Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let seed = self
            .slot
            .take()
            .ok_or_else(|| <D::Error as de::Error>::custom("struct key read twice"))?;
        seed.deserialize(KeyName {
            inner: deserializer,
            seen: self.seen,
        })
    }
}

struct KeyName<'s, D> {
    inner: D,
    seen: &'s mut Vec<String>,
}

impl<'de, D: Deserializer<'de>> Deserializer<'de> for KeyName<'_, D> {
    type Error = D::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.inner.deserialize_identifier(KeyVisitor {
            inner: visitor,
            seen: self.seen,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct KeyVisitor<'s, V> {
    inner: V,
    seen: &'s mut Vec<String>,
}

impl<'de, V: Visitor<'de>> Visitor<'de> for KeyVisitor<'_, V> {
    type Value = V::Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.expecting(f)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        self.seen.push(v.to_string());
        self.inner.visit_str(v)
    }

    fn visit_borrowed_str<E: de::Error>(self, v: &'de str) -> Result<Self::Value, E> {
        self.seen.push(v.to_string());
        self.inner.visit_borrowed_str(v)
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        self.seen.push(v.clone());
        self.inner.visit_string(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.inner.visit_u64(v)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        self.inner.visit_bytes(v)
    }

    fn visit_borrowed_bytes<E: de::Error>(self, v: &'de [u8]) -> Result<Self::Value, E> {
        self.inner.visit_borrowed_bytes(v)
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        self.inner.visit_byte_buf(v)
    }
}

// Value of a field that is not in the input.
struct Absent<E> {
    field: &'static str,
    marker: PhantomData<E>,
}

impl<'de, E: de::Error> Deserializer<'de> for Absent<E> {
    type Error = E;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, E> {
        Err(E::missing_field(self.field))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, E> {
        visitor.visit_none()
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, E> {
        visitor.visit_seq(EmptySeq(PhantomData))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, E> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

struct EmptySeq<E>(PhantomData<E>);

impl<'de, E: de::Error> SeqAccess<'de> for EmptySeq<E> {
    type Error = E;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, _seed: T) -> Result<Option<T::Value>, E> {
        Ok(None)
    }
}
