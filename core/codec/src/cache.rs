// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Get-or-create cache of body codecs.
//!
//! The map lock is only held to find or insert the per-key cell. Codec
//! construction happens inside the cell, so concurrent first calls for the
//! same key build the codec once while unrelated keys proceed in parallel.
//! A failed construction leaves the cell empty and the next call retries.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::annotated::AnnotatedCodec;
use crate::codec::{BodyCodec, Payload};
use crate::errors::{CodecError, Result};
use crate::kind::CodecKind;
use crate::schema::SchemaCodec;
use crate::value::XmlValue;

type Slot = Arc<OnceCell<Box<dyn Any + Send + Sync>>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CodecKey {
    namespace: String,
    name: String,
    kind: CodecKind,
    payload: TypeId,
}

#[derive(Default)]
pub struct CodecCache {
    slots: RwLock<HashMap<CodecKey, Slot>>,
    constructions: AtomicUsize,
}

impl std::fmt::Debug for CodecCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecCache")
            .field("codecs", &self.len())
            .field("constructions", &self.constructions())
            .finish()
    }
}

impl CodecCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the codec of the given kind for `T`, rooted at `{namespace}name`
    pub fn get<T: Payload>(
        &self,
        kind: CodecKind,
        name: &str,
        namespace: &str,
    ) -> Result<Arc<dyn BodyCodec<T>>> {
        match kind {
            CodecKind::SchemaDriven => self.schema_driven(name, namespace),
            CodecKind::AnnotationDriven => self.annotation_driven(name, namespace),
        }
    }

    /// Same as [`CodecCache::get`], with the kind given as its integer code.
    /// Unknown codes fail without touching the cache.
    pub fn get_by_code<T: Payload>(
        &self,
        code: i32,
        name: &str,
        namespace: &str,
    ) -> Result<Arc<dyn BodyCodec<T>>> {
        let kind = CodecKind::try_from(code)?;
        self.get(kind, name, namespace)
    }

    pub fn schema_driven<T>(&self, name: &str, namespace: &str) -> Result<Arc<dyn BodyCodec<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.get_or_create(CodecKind::SchemaDriven, name, namespace, || {
            Ok(Arc::new(SchemaCodec::<T>::new(name, namespace)?) as Arc<dyn BodyCodec<T>>)
        })
    }

    pub fn annotation_driven<T>(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Arc<dyn BodyCodec<T>>>
    where
        T: XmlValue + Send + Sync + 'static,
    {
        self.get_or_create(CodecKind::AnnotationDriven, name, namespace, || {
            Ok(Arc::new(AnnotatedCodec::<T>::new(name, namespace)?) as Arc<dyn BodyCodec<T>>)
        })
    }

    /// Number of constructed codecs
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful codec constructions since creation
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }

    fn get_or_create<T, F>(
        &self,
        kind: CodecKind,
        name: &str,
        namespace: &str,
        build: F,
    ) -> Result<Arc<dyn BodyCodec<T>>>
    where
        T: 'static,
        F: FnOnce() -> Result<Arc<dyn BodyCodec<T>>>,
    {
        let key = CodecKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            payload: TypeId::of::<T>(),
        };

        let slot = self.slot(key.clone());
        let mut built = false;
        let stored = match slot.get_or_try_init(|| {
            let codec = build()?;
            built = true;
            Ok::<_, CodecError>(Box::new(codec) as Box<dyn Any + Send + Sync>)
        }) {
            Ok(stored) => stored,
            Err(e) => {
                self.discard(&key, &slot);
                return Err(e);
            }
        };

        if built {
            self.constructions.fetch_add(1, Ordering::AcqRel);
            debug!(%kind, %name, %namespace, "body codec constructed");
        } else {
            trace!(%kind, %name, %namespace, "body codec cache hit");
        }

        stored
            .downcast_ref::<Arc<dyn BodyCodec<T>>>()
            .cloned()
            .ok_or(CodecError::TypeMismatch)
    }

    fn slot(&self, key: CodecKey) -> Slot {
        if let Some(slot) = self.slots.read().get(&key) {
            return slot.clone();
        }

        self.slots.write().entry(key).or_default().clone()
    }

    // Drop the cell of a failed construction unless another caller has
    // filled or replaced it meanwhile.
    fn discard(&self, key: &CodecKey, slot: &Slot) {
        let mut slots = self.slots.write();
        if slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none())
        {
            slots.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::XmlElement;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Note {
        text: String,
    }

    impl XmlValue for Note {
        fn write_content(&self, element: &mut XmlElement) {
            element.set_text(self.text.clone());
        }

        fn read_content(element: &XmlElement) -> Result<Self> {
            Ok(Note {
                text: element.text().to_string(),
            })
        }
    }

    #[test]
    fn test_same_key_same_instance() {
        let cache = CodecCache::new();
        let a = cache
            .get::<Note>(CodecKind::SchemaDriven, "Note", "urn:n")
            .unwrap();
        let b = cache
            .get::<Note>(CodecKind::SchemaDriven, "Note", "urn:n")
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.constructions(), 1);
    }

    #[test]
    fn test_distinct_keys() {
        let cache = CodecCache::new();
        let schema = cache
            .get::<Note>(CodecKind::SchemaDriven, "Note", "urn:n")
            .unwrap();
        let annotated = cache
            .get::<Note>(CodecKind::AnnotationDriven, "Note", "urn:n")
            .unwrap();
        cache
            .get::<Note>(CodecKind::SchemaDriven, "Note", "urn:other")
            .unwrap();
        cache
            .get::<String>(CodecKind::SchemaDriven, "Note", "urn:n")
            .unwrap();

        assert_eq!(schema.kind(), CodecKind::SchemaDriven);
        assert_eq!(annotated.kind(), CodecKind::AnnotationDriven);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.constructions(), 4);
    }

    #[test]
    fn test_unknown_kind_inserts_nothing() {
        let cache = CodecCache::new();
        let res = cache.get_by_code::<Note>(42, "Note", "urn:n");

        assert_eq!(res.err(), Some(CodecError::UnknownCodecKind(42)));
        assert!(cache.is_empty());
        assert!(cache.slots.read().is_empty());
    }

    #[test]
    fn test_invalid_root_name_leaves_no_entry() {
        let cache = CodecCache::new();
        for kind in [CodecKind::SchemaDriven, CodecKind::AnnotationDriven] {
            let res = cache.get::<Note>(kind, "not valid", "urn:n");
            assert_eq!(
                res.err(),
                Some(CodecError::InvalidElementName("not valid".to_string()))
            );
        }

        assert!(cache.slots.read().is_empty());
    }

    #[test]
    fn test_get_by_code() {
        let cache = CodecCache::new();
        let codec = cache.get_by_code::<Note>(1, "Note", "urn:n").unwrap();
        assert_eq!(codec.kind(), CodecKind::AnnotationDriven);
        assert_eq!(codec.root_name(), "Note");
        assert_eq!(codec.root_namespace(), "urn:n");
    }

    #[test]
    fn test_failed_construction_is_retried() {
        let cache = CodecCache::new();
        let attempts = AtomicUsize::new(0);

        for _ in 0..2 {
            let res = cache.get_or_create::<Note, _>(CodecKind::SchemaDriven, "Note", "", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CodecError::InvalidElementName("Note".to_string()))
            });
            assert!(res.is_err());
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
        assert!(cache.slots.read().is_empty());
        assert_eq!(cache.constructions(), 0);

        let codec = cache.schema_driven::<Note>("Note", "").unwrap();
        assert_eq!(codec.root_name(), "Note");
        assert_eq!(cache.constructions(), 1);
    }
}
