// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Barrier};
use std::thread;

use soap_codec::{BodyCodec, CodecCache, CodecKind};

const THREADS: usize = 16;

#[test]
fn test_concurrent_first_access_constructs_once() {
    let cache = CodecCache::new();
    let barrier = Barrier::new(THREADS);

    let codecs: Vec<Arc<dyn BodyCodec<String>>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = &cache;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    cache
                        .get::<String>(CodecKind::SchemaDriven, "EchoResult", "urn:ping")
                        .unwrap()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.constructions(), 1);
    assert_eq!(cache.len(), 1);
    assert!(codecs.iter().all(|c| Arc::ptr_eq(c, &codecs[0])));
}

#[test]
fn test_concurrent_distinct_keys() {
    let cache = CodecCache::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for i in 0..THREADS {
            let cache = &cache;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                let name = format!("Operation{}", i % 4);
                let kind = if i % 2 == 0 {
                    CodecKind::SchemaDriven
                } else {
                    CodecKind::AnnotationDriven
                };
                cache.get::<i64>(kind, &name, "urn:ops").unwrap();
            });
        }
    });

    // 4 names, each seen with exactly one kind (even/odd indices keep parity)
    assert_eq!(cache.len(), 4);
    assert_eq!(cache.constructions(), 4);
}
