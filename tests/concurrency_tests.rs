//! First use of a type from many threads at once.
//!
//! Every thread races to build the same stringifiers on a fresh encoder. All
//! of them must observe the same compiled encoding, and none may block
//! forever on a recursive type that another thread is still building.

use apiquery::{
    to_pairs_with_settings, ArrayFormat, Encoder, NestedFormat, Pair, QueryEncode, Registry,
    Settings,
};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 16;

#[derive(QueryEncode)]
pub struct Tree {
    #[query("label")]
    pub label: String,
    #[query("children,omitempty")]
    pub children: Vec<Tree>,
    #[query("parent")]
    pub parent: Option<Box<Tree>>,
}

#[derive(QueryEncode)]
pub struct Ping {
    #[query("a")]
    pub a: Option<Box<Pong>>,
}

#[derive(QueryEncode)]
pub struct Pong {
    #[query("b")]
    pub b: Option<Box<Ping>>,
    #[query("n")]
    pub n: u8,
}

fn tree() -> Tree {
    Tree {
        label: "root".to_string(),
        children: vec![Tree {
            label: "leaf".to_string(),
            children: Vec::new(),
            parent: None,
        }],
        parent: Some(Box::new(Tree {
            label: "up".to_string(),
            children: Vec::new(),
            parent: None,
        })),
    }
}

fn race<F>(f: F) -> Vec<Vec<Pair>>
where
    F: Fn() -> Vec<Pair> + Sync,
{
    let barrier = Barrier::new(THREADS);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    f()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    })
}

#[test]
fn test_recursive_type_first_use_from_many_threads() {
    let settings = Settings::new()
        .with_nested_format(NestedFormat::Dots)
        .with_array_format(ArrayFormat::Repeat);
    let encoder = Encoder::new(settings);

    let results = race(|| encoder.encode(&tree()).unwrap());
    let expected = [
        ("label", "root"),
        ("children.label", "leaf"),
        ("parent.label", "up"),
    ];
    for pairs in &results {
        assert_eq!(pairs, &expected);
    }
}

#[test]
fn test_mutually_recursive_types() {
    let encoder = Encoder::new(Settings::default());
    let value = Ping {
        a: Some(Box::new(Pong {
            b: Some(Box::new(Ping { a: None })),
            n: 4,
        })),
    };

    let results = race(|| encoder.encode(&value).unwrap());
    for pairs in &results {
        assert_eq!(pairs, &[("a[n]", "4")]);
    }

    let cached = encoder.cached_types();
    assert!(cached > 0);
    encoder.encode(&value).unwrap();
    assert_eq!(encoder.cached_types(), cached);
}

#[test]
fn test_build_failure_is_shared() {
    let encoder = Encoder::new(Settings::new().with_array_format(ArrayFormat::Indices));
    let results: Vec<_> = {
        let barrier = Barrier::new(THREADS);
        thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        encoder.encode(&tree()).is_err()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        })
    };
    assert!(results.into_iter().all(|failed| failed));
}

#[test]
fn test_registry_hands_out_one_encoder_per_settings() {
    let registry = Registry::new();
    let settings = Settings::new().with_nested_format(NestedFormat::Dots);
    let barrier = Barrier::new(THREADS);

    let encoders: Vec<Arc<Encoder>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    registry.encoder(settings)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(registry.len(), 1);
    assert!(encoders
        .iter()
        .all(|encoder| Arc::ptr_eq(encoder, &encoders[0])));
}

#[test]
fn test_global_functions_from_many_threads() {
    let settings = Settings::new().with_array_format(ArrayFormat::Brackets);
    let results = race(|| to_pairs_with_settings(&tree(), settings).unwrap());
    for pairs in &results {
        assert_eq!(
            pairs,
            &[
                ("label", "root"),
                ("children[][label]", "leaf"),
                ("parent[label]", "up"),
            ]
        );
    }
}
