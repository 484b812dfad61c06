use std::any::TypeId;
use std::sync::{Arc, Barrier};
use std::thread;

use gale::Shaped;
use gale_json::{Codec, ErrorCategory, JsonErrorKind, Registry};
use gale_testhelpers::test;

#[derive(Shaped, Default, Debug, PartialEq, Clone)]
struct Order {
    id: u64,
    lines: Vec<Line>,
    customer: Option<Customer>,
}

#[derive(Shaped, Default, Debug, PartialEq, Clone)]
struct Line {
    sku: String,
    qty: u32,
    price: f64,
}

#[derive(Shaped, Default, Debug, PartialEq, Clone)]
struct Customer {
    name: String,
}

#[derive(Shaped, Default, Debug)]
struct HasChar {
    id: u32,
    initial: char,
}

#[derive(Shaped, Default, Debug)]
struct Nursery {
    kids: Vec<Nursery>,
    initial: char,
}

const ORDER: &str = r#"{"id":42,"lines":[{"sku":"x","qty":2,"price":1.25},{"sku":"y","qty":1,"price":10}],"customer":{"name":"Kim"}}"#;

#[test]
fn concurrent_compilation_publishes_one_routine() {
    let registry = Registry::isolated();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let codec = Codec::new().with_registry(registry);
                barrier.wait();
                let order: Order = codec.from_str(ORDER).unwrap();
                let json = codec.encode_to_string(&order).unwrap();
                (order, json)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (order, json) in &results {
        assert_eq!(order.id, 42);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(json, &results[0].1);
    }

    let decoders = registry.decoder_count();
    let first = registry.decoder_for::<Order>().unwrap();
    let second = registry.decoder_for::<Order>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.decoder_count(), decoders);
}

#[test]
fn failed_compilation_is_not_cached() {
    let registry = Registry::isolated();
    let codec = Codec::new().with_registry(registry);

    for _ in 0..3 {
        let err = codec.from_str::<HasChar>(r#"{"id":1}"#).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert!(matches!(
            err.kind(),
            JsonErrorKind::UnsupportedType { type_name: "char", .. }
        ));
        assert!(!registry.has_decoder(TypeId::of::<HasChar>()));
    }

    // Fields compiled before the failure are discarded with it.
    assert!(!registry.has_decoder(TypeId::of::<u32>()));
    assert_eq!(registry.decoder_count(), 0);
    assert!(codec.encode(&HasChar::default()).is_err());
    assert!(!registry.has_encoder(TypeId::of::<HasChar>()));
    assert_eq!(registry.encoder_count(), 0);
}

#[test]
fn failed_recursive_compilation_publishes_nothing() {
    let registry = Registry::isolated();
    let codec = Codec::new().with_registry(registry);

    let err = codec.from_str::<Nursery>("{}").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Type);
    assert!(!registry.has_decoder(TypeId::of::<Vec<Nursery>>()));
    assert!(!registry.has_decoder(TypeId::of::<Nursery>()));
    assert_eq!(registry.decoder_count(), 0);

    // The list compiles through the same failing element, so it fails too.
    let err = codec.from_str::<Vec<Nursery>>("[]").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Type);
    assert_eq!(registry.decoder_count(), 0);

    assert!(codec.encode(&Nursery::default()).is_err());
    assert!(!registry.has_encoder(TypeId::of::<Vec<Nursery>>()));
    assert_eq!(registry.encoder_count(), 0);

    // Unrelated types still compile and publish normally afterwards.
    let order: Order = codec.from_str(ORDER).unwrap();
    assert_eq!(order.id, 42);
    assert!(registry.has_decoder(TypeId::of::<Vec<Line>>()));
}

#[test]
fn separately_compiled_routines_behave_the_same() {
    let a = Codec::new().with_registry(Registry::isolated());
    let b = Codec::new().with_registry(Registry::isolated());

    let from_a: Order = a.from_str(ORDER).unwrap();
    let from_b: Order = b.from_str(ORDER).unwrap();
    assert_eq!(from_a, from_b);
    assert_eq!(
        a.encode_to_string(&from_a).unwrap(),
        b.encode_to_string(&from_b).unwrap()
    );
}

#[test]
fn global_registry_is_shared() {
    let order: Order = gale_json::from_str(ORDER).unwrap();
    assert_eq!(order.customer.as_ref().map(|c| c.name.as_str()), Some("Kim"));
    assert!(Registry::global().has_decoder(TypeId::of::<Order>()));
    assert!(Registry::global().has_decoder(TypeId::of::<Line>()));
}
