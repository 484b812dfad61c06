use std::collections::{BTreeMap, HashMap};

use gale::Shaped;
use gale_json::{ErrorCategory, JsonErrorKind, decode, from_slice, from_str};
use gale_testhelpers::test;

#[derive(Shaped, Default, Debug, PartialEq)]
struct Record {
    id: i64,
    name: String,
    is_active: bool,
    #[gale(tag = "Balance")]
    balance: f64,
}

#[derive(Shaped, Default, Debug, PartialEq)]
struct Inventory {
    owner: Record,
    items: Vec<Item>,
    counts: BTreeMap<String, u32>,
    note: Option<String>,
}

#[derive(Shaped, Default, Debug, PartialEq)]
struct Item {
    sku: String,
    qty: u16,
    tags: Vec<String>,
}

#[derive(Shaped, Default, Debug, PartialEq)]
struct Tree {
    label: String,
    children: Vec<Tree>,
    parent_hint: Option<Box<Tree>>,
}

#[derive(Shaped, Default, Debug, PartialEq)]
struct WithSkipped {
    kept: u8,
    #[gale(ignore)]
    local: u8,
    #[gale(tag = "-")]
    hidden: u8,
}

#[test]
fn unknown_fields_are_skipped() {
    let input = r#"{"id":101,"name":"Gemini","is_active":true,"Balance":99.99,"extra":{"a":[1,2,3]}}"#;
    let record: Record = from_str(input).unwrap();
    assert_eq!(
        record,
        Record {
            id: 101,
            name: "Gemini".to_string(),
            is_active: true,
            balance: 99.99,
        }
    );
}

#[test]
fn keys_match_exactly() {
    let record: Record = from_str(r#"{"ID":1,"Name":"x","balance":2.5}"#).unwrap();
    assert_eq!(record, Record::default());
}

#[test]
fn absent_fields_keep_their_value() {
    let mut record = Record {
        id: 7,
        name: "before".to_string(),
        is_active: true,
        balance: 1.0,
    };
    decode(br#"{"name":"after"}"#, &mut record).unwrap();
    assert_eq!(record.id, 7);
    assert_eq!(record.name, "after");
    assert!(record.is_active);
}

#[test]
fn nested_structures() {
    let input = r#"
        {
            "owner": {"id": 1, "name": "Ada", "is_active": false, "Balance": 0},
            "items": [
                {"sku": "a-1", "qty": 3, "tags": ["red", "small"]},
                {"sku": "b-2", "qty": 0, "tags": null}
            ],
            "counts": {"b": 2, "a": 1},
            "note": null
        }
    "#;
    let inventory: Inventory = from_str(input).unwrap();
    assert_eq!(inventory.owner.name, "Ada");
    assert_eq!(inventory.items.len(), 2);
    assert_eq!(inventory.items[0].tags, ["red", "small"]);
    assert!(inventory.items[1].tags.is_empty());
    assert_eq!(inventory.counts.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(inventory.note, None);
}

#[test]
fn twenty_element_list() {
    let input = format!(
        "[{}]",
        (1..=20).map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
    );
    let list: Vec<i32> = from_str(&input).unwrap();
    assert_eq!(list.len(), 20);
    assert_eq!(list, (1..=20).collect::<Vec<_>>());
}

#[test]
fn recursive_types() {
    let input = r#"{
        "label": "root",
        "children": [
            {"label": "a", "children": [{"label": "a.1"}]},
            {"label": "b", "parent_hint": {"label": "root"}}
        ]
    }"#;
    let tree: Tree = from_str(input).unwrap();
    assert_eq!(tree.children[0].children[0].label, "a.1");
    assert_eq!(
        tree.children[1].parent_hint.as_deref().map(|t| t.label.as_str()),
        Some("root")
    );
}

#[test]
fn ignored_fields_are_not_on_the_wire() {
    let value: WithSkipped = from_str(r#"{"kept":1,"local":2,"hidden":3}"#).unwrap();
    assert_eq!(
        value,
        WithSkipped {
            kept: 1,
            local: 0,
            hidden: 0,
        }
    );
}

#[test]
fn maps_into_existing_values() {
    let mut map: HashMap<String, Vec<u8>> = HashMap::new();
    map.insert("keep".to_string(), vec![9]);
    decode(br#"{"new":[1,2]}"#, &mut map).unwrap();
    assert_eq!(map["keep"], [9]);
    assert_eq!(map["new"], [1, 2]);

    decode(b"null", &mut map).unwrap();
    assert!(map.is_empty());
}

#[test]
fn whitespace_everywhere() {
    let record: Record = from_slice(b" \t\r\n{ \"id\" : 5 , \"name\" : \"n\" } \n").unwrap();
    assert_eq!(record.id, 5);
    assert_eq!(record.name, "n");
}

#[test]
fn syntax_errors_carry_offsets() {
    let err = from_str::<Record>(r#"{"id" 1}"#).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);
    assert_eq!(err.offset(), Some(6));

    let err = from_str::<Record>(r#"{"id":1,}"#).unwrap_err();
    assert_eq!(err.offset(), Some(8));

    let err = from_str::<Vec<u8>>("[1 2]").unwrap_err();
    assert!(matches!(
        err.kind(),
        JsonErrorKind::UnexpectedByte { found: b'2', .. }
    ));

    let err = from_str::<Record>(r#"{"id":1"#).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TruncatedInput);
}

#[test]
fn skipped_values_are_validated() {
    let err = from_str::<Record>(r#"{"extra":[1,,2],"id":1}"#).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);
    assert_eq!(err.offset(), Some(12));
}

#[test]
fn number_rules() {
    assert_eq!(from_str::<i64>("0").unwrap(), 0);
    assert_eq!(from_str::<i64>("-0").unwrap(), 0);
    assert_eq!(from_str::<u64>("18446744073709551615").unwrap(), u64::MAX);

    for bad in ["01", "+1", "12.3", "1e5", "-a"] {
        let err = from_str::<i64>(bad).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax, "{bad}");
    }
    assert_eq!(from_str::<f64>("12.3").unwrap(), 12.3);

    for out_of_range in ["9223372036854775808", "18446744073709551616"] {
        let err = from_str::<i64>(out_of_range).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range, "{out_of_range}");
    }
    assert_eq!(
        from_str::<u8>("300").unwrap_err().kind(),
        &JsonErrorKind::NumberOutOfRange { target: "u8" }
    );
}

#[test]
fn strings_with_escapes() {
    let s: String = from_str(r#""a\"b\\c\/d\n\t\u0041""#).unwrap();
    assert_eq!(s, "a\"b\\c/d\n\tA");

    let s: String = from_str(r#""é😀""#).unwrap();
    assert_eq!(s, "\u{e9}\u{1f600}");

    let err = from_str::<String>(r#""\ud83d""#).unwrap_err();
    assert_eq!(err.kind(), &JsonErrorKind::InvalidSurrogate);
    assert_eq!(err.category(), ErrorCategory::Range);
}

#[test]
fn hostile_nesting_hits_the_depth_limit() {
    let input = "[".repeat(10_000);
    let err = gale_json::decode_value(input.as_bytes()).unwrap_err();
    assert!(matches!(
        err.kind(),
        JsonErrorKind::DepthLimitExceeded { limit: 128 }
    ));

    let input = format!(r#"{{"extra":{}}}"#, "[".repeat(10_000));
    let err = from_str::<Record>(&input).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Range);
}
