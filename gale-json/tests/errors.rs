use gale::Shaped;
use gale_json::{JsonError, from_str};
use gale_testhelpers::test;
use insta::assert_snapshot;
use miette::Diagnostic;

#[derive(Shaped, Default, Debug)]
struct Point {
    x: i32,
    y: i32,
}

fn message<T: Shaped + Default>(input: &str) -> String {
    match from_str::<T>(input) {
        Ok(_) => panic!("expected {input:?} to fail"),
        Err(err) => err.to_string(),
    }
}

#[test]
fn structural_errors() {
    assert_snapshot!(message::<Point>(r#"{"x" 1}"#), @"expected `:`, found '1' at byte 5");
    assert_snapshot!(message::<Point>(r#"{"x":1 "y":2}"#), @r#"expected `,` or `}`, found '"' at byte 7"#);
    assert_snapshot!(message::<Point>(r#"{"x":1"#), @"unexpected end of input, expected `,` or `}` at byte 6");
    assert_snapshot!(message::<Point>("[1,2]"), @"expected `{`, found '[' at byte 0");
    assert_snapshot!(message::<Point>(r#"{"x":1} {}"#), @"trailing characters after value at byte 8");
}

#[test]
fn literal_and_number_errors() {
    assert_snapshot!(message::<bool>("tru"), @"unexpected end of input, expected `true` at byte 3");
    assert_snapshot!(message::<i64>("01"), @"invalid number: leading zero at byte 0");
    assert_snapshot!(message::<i64>("+1"), @"invalid number: leading `+` at byte 0");
    assert_snapshot!(message::<i64>("12.3"), @"invalid number: fraction or exponent in an integer at byte 2");
    assert_snapshot!(message::<u8>("300"), @"number out of range for u8 at byte 0");
    assert_snapshot!(message::<u8>("[1]"), @"expected a digit, found '[' at byte 0");
}

#[test]
fn string_errors() {
    assert_snapshot!(message::<String>(r#""\x""#), @r#"invalid escape sequence \'x' at byte 2"#);
    assert_snapshot!(message::<String>(r#""\u12g4""#), @r#"invalid hex digit 'g' in \u escape at byte 5"#);
    assert_snapshot!(message::<String>("\"a\u{1}\""), @"unescaped control character 0x01 in string at byte 2");
    assert_snapshot!(message::<String>(r#""open"#), @r#"unexpected end of input, expected closing `"` at byte 5"#);
}

#[test]
fn unsupported_types() {
    assert_snapshot!(message::<char>(r#""c""#), @"unsupported type `char`: `char` values have no JSON mapping");
}

#[test]
fn diagnostics_point_into_the_input() {
    let err: JsonError = from_str::<Point>(r#"{"x":true}"#).unwrap_err();
    assert_eq!(err.code().map(|c| c.to_string()).as_deref(), Some("json::unexpected_byte"));
    assert!(err.source_code().is_some());

    let labels: Vec<_> = err.labels().unwrap().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 5);
}
