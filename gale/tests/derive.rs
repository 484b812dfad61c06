use std::collections::HashMap;

use gale::{Def, ScalarKind, Shape, Shaped, StructDef};

#[derive(Shaped, Default, Debug, PartialEq)]
struct Account {
    id: i64,
    name: String,
    #[gale(tag = "Balance,omitempty")]
    balance: f64,
    #[gale(ignore)]
    scratch: Vec<u8>,
    #[gale(tag = "-")]
    hidden: bool,
    labels: HashMap<String, String>,
}

#[derive(Shaped, Default)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

fn struct_def(shape: Shape) -> StructDef {
    match shape.def {
        Def::Struct(def) => def,
        other => panic!("expected a struct, got {other:?}"),
    }
}

#[gale_testhelpers::test]
fn derived_fields_follow_declaration_order() {
    let def = struct_def(Account::shape());
    let names: Vec<&str> = def.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, ["id", "name", "balance", "labels"]);

    let wire: Vec<&str> = def.fields.iter().map(|f| f.wire_name()).collect();
    assert_eq!(wire, ["id", "name", "Balance", "labels"]);

    assert!(matches!(def.fields[0].shape().def, Def::Scalar(ScalarKind::I64)));
    assert!(matches!(def.fields[3].shape().def, Def::Map(_)));
}

#[gale_testhelpers::test]
fn derived_accessors_read_and_write() {
    let def = struct_def(Account::shape());
    let mut account = Account::default();

    let name = (def.fields[1].get_mut)(&mut account).unwrap();
    *name.downcast_mut::<String>().unwrap() = "Gemini".to_string();
    let balance = (def.fields[2].get_mut)(&mut account).unwrap();
    *balance.downcast_mut::<f64>().unwrap() = 99.99;

    assert_eq!(account.name, "Gemini");
    assert_eq!(account.balance, 99.99);

    let id = (def.fields[0].get)(&account).unwrap();
    assert_eq!(id.downcast_ref::<i64>(), Some(&0));
}

#[gale_testhelpers::test]
fn accessors_reject_foreign_values() {
    let def = struct_def(Account::shape());
    let not_an_account = 5_u8;
    let err = (def.fields[0].get)(&not_an_account).unwrap_err();
    assert!(err.expected.ends_with("Account"));
}

#[gale_testhelpers::test]
fn recursive_struct_shape_is_lazy() {
    let def = struct_def(Node::shape());
    let next = def.fields[1].shape();
    let Def::Option(opt) = next.def else {
        panic!("expected an option");
    };
    let Def::Pointer(ptr) = (opt.inner)().def else {
        panic!("expected a pointer");
    };
    assert_eq!((ptr.pointee)(), Node::shape());
}
