// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use tether::{Error, FieldType, Heap, Record, ReferencePolicy, Tether, Value};
use tests::{connect, new_tether, node, node_type, nodes_type};

fn read_err(policy: ReferencePolicy, text: &str, ty: &FieldType) -> Error {
    new_tether(policy).deserialize(text, ty).unwrap_err()
}

#[test]
fn test_missing_reference() {
    let err = read_err(
        ReferencePolicy::AllDuplicates,
        r#"["@root.1",{"id":1,"connections":[]}]"#,
        &nodes_type(),
    );
    match err {
        Error::MissingReference { reference, at } => {
            assert_eq!(reference, "@root.1");
            assert_eq!(at, "@root.0");
        }
        other => panic!("unexpected error {other}"),
    }

    // a sibling that has not been read yet
    let err = read_err(
        ReferencePolicy::CircularAndSiblings,
        r#"["@.1",{"id":1,"connections":[]}]"#,
        &nodes_type(),
    );
    assert!(matches!(err, Error::MissingReference { .. }));
}

#[test]
fn test_malformed_reference() {
    for text in [r#"["@rooted"]"#, r#"["@root.01"]"#, r#"["@"]"#, r#"["plain"]"#] {
        let err = read_err(ReferencePolicy::AllDuplicates, text, &nodes_type());
        assert!(matches!(err, Error::InvalidData(_)), "{text}: {err}");
    }
}

#[test]
fn test_hash_token_outside_a_hash_field() {
    let err = read_err(ReferencePolicy::AllDuplicates, r#"["@hash"]"#, &nodes_type());
    assert!(matches!(err, Error::InvalidData(_)));

    let err = read_err(
        ReferencePolicy::CircularOnly,
        r#"{"name":"t","owner":null,"hash":12}"#,
        &FieldType::class("Tag"),
    );
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_duplicate_keys() {
    let err = read_err(
        ReferencePolicy::CircularOnly,
        r#"{"a":1,"b":2,"a":3}"#,
        &FieldType::map(FieldType::Int),
    );
    match err {
        Error::DuplicateKey { key, at } => {
            assert_eq!(key, "a");
            assert_eq!(at, "@root");
        }
        other => panic!("unexpected error {other}"),
    }

    let err = read_err(
        ReferencePolicy::CircularOnly,
        r#"{"id":1,"connections":[],"id":2}"#,
        &node_type(),
    );
    assert!(matches!(err, Error::DuplicateKey { .. }));
}

#[test]
fn test_type_mismatch_on_read() {
    let err = read_err(
        ReferencePolicy::CircularOnly,
        r#"{"id":"one","connections":[]}"#,
        &node_type(),
    );
    match err {
        Error::TypeMismatch { expected, found, at } => {
            assert_eq!(expected, "int");
            assert_eq!(found, "string");
            assert_eq!(at, "@root.id");
        }
        other => panic!("unexpected error {other}"),
    }

    let err = read_err(ReferencePolicy::CircularOnly, r#"{"id":1,"connections":{}}"#, &node_type());
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_reference_to_a_value_of_the_wrong_type() {
    let err = read_err(
        ReferencePolicy::AllDuplicates,
        r#"{"left":[1],"right":"@.left"}"#,
        &FieldType::class("Pair"),
    );
    assert!(matches!(err, Error::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_type_mismatch_on_write() {
    let tether = new_tether(ReferencePolicy::CircularOnly);
    let mut heap = Heap::new();
    let bad = heap.record(Record::new("Node").with("id", "one"));
    let err = tether
        .serialize(&heap, &Value::Object(bad), &node_type())
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let list = heap.list(Vec::new());
    let err = tether
        .serialize(&heap, &Value::Object(list), &node_type())
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let cell = heap.record(Record::new("Cell").with("ratio", f64::NAN));
    let err = tether
        .serialize(&heap, &Value::Object(cell), &FieldType::class("Cell"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn test_unknown_field_and_class() {
    let err = read_err(ReferencePolicy::CircularOnly, r#"{"id":1,"colour":2}"#, &node_type());
    assert!(matches!(err, Error::UnknownField { .. }));

    let tether = new_tether(ReferencePolicy::CircularOnly);
    let mut heap = Heap::new();
    let n = heap.record(Record::new("Node").with("colour", 2));
    let err = tether
        .serialize(&heap, &Value::Object(n), &node_type())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField { .. }));

    assert!(!tether.get_type_resolver().contains("Ghost"));
    let err = read_err(ReferencePolicy::CircularOnly, "{}", &FieldType::class("Ghost"));
    assert!(matches!(err, Error::UnknownClass(_)));
}

#[test]
fn test_depth_limit() {
    let mut tether = Tether::default().max_depth(3);
    for class in tests::classes() {
        tether.register(class).unwrap();
    }

    let mut heap = Heap::new();
    let a = node(&mut heap, 1);
    let b = node(&mut heap, 2);
    let c = node(&mut heap, 3);
    connect(&mut heap, a, b);
    connect(&mut heap, b, c);

    let err = tether
        .serialize(&heap, &Value::Object(a), &node_type())
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)));

    let text = new_tether(ReferencePolicy::CircularOnly)
        .serialize(&heap, &Value::Object(a), &node_type())
        .unwrap();
    let err = tether.deserialize(&text, &node_type()).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)));

    // one level shallower fits
    let shallow = heap.list(vec![Value::Object(c)]);
    assert!(tether
        .serialize(&heap, &Value::Object(shallow), &nodes_type())
        .is_ok());
}

#[test]
fn test_malformed_json() {
    let err = read_err(ReferencePolicy::CircularOnly, r#"{"id":1"#, &node_type());
    assert!(matches!(err, Error::Json(_)));
    let err = read_err(ReferencePolicy::CircularOnly, r#"{"id":1} 2"#, &node_type());
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_root_reference_is_rejected() {
    let err = read_err(ReferencePolicy::AllDuplicates, r#""@root""#, &node_type());
    assert!(matches!(err, Error::MissingReference { .. }), "{err}");
    let err = read_err(ReferencePolicy::AllDuplicates, r#""@.0""#, &node_type());
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn test_sibling_reference_to_the_hash_slot() {
    let err = read_err(
        ReferencePolicy::CircularAndSiblings,
        r#"{"name":"t","hash":"@hash","owner":"@.hash"}"#,
        &FieldType::class("Tag"),
    );
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn test_sibling_reference_to_a_pending_slot_of_another_type() {
    let err = read_err(
        ReferencePolicy::CircularAndSiblings,
        r#"{"label":"e","parent":"@root","tags":"@.parent","hash":"@hash"}"#,
        &FieldType::class("Entry"),
    );
    match err {
        Error::TypeMismatch { expected, found, at } => {
            assert_eq!(expected, "list<Tag>");
            assert_eq!(found, "Entry");
            assert_eq!(at, "@root.tags");
        }
        other => panic!("unexpected error {other}"),
    }
}
