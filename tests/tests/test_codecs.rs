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

use pretty_assertions::assert_eq;
use tether::{FieldType, Heap, Record, ReferencePolicy, Value};
use tests::{new_tether, node, node_type, round_trip};

fn cell_type() -> FieldType {
    FieldType::class("Cell")
}

#[test]
fn test_sibling_shorthand_escapes_map_keys() {
    let tether = new_tether(ReferencePolicy::AllDuplicates);
    let mut heap = Heap::new();
    let n = node(&mut heap, 1);
    let root = heap.map(vec![
        ("a.b".to_string(), Value::Object(n)),
        ("0".to_string(), Value::Object(n)),
    ]);
    let ty = FieldType::map(node_type());

    let (text, copy, value) = round_trip(&tether, &heap, root, &ty);
    assert_eq!(text, r#"{"a.b":{"id":1,"connections":[]},"0":"@.a\\.b"}"#);
    assert!(heap.isomorphic(&Value::Object(root), &copy, &value));

    let entries = copy.map_ref(value.as_object().unwrap()).unwrap();
    assert_eq!(entries[0].1, entries[1].1);
}

#[test]
fn test_full_reference_escapes_a_numeric_key() {
    let tether = new_tether(ReferencePolicy::AllDuplicates);
    let mut heap = Heap::new();
    let n = node(&mut heap, 1);
    let first = heap.map(vec![("0".to_string(), Value::Object(n))]);
    let second = heap.map(vec![("y".to_string(), Value::Object(n))]);
    let root = heap.list(vec![Value::Object(first), Value::Object(second)]);
    let ty = FieldType::list(FieldType::map(node_type()));

    let (text, copy, value) = round_trip(&tether, &heap, root, &ty);
    assert_eq!(
        text,
        r#"[{"0":{"id":1,"connections":[]}},{"y":"@root.0.\\0"}]"#
    );
    assert!(heap.isomorphic(&Value::Object(root), &copy, &value));
}

#[test]
fn test_hand_written_escaped_references() {
    let tether = new_tether(ReferencePolicy::AllDuplicates);
    let ty = FieldType::list(FieldType::map(node_type()));
    let text = r#"[{"a.b":{"id":1,"connections":[]},"c":"@root.0.a\\.b","d":"@.c"}]"#;
    let (heap, root) = tether.deserialize(text, &ty).unwrap();

    let list = heap.list_ref(root.as_object().unwrap()).unwrap();
    let entries = heap.map_ref(list[0].as_object().unwrap()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].1, entries[1].1);
    assert_eq!(entries[1].1, entries[2].1);
}

#[test]
fn test_scalars_round_trip() {
    let tether = new_tether(ReferencePolicy::CircularOnly);
    let mut heap = Heap::new();
    let cell = heap.record(
        Record::new("Cell")
            .with("label", "@root")
            .with("value", 3)
            .with("ratio", 2.5)
            .with("on", true),
    );

    let (text, copy, value) = round_trip(&tether, &heap, cell, &cell_type());
    assert_eq!(text, r#"{"label":"@root","value":3,"ratio":2.5,"on":true}"#);
    let record = copy.record_ref(value.as_object().unwrap()).unwrap();
    assert_eq!(record.get("label"), Some(&Value::from("@root")));
    assert_eq!(record.get("ratio"), Some(&Value::Float(2.5)));
}

#[test]
fn test_scalar_fields_accept_any_scalar() {
    let tether = new_tether(ReferencePolicy::CircularOnly);
    for (json, expected) in [
        ("null", Value::Null),
        ("false", Value::Bool(false)),
        ("-4", Value::Int(-4)),
        ("0.5", Value::Float(0.5)),
        (r#""@.x""#, Value::from("@.x")),
    ] {
        let text = format!(r#"{{"value":{json}}}"#);
        let (heap, root) = tether.deserialize(&text, &cell_type()).unwrap();
        let record = heap.record_ref(root.as_object().unwrap()).unwrap();
        assert_eq!(record.get("value"), Some(&expected), "{text}");
    }
}

#[test]
fn test_float_field_accepts_an_integer_token() {
    let tether = new_tether(ReferencePolicy::CircularOnly);
    let (heap, root) = tether.deserialize(r#"{"ratio":2}"#, &cell_type()).unwrap();
    let record = heap.record_ref(root.as_object().unwrap()).unwrap();
    assert_eq!(record.get("ratio"), Some(&Value::Float(2.0)));
}

#[test]
fn test_null_in_composite_positions() {
    let tether = new_tether(ReferencePolicy::AllDuplicates);
    let (heap, root) = tether
        .deserialize(r#"[null,{"id":1,"connections":null}]"#, &tests::nodes_type())
        .unwrap();
    let list = heap.list_ref(root.as_object().unwrap()).unwrap();
    assert_eq!(list[0], Value::Null);
    let second = heap.record_ref(list[1].as_object().unwrap()).unwrap();
    assert_eq!(second.get("connections"), Some(&Value::Null));
}

#[test]
fn test_pretty_output() {
    let tether = new_tether(ReferencePolicy::CircularOnly).pretty(true);
    let mut heap = Heap::new();
    let point = heap.record(Record::new("Point").with("x", 1).with("y", 2));
    let text = tether
        .serialize(&heap, &Value::Object(point), &FieldType::class("Point"))
        .unwrap();
    assert_eq!(text, "{\n  \"x\": 1,\n  \"y\": 2\n}");
    let (copy, value) = tether.deserialize(&text, &FieldType::class("Point")).unwrap();
    assert!(heap.isomorphic(&Value::Object(point), &copy, &value));
}

#[test]
fn test_mixed_containers() {
    let tether = new_tether(ReferencePolicy::CircularAndSiblings);
    let mut heap = Heap::new();
    let left = heap.list(vec![Value::Int(1), Value::Int(2)]);
    let right = heap.map(vec![("k".to_string(), Value::Int(3))]);
    let pair = heap.record(
        Record::new("Pair")
            .with("left", left)
            .with("right", right),
    );
    let (text, copy, value) = round_trip(&tether, &heap, pair, &FieldType::class("Pair"));
    assert_eq!(text, r#"{"left":[1,2],"right":{"k":3}}"#);
    assert!(heap.isomorphic(&Value::Object(pair), &copy, &value));
}
