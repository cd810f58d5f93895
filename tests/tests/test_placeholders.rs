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

//! Sealed records only exist once all their fields are read, so every
//! reference into one from its own subtree goes through a placeholder.

use pretty_assertions::assert_eq;
use tether::{FieldType, Heap, ObjectId, Record, ReferencePolicy, Value};
use tests::{new_tether, round_trip};

fn frozen(heap: &mut Heap, id: i64) -> ObjectId {
    let links = heap.list(Vec::new());
    heap.record(Record::new("Frozen").with("id", id).with("links", links))
}

fn links(heap: &Heap, id: ObjectId) -> Vec<Value> {
    let list = heap.field(id, "links").and_then(Value::as_object).unwrap();
    heap.list_ref(list).unwrap().to_vec()
}

fn link(heap: &mut Heap, from: ObjectId, to: ObjectId) {
    let list = heap.field(from, "links").and_then(Value::as_object).unwrap();
    let len = heap.list_ref(list).unwrap().len();
    heap.set_index(list, len, Value::Object(to)).unwrap();
}

#[test]
fn test_sealed_self_loop() {
    let mut heap = Heap::new();
    let f = frozen(&mut heap, 1);
    link(&mut heap, f, f);

    let ty = FieldType::class("Frozen");
    let (text, copy, root) = round_trip(&new_tether(ReferencePolicy::CircularOnly), &heap, f, &ty);
    assert_eq!(text, r#"{"id":1,"links":["@root"]}"#);
    assert_eq!(links(&copy, root.as_object().unwrap()), vec![root.clone()]);
    assert!(heap.isomorphic(&Value::Object(f), &copy, &root));
}

#[test]
fn test_sealed_cycle_through_a_child() {
    let mut heap = Heap::new();
    let a = frozen(&mut heap, 1);
    let b = frozen(&mut heap, 2);
    link(&mut heap, a, b);
    link(&mut heap, b, a);
    link(&mut heap, b, b);

    let ty = FieldType::class("Frozen");
    for policy in [
        ReferencePolicy::CircularOnly,
        ReferencePolicy::CircularAndSiblings,
        ReferencePolicy::AllDuplicates,
    ] {
        let (text, copy, root) = round_trip(&new_tether(policy), &heap, a, &ty);
        assert_eq!(
            text,
            r#"{"id":1,"links":[{"id":2,"links":["@root","@root.links.0"]}]}"#
        );
        let a2 = root.as_object().unwrap();
        let b2 = links(&copy, a2)[0].as_object().unwrap();
        assert_eq!(links(&copy, b2), vec![Value::Object(a2), Value::Object(b2)]);
        assert!(heap.isomorphic(&Value::Object(a), &copy, &root));
    }
}

/// `@.0` names a slot that itself still waits for the enclosing record.
#[test]
fn test_sibling_of_a_pending_slot() {
    let mut heap = Heap::new();
    let f = frozen(&mut heap, 1);
    link(&mut heap, f, f);
    link(&mut heap, f, f);

    let ty = FieldType::class("Frozen");
    let tether = new_tether(ReferencePolicy::CircularAndSiblings);
    let (text, copy, root) = round_trip(&tether, &heap, f, &ty);
    assert_eq!(text, r#"{"id":1,"links":["@root","@.0"]}"#);
    assert_eq!(links(&copy, root.as_object().unwrap()), vec![root.clone(), root.clone()]);
    assert!(heap.isomorphic(&Value::Object(f), &copy, &root));
}

#[test]
fn test_chained_sibling_references() {
    let text = r#"{"id":1,"links":["@root","@.0","@.1","@.2"]}"#;
    let ty = FieldType::class("Frozen");
    let (copy, root) = new_tether(ReferencePolicy::CircularAndSiblings)
        .deserialize(text, &ty)
        .unwrap();
    assert_eq!(links(&copy, root.as_object().unwrap()), vec![root.clone(); 4]);
}

#[test]
fn test_completed_sealed_record_is_referenced_by_path() {
    let mut heap = Heap::new();
    let a = frozen(&mut heap, 1);
    let b = frozen(&mut heap, 2);
    let c = frozen(&mut heap, 3);
    link(&mut heap, a, b);
    link(&mut heap, a, c);
    link(&mut heap, c, b);

    let ty = FieldType::class("Frozen");
    let (text, copy, root) = round_trip(&new_tether(ReferencePolicy::AllDuplicates), &heap, a, &ty);
    assert_eq!(
        text,
        r#"{"id":1,"links":[{"id":2,"links":[]},{"id":3,"links":["@root.links.0"]}]}"#
    );
    assert!(heap.isomorphic(&Value::Object(a), &copy, &root));

    let (text, copy, root) = round_trip(&new_tether(ReferencePolicy::CircularOnly), &heap, a, &ty);
    assert_eq!(
        text,
        r#"{"id":1,"links":[{"id":2,"links":[]},{"id":3,"links":[{"id":2,"links":[]}]}]}"#
    );
    let a2 = root.as_object().unwrap();
    let first = links(&copy, a2);
    let c2 = first[1].as_object().unwrap();
    assert_ne!(first[0], links(&copy, c2)[0]);
}
