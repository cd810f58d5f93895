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

//! The self-loop, shared-subtree, shared-slot and hash scenarios.

use pretty_assertions::assert_eq;
use tether::{FieldType, Heap, ObjectId, Record, ReferencePolicy, Value};
use tests::{connect, connection, new_tether, node, node_type, nodes_type, round_trip};

#[test]
fn test_self_loop() {
    let mut heap = Heap::new();
    let n = node(&mut heap, 1);
    connect(&mut heap, n, n);

    for policy in [ReferencePolicy::CircularOnly, ReferencePolicy::AllDuplicates] {
        let (text, copy, root) = round_trip(&new_tether(policy), &heap, n, &node_type());
        assert_eq!(text, r#"{"id":1,"connections":["@root"]}"#);
        let n2 = root.as_object().unwrap();
        assert_eq!(connection(&copy, n2, 0), n2);
        assert!(heap.isomorphic(&Value::Object(n), &copy, &root));
    }
}

fn diamond() -> (Heap, [ObjectId; 4]) {
    let mut heap = Heap::new();
    let n1 = node(&mut heap, 1);
    let n2 = node(&mut heap, 2);
    let n3 = node(&mut heap, 3);
    let n4 = node(&mut heap, 4);
    connect(&mut heap, n1, n2);
    connect(&mut heap, n2, n3);
    connect(&mut heap, n2, n4);
    connect(&mut heap, n3, n4);
    (heap, [n1, n2, n3, n4])
}

#[test]
fn test_shared_subtree_is_copied_under_circular_only() {
    let (heap, [n1, ..]) = diamond();
    let (text, copy, root) = round_trip(&new_tether(ReferencePolicy::CircularOnly), &heap, n1, &node_type());
    assert_eq!(
        text,
        concat!(
            r#"{"id":1,"connections":[{"id":2,"connections":["#,
            r#"{"id":3,"connections":[{"id":4,"connections":[]}]},"#,
            r#"{"id":4,"connections":[]}]}]}"#
        )
    );
    let r = root.as_object().unwrap();
    let m2 = connection(&copy, r, 0);
    let m3 = connection(&copy, m2, 0);
    assert_ne!(connection(&copy, m3, 0), connection(&copy, m2, 1));
    assert!(!heap.isomorphic(&Value::Object(n1), &copy, &root));
}

#[test]
fn test_shared_subtree_is_referenced_under_all_duplicates() {
    let (heap, [n1, ..]) = diamond();
    let (text, copy, root) = round_trip(&new_tether(ReferencePolicy::AllDuplicates), &heap, n1, &node_type());
    assert_eq!(
        text,
        concat!(
            r#"{"id":1,"connections":[{"id":2,"connections":["#,
            r#"{"id":3,"connections":[{"id":4,"connections":[]}]},"#,
            r#""@root.connections.0.connections.0.connections.0"]}]}"#
        )
    );
    let r = root.as_object().unwrap();
    let m2 = connection(&copy, r, 0);
    let m3 = connection(&copy, m2, 0);
    assert_eq!(connection(&copy, m3, 0), connection(&copy, m2, 1));
    assert!(heap.isomorphic(&Value::Object(n1), &copy, &root));
}

#[test]
fn test_shared_array_slots() {
    let mut heap = Heap::new();
    let n = node(&mut heap, 1);
    let arr = heap.list(vec![Value::Object(n), Value::Object(n)]);

    for policy in [ReferencePolicy::CircularAndSiblings, ReferencePolicy::AllDuplicates] {
        let (text, copy, root) = round_trip(&new_tether(policy), &heap, arr, &nodes_type());
        assert_eq!(text, r#"[{"id":1,"connections":[]},"@.0"]"#);
        let result = copy.list_ref(root.as_object().unwrap()).unwrap();
        assert_eq!(result[0], result[1]);
        assert!(heap.isomorphic(&Value::Object(arr), &copy, &root));
    }

    let (text, copy, root) = round_trip(&new_tether(ReferencePolicy::CircularOnly), &heap, arr, &nodes_type());
    assert_eq!(text, r#"[{"id":1,"connections":[]},{"id":1,"connections":[]}]"#);
    let result = copy.list_ref(root.as_object().unwrap()).unwrap();
    assert_ne!(result[0], result[1]);
}

/// `Entry` is sealed and hashes over `parent`, which points back at the entry
/// itself, so the hash can only be computed once the entry exists.
#[test]
fn test_hash_over_self_reference() {
    let tether = new_tether(ReferencePolicy::CircularOnly);
    let mut heap = Heap::new();
    let tags = heap.list(Vec::new());
    let entry = heap.record(
        Record::new("Entry")
            .with("label", "e")
            .with("parent", Value::Null)
            .with("tags", tags)
            .with("hash", 0),
    );
    heap.set_field(entry, "parent", Value::Object(entry)).unwrap();

    let ty = FieldType::class("Entry");
    let (text, copy, root) = round_trip(&tether, &heap, entry, &ty);
    assert_eq!(text, r#"{"label":"e","parent":"@root","tags":[],"hash":"@hash"}"#);

    let e2 = root.as_object().unwrap();
    assert_eq!(copy.field(e2, "parent"), Some(&root));
    let stored = copy.field(e2, "hash").and_then(Value::as_int).unwrap();
    assert_eq!(stored, tether.hash_of(&copy, e2).unwrap());
}

/// A non-sealed record whose hash depends on a sealed ancestor that is still
/// being read when the record itself ends.
#[test]
fn test_hash_waits_for_a_forward_reference() {
    let tether = new_tether(ReferencePolicy::CircularOnly);
    let mut heap = Heap::new();
    let tags = heap.list(Vec::new());
    let entry = heap.record(
        Record::new("Entry")
            .with("label", "e")
            .with("parent", Value::Null)
            .with("tags", tags)
            .with("hash", 0),
    );
    let tag = heap.record(
        Record::new("Tag")
            .with("name", "t")
            .with("owner", entry)
            .with("hash", 0),
    );
    heap.set_index(tags, 0, Value::Object(tag)).unwrap();

    let ty = FieldType::class("Entry");
    let (text, copy, root) = round_trip(&tether, &heap, entry, &ty);
    assert_eq!(
        text,
        concat!(
            r#"{"label":"e","parent":null,"#,
            r#""tags":[{"name":"t","owner":"@root","hash":"@hash"}],"hash":"@hash"}"#
        )
    );

    let e2 = root.as_object().unwrap();
    let tags2 = copy.field(e2, "tags").and_then(Value::as_object).unwrap();
    let t2 = copy.list_ref(tags2).unwrap()[0].as_object().unwrap();
    assert_eq!(copy.field(t2, "owner"), Some(&root));

    let tag_hash = copy.field(t2, "hash").and_then(Value::as_int).unwrap();
    assert_eq!(tag_hash, tether.hash_of(&copy, t2).unwrap());
    let entry_hash = copy.field(e2, "hash").and_then(Value::as_int).unwrap();
    assert_eq!(entry_hash, tether.hash_of(&copy, e2).unwrap());
}
