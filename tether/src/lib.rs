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

//! # Tether
//!
//! Tether writes in-memory object graphs to JSON and reads them back with the
//! same identity structure: an object reached twice comes back as one object,
//! and a cycle comes back as a cycle.
//!
//! ## Key Features
//!
//! - **Identity preservation**: repeated objects are written once and
//!   referenced by path afterwards
//! - **Cycles**: self-loops and longer cycles round-trip exactly
//! - **Single forward pass**: the reader never backtracks; references to
//!   objects still under construction are patched once those objects exist
//! - **Five reference policies**, from no tracking at all to referencing
//!   every duplicate
//!
//! ## Object Model
//!
//! Graphs live in a [`Heap`]. Records, lists and string-keyed maps are heap
//! objects addressed by [`ObjectId`]; scalars are stored inline. Record
//! classes are declared with [`ClassDef`] and registered on a [`Tether`].
//!
//! ```rust
//! use tether::{ClassDef, FieldType, Heap, Record, ReferencePolicy, Tether, Value};
//!
//! let mut tether = Tether::default().policy(ReferencePolicy::AllDuplicates);
//! tether
//!     .register(
//!         ClassDef::new("Person")
//!             .field("name", FieldType::Str)
//!             .field("friends", FieldType::list(FieldType::class("Person"))),
//!     )
//!     .unwrap();
//!
//! let mut heap = Heap::new();
//! let alice_friends = heap.list(Vec::new());
//! let bob_friends = heap.list(Vec::new());
//! let alice = heap.record(Record::new("Person").with("name", "alice").with("friends", alice_friends));
//! let bob = heap.record(Record::new("Person").with("name", "bob").with("friends", bob_friends));
//! heap.set_index(alice_friends, 0, Value::Object(bob)).unwrap();
//! heap.set_index(bob_friends, 0, Value::Object(alice)).unwrap();
//!
//! let ty = FieldType::class("Person");
//! let json = tether.serialize(&heap, &Value::Object(alice), &ty).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"name":"alice","friends":[{"name":"bob","friends":["@root"]}]}"#
//! );
//!
//! let (copy, root) = tether.deserialize(&json, &ty).unwrap();
//! assert!(heap.isomorphic(&Value::Object(alice), &copy, &root));
//! ```
//!
//! ## Reference Syntax
//!
//! - `"@root"`, `"@root.friends.0"`: the value first written at that path
//! - `"@.0"`: a sibling, i.e. a child of the same parent
//! - `"@hash"`: stands in for a record's declared hash field
//!
//! References appear only where the declared type is a record, list or map,
//! so a string field that happens to start with `@` is read as plain text.
//!
//! ## Error Handling
//!
//! Every fallible call returns [`Error`]:
//!
//! ```rust
//! use tether::{Error, FieldType, ReferencePolicy, Tether};
//!
//! let tether = Tether::default().policy(ReferencePolicy::CircularOnly);
//! let ty = FieldType::list(FieldType::list(FieldType::Int));
//! let result = tether.deserialize(r#"[[1],"@root.0"]"#, &ty);
//! // a non-ancestor reference could not have been written under CircularOnly
//! assert!(matches!(result, Err(Error::IllegalReference { .. })));
//! ```
//!
//! ## Getting Started
//!
//! ```toml
//! [dependencies]
//! tether = "0.1"
//! ```

pub use tether_core::{
    error::Error, heap::Heap, heap::ObjectId, heap::Object, heap::Record, heap::Value,
    path::Path, path::PathElement, path::Reference, resolver::type_resolver::ClassDef,
    resolver::type_resolver::FieldType, tether::Tether, types::ReferencePolicy, Config,
};
