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

//! # Tether Core
//!
//! Identity-preserving serialization of object graphs to JSON.
//!
//! Graphs may share objects and may contain cycles. A write pass tracks which
//! objects it has already written and, depending on the configured
//! [`ReferencePolicy`](types::ReferencePolicy), replaces repeats with textual
//! references such as `"@root.items.0"` or the sibling shorthand `"@.0"`. A
//! read pass consumes the document once, front to back, and rebuilds the same
//! topology, using placeholders for references to objects that are still
//! being constructed.
//!
//! ## Modules
//!
//! - **`tether`**: the [`Tether`] entry point
//! - **`heap`**: arena object model; object identity is the arena handle
//! - **`path`**: positional paths and the reference grammar
//! - **`resolver`**: identity registry, placeholders, read/write sessions,
//!   class registry
//! - **`serializer`**: record, list, map and scalar codecs
//! - **`buffer`**: JSON token writer and reader
//! - **`types`**: reference policies and wire constants
//! - **`config`**, **`error`**, **`util`**
//!
//! ## Policies
//!
//! | policy                | cycles    | duplicates              |
//! |-----------------------|-----------|-------------------------|
//! | `None`                | diverge   | copied                  |
//! | `DetectAndThrow`      | error     | copied                  |
//! | `CircularOnly`        | reference | copied                  |
//! | `CircularAndSiblings` | reference | sibling shorthand only  |
//! | `AllDuplicates`       | reference | referenced              |
//!
//! ## Usage
//!
//! ```rust
//! use tether_core::heap::{Heap, Record, Value};
//! use tether_core::resolver::type_resolver::{ClassDef, FieldType};
//! use tether_core::types::ReferencePolicy;
//! use tether_core::Tether;
//!
//! let mut tether = Tether::default().policy(ReferencePolicy::CircularAndSiblings);
//! tether
//!     .register(ClassDef::new("Node").field("id", FieldType::Int))
//!     .unwrap();
//!
//! let mut heap = Heap::new();
//! let n = heap.record(Record::new("Node").with("id", 7));
//! let pair = heap.list(vec![Value::Object(n), Value::Object(n)]);
//!
//! let ty = FieldType::list(FieldType::class("Node"));
//! let text = tether.serialize(&heap, &Value::Object(pair), &ty).unwrap();
//! assert_eq!(text, r#"[{"id":7},"@.0"]"#);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod heap;
pub mod path;
pub mod resolver;
pub mod serializer;
pub mod tether;
pub mod types;
pub mod util;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::heap::{Heap, ObjectId, Record, Value};
pub use crate::path::{Path, PathElement, Reference};
pub use crate::resolver::type_resolver::{ClassDef, FieldType};
pub use crate::tether::Tether;
pub use crate::types::ReferencePolicy;
