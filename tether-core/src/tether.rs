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

use tracing::debug;

use crate::buffer::Reader;
use crate::config::Config;
use crate::error::Error;
use crate::heap::{Heap, ObjectId, Value};
use crate::resolver::session::{ReadSession, WriteSession};
use crate::resolver::type_resolver::{ClassDef, FieldType, TypeResolver};
use crate::types::ReferencePolicy;

/// Entry point for writing and reading object graphs.
///
/// A `Tether` holds the configuration and the registered classes. Every
/// [`serialize`](Tether::serialize) or [`deserialize`](Tether::deserialize)
/// call runs its own session, so one instance can be shared freely.
///
/// # Examples
///
/// A node that lists itself as one of its connections:
///
/// ```rust
/// use tether_core::heap::{Heap, Record, Value};
/// use tether_core::resolver::type_resolver::{ClassDef, FieldType};
/// use tether_core::Tether;
///
/// let mut tether = Tether::default();
/// tether
///     .register(
///         ClassDef::new("Node")
///             .field("id", FieldType::Int)
///             .field("connections", FieldType::list(FieldType::class("Node"))),
///     )
///     .unwrap();
///
/// let mut heap = Heap::new();
/// let connections = heap.list(Vec::new());
/// let node = heap.record(Record::new("Node").with("id", 1).with("connections", connections));
/// heap.set_index(connections, 0, Value::Object(node)).unwrap();
///
/// let ty = FieldType::class("Node");
/// let text = tether.serialize(&heap, &Value::Object(node), &ty).unwrap();
/// assert_eq!(text, r#"{"id":1,"connections":["@root"]}"#);
///
/// let (copy, root) = tether.deserialize(&text, &ty).unwrap();
/// assert!(heap.isomorphic(&Value::Object(node), &copy, &root));
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use tether_core::types::ReferencePolicy;
/// use tether_core::Tether;
///
/// let tether = Tether::default()
///     .policy(ReferencePolicy::AllDuplicates)
///     .max_depth(32)
///     .pretty(true);
/// assert_eq!(tether.config().max_depth(), 32);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Tether {
    config: Config,
    type_resolver: TypeResolver,
}

impl Tether {
    /// Sets the reference policy. Writer and reader must use the same one.
    pub fn policy(mut self, policy: ReferencePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Caps the path depth of a single pass.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    pub fn register(&mut self, class: ClassDef) -> Result<(), Error> {
        self.type_resolver.register(class)
    }

    /// Serializes the graph reachable from `root`, declared as `ty`.
    pub fn serialize(&self, heap: &Heap, root: &Value, ty: &FieldType) -> Result<String, Error> {
        debug!(policy = %self.config.policy(), %ty, "serialize");
        let mut session = WriteSession::new(&self.type_resolver, &self.config, heap);
        session.write_root(root, ty)?;
        session.finish()
    }

    /// Reads a document into a fresh heap and returns it with the root value.
    pub fn deserialize(&self, text: &str, ty: &FieldType) -> Result<(Heap, Value), Error> {
        debug!(policy = %self.config.policy(), %ty, len = text.len(), "deserialize");
        let reader = Reader::parse(text)?;
        let mut session = ReadSession::new(&self.type_resolver, &self.config, reader);
        let root = session.read_root(ty)?;
        Ok((session.into_heap(), root))
    }

    /// The value the hash field of record `id` should hold, given the rest of
    /// its fields as they currently are in `heap`.
    pub fn hash_of(&self, heap: &Heap, id: ObjectId) -> Result<i64, Error> {
        let record = heap
            .record_ref(id)
            .ok_or_else(|| Error::invalid_data(format!("{id} is not a record")))?;
        let class = self.type_resolver.get(record.class())?;
        Ok(record.hash_excluding(class.get_hash_field()))
    }
}
