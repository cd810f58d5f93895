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

//! Arena-backed object graphs.
//!
//! Every composite value lives in a [`Heap`] slot and is addressed by an
//! [`ObjectId`]. The id is the object's identity for the whole lifetime of the
//! heap, which is what the write-side registry keys on; two objects with equal
//! contents are still two objects.
//!
//! ```
//! use tether_core::heap::{Heap, Record, Value};
//!
//! let mut heap = Heap::new();
//! let node = heap.record(Record::new("Node").with("id", 1));
//! let connections = heap.list(vec![Value::Object(node)]);
//! heap.set_field(node, "connections", Value::Object(connections)).unwrap();
//!
//! // the node now contains itself
//! let list = heap.list_ref(connections).unwrap();
//! assert_eq!(list[0], Value::Object(node));
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::error::Error;
use crate::path::PathElement;
use crate::util::murmurhash3_x64_128;

const HASH_SEED: u64 = 47;

/// Stable handle of a heap slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value stored in a field, list slot or map entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(ObjectId),
}

impl Value {
    #[inline(always)]
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

/// An instance of a registered class: ordered named fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    class: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Record {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(field, value)| (field == name).then_some(value))
    }

    /// Replaces the field's value, appending the field if it is new.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Identity hash of the record over every field except `skip`.
    pub fn hash_excluding(&self, skip: Option<&str>) -> i64 {
        hash_record(
            &self.class,
            self.fields
                .iter()
                .filter(|(name, _)| Some(name.as_str()) != skip)
                .map(|(name, value)| (name.as_str(), value)),
        )
    }
}

/// Hashes a class name and an ordered field list.
///
/// Scalars contribute their contents and object references contribute their
/// [`ObjectId`], so the result is an identity hash: it is stable within one
/// heap and meaningless in another.
pub fn hash_record<'a, I>(class: &str, fields: I) -> i64
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut bytes = Vec::with_capacity(64);
    bytes.extend_from_slice(class.as_bytes());
    bytes.push(0);
    for (name, value) in fields {
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(0);
        match value {
            Value::Null => bytes.push(0),
            Value::Bool(v) => bytes.extend_from_slice(&[1, *v as u8]),
            Value::Int(v) => {
                bytes.push(2);
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            Value::Float(v) => {
                bytes.push(3);
                bytes.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            Value::Str(v) => {
                bytes.push(4);
                bytes.extend_from_slice(&(v.len() as u64).to_le_bytes());
                bytes.extend_from_slice(v.as_bytes());
            }
            Value::Object(id) => {
                bytes.push(5);
                bytes.extend_from_slice(&id.0.to_le_bytes());
            }
        }
    }
    murmurhash3_x64_128(&bytes, HASH_SEED).0 as i64
}

/// A heap slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Record(Record),
    List(Vec<Value>),
    /// String-keyed map; entries keep insertion order.
    Map(Vec<(String, Value)>),
}

impl Object {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Object::Record(_) => "record",
            Object::List(_) => "list",
            Object::Map(_) => "map",
        }
    }

    /// The object's children in write order.
    pub fn children(&self) -> Vec<(PathElement, &Value)> {
        match self {
            Object::Record(record) => record
                .fields
                .iter()
                .map(|(name, value)| (PathElement::Field(name.clone()), value))
                .collect(),
            Object::List(values) => values
                .iter()
                .enumerate()
                .map(|(index, value)| (PathElement::Index(index), value))
                .collect(),
            Object::Map(entries) => entries
                .iter()
                .map(|(key, value)| (PathElement::Field(key.clone()), value))
                .collect(),
        }
    }

    pub fn slot(&self, element: &PathElement) -> Option<&Value> {
        match (self, element) {
            (Object::Record(record), PathElement::Field(name)) => record.get(name),
            (Object::List(values), PathElement::Index(index)) => values.get(*index),
            (Object::Map(entries), PathElement::Field(key)) => entries
                .iter()
                .find_map(|(k, value)| (k == key).then_some(value)),
            _ => None,
        }
    }
}

/// Arena of objects.
#[derive(Clone, Debug, Default)]
pub struct Heap {
    objects: Vec<Object>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn alloc(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn record(&mut self, record: Record) -> ObjectId {
        self.alloc(Object::Record(record))
    }

    pub fn list(&mut self, values: Vec<Value>) -> ObjectId {
        self.alloc(Object::List(values))
    }

    pub fn map(&mut self, entries: Vec<(String, Value)>) -> ObjectId {
        self.alloc(Object::Map(entries))
    }

    #[inline(always)]
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    #[inline(always)]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.index())
    }

    pub fn record_ref(&self, id: ObjectId) -> Option<&Record> {
        match self.get(id)? {
            Object::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn list_ref(&self, id: ObjectId) -> Option<&[Value]> {
        match self.get(id)? {
            Object::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn map_ref(&self, id: ObjectId) -> Option<&[(String, Value)]> {
        match self.get(id)? {
            Object::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The value of `field` on the record `id`, if both exist.
    pub fn field(&self, id: ObjectId, field: &str) -> Option<&Value> {
        self.record_ref(id)?.get(field)
    }

    pub fn set_field(&mut self, id: ObjectId, field: &str, value: Value) -> Result<(), Error> {
        match self.get_mut(id) {
            Some(Object::Record(record)) => {
                record.set(field, value);
                Ok(())
            }
            other => Err(slot_mismatch(id, "record", other.map(|o| o.kind_name()))),
        }
    }

    /// Writes list slot `index`; `index == len` appends.
    pub fn set_index(&mut self, id: ObjectId, index: usize, value: Value) -> Result<(), Error> {
        match self.get_mut(id) {
            Some(Object::List(values)) => {
                if index < values.len() {
                    values[index] = value;
                } else if index == values.len() {
                    values.push(value);
                } else {
                    return Err(Error::invalid_data(format!(
                        "list slot {index} of {id} is past its end ({})",
                        values.len()
                    )));
                }
                Ok(())
            }
            other => Err(slot_mismatch(id, "list", other.map(|o| o.kind_name()))),
        }
    }

    pub fn set_entry(&mut self, id: ObjectId, key: &str, value: Value) -> Result<(), Error> {
        match self.get_mut(id) {
            Some(Object::Map(entries)) => {
                match entries.iter_mut().find(|(k, _)| k == key) {
                    Some((_, slot)) => *slot = value,
                    None => entries.push((key.to_string(), value)),
                }
                Ok(())
            }
            other => Err(slot_mismatch(id, "map", other.map(|o| o.kind_name()))),
        }
    }

    /// Writes whichever slot `element` names on `id`.
    pub fn set_slot(&mut self, id: ObjectId, element: &PathElement, value: Value) -> Result<(), Error> {
        match (self.get(id), element) {
            (Some(Object::Record(_)), PathElement::Field(name)) => self.set_field(id, name, value),
            (Some(Object::List(_)), PathElement::Index(index)) => self.set_index(id, *index, value),
            (Some(Object::Map(_)), PathElement::Field(key)) => self.set_entry(id, key, value),
            (object, _) => Err(Error::invalid_data(format!(
                "{} {id} has no slot `{element}`",
                object.map_or("missing object", Object::kind_name)
            ))),
        }
    }

    /// Whether the graph reachable from `root` has the same shape as the graph
    /// reachable from `other_root` in `other`, with the same identity sharing.
    ///
    /// Object ids are matched through a bijection built during the walk, so two
    /// graphs only compare equal if every shared object on one side is shared
    /// at the same positions on the other.
    pub fn isomorphic(&self, root: &Value, other: &Heap, other_root: &Value) -> bool {
        let mut forward: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut backward: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut queue: VecDeque<(ObjectId, ObjectId)> = VecDeque::new();

        let mut pair = |a: &Value, b: &Value, queue: &mut VecDeque<(ObjectId, ObjectId)>| -> bool {
            match (a, b) {
                (Value::Object(x), Value::Object(y)) => {
                    match (forward.get(x), backward.get(y)) {
                        (Some(mapped), _) => mapped == y,
                        (None, Some(_)) => false,
                        (None, None) => {
                            forward.insert(*x, *y);
                            backward.insert(*y, *x);
                            queue.push_back((*x, *y));
                            true
                        }
                    }
                }
                (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits() || x == y,
                (x, y) => x == y,
            }
        };

        if !pair(root, other_root, &mut queue) {
            return false;
        }
        while let Some((x, y)) = queue.pop_front() {
            let (a, b) = match (self.get(x), other.get(y)) {
                (Some(a), Some(b)) => (a, b),
                _ => return false,
            };
            match (a, b) {
                (Object::Record(ra), Object::Record(rb)) if ra.class == rb.class => {}
                (Object::List(_), Object::List(_)) | (Object::Map(_), Object::Map(_)) => {}
                _ => return false,
            }
            let (children_a, children_b) = (a.children(), b.children());
            if children_a.len() != children_b.len() {
                return false;
            }
            for ((ea, va), (eb, vb)) in children_a.iter().zip(children_b.iter()) {
                if ea != eb || !pair(va, vb, &mut queue) {
                    return false;
                }
            }
        }
        true
    }
}

fn slot_mismatch(id: ObjectId, expected: &'static str, found: Option<&'static str>) -> Error {
    Error::type_mismatch(expected, found.unwrap_or("missing object"), id.to_string())
}
