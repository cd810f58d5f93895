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

use std::collections::HashMap;
use std::fmt;

use crate::error::Error;
use crate::heap::{Object, Value};

/// Declared type of a field, list element or map value. Any position may
/// also hold `null`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    /// Any of the four scalar types.
    Scalar,
    /// A record of the named class.
    Class(String),
    List(Box<FieldType>),
    /// String-keyed map.
    Map(Box<FieldType>),
}

impl FieldType {
    pub fn class(name: impl Into<String>) -> Self {
        FieldType::Class(name.into())
    }

    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    pub fn map(value: FieldType) -> Self {
        FieldType::Map(Box::new(value))
    }

    /// Whether a scalar value may be stored at this type. `Null` always may.
    pub fn admits_scalar(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (FieldType::Bool, Value::Bool(_))
                | (FieldType::Int, Value::Int(_))
                | (FieldType::Float, Value::Float(_))
                | (FieldType::Str, Value::Str(_))
                | (
                    FieldType::Scalar,
                    Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
                )
        )
    }

    /// Whether `object` has the shape this type declares.
    pub fn admits_object(&self, object: &Object) -> bool {
        match (self, object) {
            (FieldType::Class(name), Object::Record(record)) => record.class() == name,
            (FieldType::List(_), Object::List(_)) | (FieldType::Map(_), Object::Map(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::Int => f.write_str("int"),
            FieldType::Float => f.write_str("float"),
            FieldType::Str => f.write_str("string"),
            FieldType::Scalar => f.write_str("scalar"),
            FieldType::Class(name) => f.write_str(name),
            FieldType::List(element) => write!(f, "list<{element}>"),
            FieldType::Map(value) => write!(f, "map<{value}>"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    name: String,
    ty: FieldType,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }
}

/// Declaration of a record class.
///
/// ```rust
/// use tether_core::resolver::type_resolver::{ClassDef, FieldType};
///
/// let node = ClassDef::new("Node")
///     .field("id", FieldType::Int)
///     .field("connections", FieldType::list(FieldType::class("Node")));
/// assert_eq!(node.fields().len(), 2);
/// assert!(!node.is_sealed());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    name: String,
    fields: Vec<FieldDef>,
    sealed: bool,
    leaf: bool,
    hash_field: Option<String>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            fields: Vec::new(),
            sealed: false,
            leaf: false,
            hash_field: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
        });
        self
    }

    /// Instances are only allocated once all their fields have been read.
    /// While they are read, references to them resolve to a placeholder.
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Instances are written inline wherever they occur and are never the
    /// target of a reference.
    pub fn leaf(mut self) -> Self {
        self.leaf = true;
        self
    }

    /// Declares an `int` field that holds the hash of the other fields. It is
    /// written as `@hash` and recomputed on read.
    pub fn hash_field(mut self, name: impl Into<String>) -> Self {
        self.hash_field = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn get_hash_field(&self) -> Option<&str> {
        self.hash_field.as_deref()
    }

    pub fn is_hash_field(&self, name: &str) -> bool {
        self.hash_field.as_deref() == Some(name)
    }

    fn validate(&self) -> Result<(), Error> {
        crate::ensure!(!self.name.is_empty(), "class name must not be empty");
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::duplicate_key(field.name.clone(), self.name.clone()));
            }
        }
        if let Some(hash_field) = &self.hash_field {
            match self.field_def(hash_field) {
                Some(field) if field.ty == FieldType::Int => {}
                Some(field) => {
                    return Err(Error::type_mismatch(
                        "int",
                        field.ty.to_string(),
                        format!("{}.{}", self.name, hash_field),
                    ))
                }
                None => {
                    return Err(Error::unknown_field(self.name.clone(), hash_field.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Registry of the record classes a `Tether` instance can read and write.
#[derive(Clone, Debug, Default)]
pub struct TypeResolver {
    classes: HashMap<String, ClassDef>,
}

impl TypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class`, replacing an earlier class of the same name.
    ///
    /// Field types may name classes that are registered later; they are
    /// looked up when a value of that type is written or read.
    pub fn register(&mut self, class: ClassDef) -> Result<(), Error> {
        class.validate()?;
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    #[inline(always)]
    pub fn get(&self, name: &str) -> Result<&ClassDef, Error> {
        self.classes
            .get(name)
            .ok_or_else(|| Error::unknown_class(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether values of `ty` are written inline and never referenced.
    pub fn is_leaf(&self, ty: &FieldType) -> Result<bool, Error> {
        match ty {
            FieldType::Class(name) => Ok(self.get(name)?.leaf),
            FieldType::List(_) | FieldType::Map(_) => Ok(false),
            _ => Ok(true),
        }
    }
}
