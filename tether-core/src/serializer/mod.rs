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

//! Value codecs.
//!
//! Codecs turn heap objects into wire tokens and back. They never track
//! identity themselves: each child goes through the session, which decides
//! whether it is written in full or as a reference, and which hands back
//! placeholders for children that are not constructed yet.

use crate::buffer::Token;
use crate::error::Error;
use crate::heap::{Object, Value};
use crate::resolver::session::{object_name, ReadSession, WriteSession};
use crate::resolver::type_resolver::FieldType;

pub mod leaf;
pub mod list;
pub mod map;
pub mod record;

/// Writes the body of `object`, whose identity the session has already
/// accounted for.
pub fn write_object(
    session: &mut WriteSession,
    object: &Object,
    ty: &FieldType,
) -> Result<(), Error> {
    match (object, ty) {
        (Object::Record(value), FieldType::Class(name)) => {
            let class = session.types().get(name)?;
            record::write(session, value, class)
        }
        (Object::List(values), FieldType::List(element)) => list::write(session, values, element),
        (Object::Map(entries), FieldType::Map(value)) => map::write(session, entries, value),
        _ => Err(Error::type_mismatch(
            ty.to_string(),
            object_name(object),
            session.path().to_string(),
        )),
    }
}

/// Reads a value of type `ty` that is written in full (not a reference).
pub fn read_value(session: &mut ReadSession, ty: &FieldType) -> Result<Value, Error> {
    if session.reader.next_if(&Token::Null) {
        return Ok(Value::Null);
    }
    match ty {
        FieldType::Class(name) => {
            let class = session.types().get(name)?;
            record::read(session, class)
        }
        FieldType::List(element) => list::read(session, element),
        FieldType::Map(value) => map::read(session, value),
        _ => leaf::read(session, ty),
    }
}
