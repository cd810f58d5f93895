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

use std::collections::HashSet;

use crate::buffer::Token;
use crate::error::Error;
use crate::heap::{Record, Value};
use crate::path::PathElement;
use crate::resolver::graph_resolver::FrameKind;
use crate::resolver::session::{ReadSession, WriteSession};
use crate::resolver::type_resolver::ClassDef;
use crate::types::HASH_TOKEN;

/// Writes the fields the record holds, in its own order. The hash field is
/// written as `@hash` whatever it currently holds.
pub fn write(session: &mut WriteSession, record: &Record, class: &ClassDef) -> Result<(), Error> {
    session.writer.begin_object();
    for (name, value) in record.fields() {
        let field = class
            .field_def(name)
            .ok_or_else(|| Error::unknown_field(class.name().to_string(), name.clone()))?;
        session.writer.name(name);
        if class.is_hash_field(name) {
            session.writer.string(HASH_TOKEN);
            continue;
        }
        session.write_value(PathElement::field(name.as_str()), value, field.ty())?;
    }
    session.writer.end_object();
    Ok(())
}

pub fn read(session: &mut ReadSession, class: &ClassDef) -> Result<Value, Error> {
    let at = session.path().clone();
    session.reader.expect(Token::BeginObject, &at)?;
    session.begin_frame(FrameKind::Record, Some(class.name()));
    if class.is_sealed() {
        session.register_placeholder(class.name());
    } else {
        let id = session.heap_mut().record(Record::new(class.name()));
        session.register_object(id);
    }

    let mut seen = HashSet::new();
    loop {
        match session.reader.next_token()? {
            Token::EndObject => break,
            Token::Name(name) => {
                if !seen.insert(name.clone()) {
                    return Err(Error::duplicate_key(name, at.to_string()));
                }
                let Some(field) = class.field_def(&name) else {
                    return Err(Error::unknown_field(class.name().to_string(), name));
                };
                if class.is_hash_field(&name) {
                    session.read_hash_slot(PathElement::Field(name))?;
                } else {
                    session.read_slot(PathElement::Field(name), field.ty())?;
                }
            }
            other => {
                return Err(Error::type_mismatch(
                    "member name",
                    other.kind_name(),
                    at.to_string(),
                ))
            }
        }
    }
    session.end_frame()
}
