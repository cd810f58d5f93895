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
use crate::heap::Value;
use crate::path::PathElement;
use crate::resolver::graph_resolver::FrameKind;
use crate::resolver::session::{ReadSession, WriteSession};
use crate::resolver::type_resolver::FieldType;

pub fn write(
    session: &mut WriteSession,
    entries: &[(String, Value)],
    value_type: &FieldType,
) -> Result<(), Error> {
    session.writer.begin_object();
    for (key, value) in entries {
        session.writer.name(key);
        session.write_value(PathElement::field(key.as_str()), value, value_type)?;
    }
    session.writer.end_object();
    Ok(())
}

/// Reads a string-keyed map. A key that occurs twice is rejected rather than
/// letting the later entry win.
pub fn read(session: &mut ReadSession, value_type: &FieldType) -> Result<Value, Error> {
    let at = session.path().clone();
    session.reader.expect(Token::BeginObject, &at)?;
    session.begin_frame(FrameKind::Map, None);
    let id = session.heap_mut().map(Vec::new());
    session.register_object(id);

    let mut seen = HashSet::new();
    loop {
        match session.reader.next_token()? {
            Token::EndObject => break,
            Token::Name(key) => {
                if !seen.insert(key.clone()) {
                    return Err(Error::duplicate_key(key, at.to_string()));
                }
                session.read_slot(PathElement::Field(key), value_type)?;
            }
            other => {
                return Err(Error::type_mismatch(
                    "map key",
                    other.kind_name(),
                    at.to_string(),
                ))
            }
        }
    }
    session.end_frame()
}
