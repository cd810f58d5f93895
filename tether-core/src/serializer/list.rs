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

use crate::buffer::Token;
use crate::error::Error;
use crate::heap::Value;
use crate::path::PathElement;
use crate::resolver::graph_resolver::FrameKind;
use crate::resolver::session::{ReadSession, WriteSession};
use crate::resolver::type_resolver::FieldType;

pub fn write(session: &mut WriteSession, values: &[Value], element: &FieldType) -> Result<(), Error> {
    session.writer.begin_array();
    for (index, value) in values.iter().enumerate() {
        session.write_value(PathElement::Index(index), value, element)?;
    }
    session.writer.end_array();
    Ok(())
}

pub fn read(session: &mut ReadSession, element: &FieldType) -> Result<Value, Error> {
    let at = session.path().clone();
    session.reader.expect(Token::BeginArray, &at)?;
    session.begin_frame(FrameKind::List, None);
    let id = session.heap_mut().list(Vec::new());
    session.register_object(id);

    let mut index = 0;
    while !session.reader.next_if(&Token::EndArray) {
        session.read_slot(PathElement::Index(index), element)?;
        index += 1;
    }
    session.end_frame()
}
