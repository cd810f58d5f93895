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
use crate::resolver::session::{ReadSession, WriteSession};
use crate::resolver::type_resolver::FieldType;

pub fn write(session: &mut WriteSession, value: &Value, ty: &FieldType) -> Result<(), Error> {
    if !ty.admits_scalar(value) {
        return Err(Error::type_mismatch(
            ty.to_string(),
            value.kind_name(),
            session.path().to_string(),
        ));
    }
    match value {
        Value::Null => session.writer.null(),
        Value::Bool(v) => session.writer.bool(*v),
        Value::Int(v) => session.writer.int(*v),
        Value::Float(v) => session.writer.float(*v)?,
        Value::Str(v) => session.writer.string(v),
        Value::Object(_) => {
            return Err(Error::type_mismatch(
                ty.to_string(),
                "object",
                session.path().to_string(),
            ))
        }
    }
    Ok(())
}

/// Reads a scalar. Strings are taken literally: only non-leaf positions can
/// hold references.
pub fn read(session: &mut ReadSession, ty: &FieldType) -> Result<Value, Error> {
    let token = session.reader.next_token()?;
    let value = match (ty, token) {
        (FieldType::Bool | FieldType::Scalar, Token::Bool(v)) => Value::Bool(v),
        (FieldType::Int | FieldType::Scalar, Token::Int(v)) => Value::Int(v),
        (FieldType::Float, Token::Int(v)) => Value::Float(v as f64),
        (FieldType::Float | FieldType::Scalar, Token::Float(v)) => Value::Float(v),
        (FieldType::Str | FieldType::Scalar, Token::Str(v)) => Value::Str(v),
        (_, token) => {
            return Err(Error::type_mismatch(
                ty.to_string(),
                token.kind_name(),
                session.path().to_string(),
            ))
        }
    };
    Ok(value)
}
