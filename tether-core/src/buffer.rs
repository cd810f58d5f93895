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

//! JSON token layer.
//!
//! [`Writer`] assembles a document through begin/end calls and renders it as
//! compact or indented text. [`Reader`] walks a document as a forward-only
//! stream of [`Token`]s. The tokens are collected by a serde visitor rather
//! than through `serde_json::Value`, so an object that repeats a key yields
//! both entries and the codecs can reject it.

use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;

use serde::de::{DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value as Json};

use crate::error::Error;

enum Open {
    Object { map: Map<String, Json>, name: Option<String> },
    Array(Vec<Json>),
}

#[derive(Default)]
pub struct Writer {
    stack: Vec<Open>,
    root: Option<Json>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_object(&mut self) {
        self.stack.push(Open::Object {
            map: Map::new(),
            name: None,
        });
    }

    /// Names the next value of the enclosing object.
    ///
    /// # Panics
    ///
    /// Panics outside an object.
    #[track_caller]
    pub fn name(&mut self, name: &str) {
        match self.stack.last_mut() {
            Some(Open::Object { name: slot, .. }) => *slot = Some(name.to_string()),
            _ => panic!("name `{name}` written outside an object"),
        }
    }

    #[track_caller]
    pub fn end_object(&mut self) {
        match self.stack.pop() {
            Some(Open::Object { map, .. }) => self.push(Json::Object(map)),
            _ => panic!("end_object without a matching begin_object"),
        }
    }

    pub fn begin_array(&mut self) {
        self.stack.push(Open::Array(Vec::new()));
    }

    #[track_caller]
    pub fn end_array(&mut self) {
        match self.stack.pop() {
            Some(Open::Array(values)) => self.push(Json::Array(values)),
            _ => panic!("end_array without a matching begin_array"),
        }
    }

    pub fn null(&mut self) {
        self.push(Json::Null);
    }

    pub fn bool(&mut self, value: bool) {
        self.push(Json::Bool(value));
    }

    pub fn int(&mut self, value: i64) {
        self.push(Json::Number(value.into()));
    }

    /// JSON has no representation for NaN or the infinities.
    pub fn float(&mut self, value: f64) -> Result<(), Error> {
        let number = Number::from_f64(value)
            .ok_or_else(|| Error::invalid_data(format!("float {value} has no JSON form")))?;
        self.push(Json::Number(number));
        Ok(())
    }

    pub fn string(&mut self, value: &str) {
        self.push(Json::String(value.to_string()));
    }

    #[track_caller]
    fn push(&mut self, value: Json) {
        match self.stack.last_mut() {
            Some(Open::Object { map, name }) => match name.take() {
                Some(name) => {
                    map.insert(name, value);
                }
                None => panic!("object member written without a name"),
            },
            Some(Open::Array(values)) => values.push(value),
            None => self.root = Some(value),
        }
    }

    /// Renders the finished document.
    pub fn dump(&self, pretty: bool) -> Result<String, Error> {
        crate::ensure!(self.stack.is_empty(), "document has unclosed composites");
        let root = self.root.as_ref().unwrap_or(&Json::Null);
        let text = if pretty {
            serde_json::to_string_pretty(root)?
        } else {
            serde_json::to_string(root)?
        };
        Ok(text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    BeginObject,
    Name(String),
    EndObject,
    BeginArray,
    EndArray,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Token {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::BeginObject => "object",
            Token::Name(_) => "member name",
            Token::EndObject => "end of object",
            Token::BeginArray => "array",
            Token::EndArray => "end of array",
            Token::Null => "null",
            Token::Bool(_) => "bool",
            Token::Int(_) => "int",
            Token::Float(_) => "float",
            Token::Str(_) => "string",
        }
    }
}

pub struct Reader {
    tokens: Peekable<IntoIter<Token>>,
}

impl Reader {
    /// Tokenizes a whole document. Trailing characters are an error.
    pub fn parse(text: &str) -> Result<Reader, Error> {
        let mut tokens = Vec::new();
        let mut de = serde_json::Deserializer::from_str(text);
        TokenSeed(&mut tokens).deserialize(&mut de)?;
        de.end()?;
        Ok(Reader::from_tokens(tokens))
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Reader {
        Reader {
            tokens: tokens.into_iter().peekable(),
        }
    }

    #[inline(always)]
    pub fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.tokens
            .next()
            .ok_or_else(|| Error::invalid_data("unexpected end of document"))
    }

    /// Consumes the next token if it equals `token`.
    pub fn next_if(&mut self, token: &Token) -> bool {
        self.tokens.next_if_eq(token).is_some()
    }

    /// Consumes `expected` or fails with a mismatch located at `at`.
    pub fn expect(&mut self, expected: Token, at: &dyn fmt::Display) -> Result<(), Error> {
        let found = self.next_token()?;
        if found == expected {
            Ok(())
        } else {
            Err(Error::type_mismatch(
                expected.kind_name(),
                found.kind_name(),
                at.to_string(),
            ))
        }
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }
}

struct TokenSeed<'a>(&'a mut Vec<Token>);

impl<'de, 'a> DeserializeSeed<'de> for TokenSeed<'a> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for TokenSeed<'a> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<(), E> {
        self.0.push(Token::Bool(v));
        Ok(())
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<(), E> {
        self.0.push(Token::Int(v));
        Ok(())
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<(), E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("integer {v} out of range")))?;
        self.0.push(Token::Int(v));
        Ok(())
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<(), E> {
        self.0.push(Token::Float(v));
        Ok(())
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<(), E> {
        self.0.push(Token::Str(v.to_string()));
        Ok(())
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<(), E> {
        self.0.push(Token::Str(v));
        Ok(())
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<(), E> {
        self.0.push(Token::Null);
        Ok(())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let tokens = self.0;
        tokens.push(Token::BeginArray);
        while seq.next_element_seed(TokenSeed(&mut *tokens))?.is_some() {}
        tokens.push(Token::EndArray);
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let tokens = self.0;
        tokens.push(Token::BeginObject);
        while let Some(key) = map.next_key::<String>()? {
            tokens.push(Token::Name(key));
            map.next_value_seed(TokenSeed(&mut *tokens))?;
        }
        tokens.push(Token::EndObject);
        Ok(())
    }
}
