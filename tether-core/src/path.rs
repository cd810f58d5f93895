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

//! Positional identifiers and their textual reference form.
//!
//! A [`Path`] names a position below the root of one serialization pass. Its
//! reference text is `@root` followed by one `.segment` per element:
//!
//! ```text
//! @root                      the root value
//! @root.connections.0        element 0 of the root's `connections`
//! @.left                     sibling `left` of the current position
//! @hash                      the hash of the enclosing record
//! ```
//!
//! Index segments are unescaped decimal numbers. Inside field segments a
//! backslash escapes `.` and `\`, and a leading digit is escaped too, so a
//! field named `"0"` (`\0`) never reads back as index `0`. The encoding is
//! therefore injective and [`Reference::parse`] inverts it exactly.

use std::fmt::{self, Write};

use crate::error::Error;
use crate::types::{HASH_TOKEN, PATH_ESCAPE, PATH_SEPARATOR, REF_MARKER, ROOT_TOKEN};

/// One step from a composite value to one of its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// A named record field or map key.
    Field(String),
    /// A list slot.
    Index(usize),
}

impl PathElement {
    pub fn field(name: impl Into<String>) -> Self {
        PathElement::Field(name.into())
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            PathElement::Field(name) => Some(name),
            PathElement::Index(_) => None,
        }
    }

    fn write_segment(&self, out: &mut String) {
        match self {
            PathElement::Index(index) => {
                let _ = write!(out, "{index}");
            }
            PathElement::Field(name) => {
                for (i, c) in name.chars().enumerate() {
                    if c == PATH_SEPARATOR || c == PATH_ESCAPE || (i == 0 && c.is_ascii_digit()) {
                        out.push(PATH_ESCAPE);
                    }
                    out.push(c);
                }
            }
        }
    }
}

impl From<&str> for PathElement {
    fn from(name: &str) -> Self {
        PathElement::Field(name.to_string())
    }
}

impl From<String> for PathElement {
    fn from(name: String) -> Self {
        PathElement::Field(name)
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segment = String::new();
        self.write_segment(&mut segment);
        f.write_str(&segment)
    }
}

/// Root-to-node sequence of [`PathElement`]s. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    pub fn root() -> Self {
        Path::default()
    }

    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Path { elements }
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// The path one level up, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, parent) = self.elements.split_last()?;
        Some(Path {
            elements: parent.to_vec(),
        })
    }

    pub fn child(&self, element: impl Into<PathElement>) -> Path {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend_from_slice(&self.elements);
        elements.push(element.into());
        Path { elements }
    }

    /// Whether `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.elements.len() < other.elements.len()
            && other.elements[..self.elements.len()] == self.elements[..]
    }

    /// Whether both paths are distinct children of the same parent.
    pub fn is_sibling_of(&self, other: &Path) -> bool {
        match (self.elements.split_last(), other.elements.split_last()) {
            (Some((a, parent_a)), Some((b, parent_b))) => parent_a == parent_b && a != b,
            _ => false,
        }
    }

    pub fn to_reference(&self) -> String {
        let mut out = String::with_capacity(ROOT_TOKEN.len() + self.elements.len() * 8);
        out.push_str(ROOT_TOKEN);
        for element in &self.elements {
            out.push(PATH_SEPARATOR);
            element.write_segment(&mut out);
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_reference())
    }
}

/// A wire token standing in for a value that was already written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// `@root.a.b`
    Full(Path),
    /// `@.b`, a child of the current position's parent.
    Sibling(PathElement),
    /// `@hash`, the hash of the record being read.
    SelfHash,
}

impl Reference {
    /// Parses reference text.
    ///
    /// ```
    /// use tether_core::path::{Path, PathElement, Reference};
    ///
    /// let full = Reference::parse("@root.connections.0").unwrap();
    /// assert_eq!(
    ///     full,
    ///     Reference::Full(Path::root().child("connections").child(0))
    /// );
    /// assert_eq!(
    ///     Reference::parse("@.left").unwrap(),
    ///     Reference::Sibling(PathElement::field("left"))
    /// );
    /// assert!(Reference::parse("@rooted").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Reference, Error> {
        let malformed = || Error::invalid_data(format!("malformed reference `{text}`"));
        if text == HASH_TOKEN {
            return Ok(Reference::SelfHash);
        }
        if let Some(rest) = text.strip_prefix(ROOT_TOKEN) {
            let elements = parse_segments(rest).ok_or_else(malformed)?;
            return Ok(Reference::Full(Path::from_elements(elements)));
        }
        if let Some(rest) = text.strip_prefix(REF_MARKER) {
            if rest.starts_with(PATH_SEPARATOR) {
                let mut elements = parse_segments(rest).ok_or_else(malformed)?;
                if elements.len() == 1 {
                    if let Some(element) = elements.pop() {
                        return Ok(Reference::Sibling(element));
                    }
                }
            }
        }
        Err(malformed())
    }

    /// The absolute path this reference names when read at `current`.
    /// `None` for [`Reference::SelfHash`] and for a sibling of the root.
    pub fn target(&self, current: &Path) -> Option<Path> {
        match self {
            Reference::Full(path) => Some(path.clone()),
            Reference::Sibling(element) => Some(current.parent()?.child(element.clone())),
            Reference::SelfHash => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Full(path) => f.write_str(&path.to_reference()),
            Reference::Sibling(element) => {
                let mut out = String::from(REF_MARKER);
                out.push(PATH_SEPARATOR);
                element.write_segment(&mut out);
                f.write_str(&out)
            }
            Reference::SelfHash => f.write_str(HASH_TOKEN),
        }
    }
}

/// Parses `""` or `".seg.seg..."`.
fn parse_segments(text: &str) -> Option<Vec<PathElement>> {
    let mut elements = Vec::new();
    if text.is_empty() {
        return Some(elements);
    }
    let mut chars = text.chars();
    if chars.next() != Some(PATH_SEPARATOR) {
        return None;
    }
    let mut segment = String::new();
    let mut escaped = false;
    loop {
        match chars.next() {
            None => {
                elements.push(finish_segment(&segment, escaped)?);
                return Some(elements);
            }
            Some(PATH_SEPARATOR) => {
                elements.push(finish_segment(&segment, escaped)?);
                segment.clear();
                escaped = false;
            }
            Some(PATH_ESCAPE) => {
                segment.push(chars.next()?);
                escaped = true;
            }
            Some(c) => segment.push(c),
        }
    }
}

fn finish_segment(segment: &str, escaped: bool) -> Option<PathElement> {
    if escaped {
        return Some(PathElement::Field(segment.to_string()));
    }
    match segment.chars().next() {
        Some(first) if first.is_ascii_digit() => {
            let canonical = segment == "0" || first != '0';
            if !canonical || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse().ok().map(PathElement::Index)
        }
        _ => Some(PathElement::Field(segment.to_string())),
    }
}

/// Stack-disciplined current position of a session.
#[derive(Debug, Default)]
pub struct PathStack {
    current: Path,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn enter(&mut self, element: PathElement) {
        self.current.elements.push(element);
    }

    /// Leaves the most recently entered element.
    ///
    /// # Panics
    ///
    /// Panics when called at the root: an unmatched `exit` is a codec bug.
    #[inline(always)]
    #[track_caller]
    pub fn exit(&mut self) -> PathElement {
        match self.current.elements.pop() {
            Some(element) => element,
            None => panic!("unbalanced path exit at the root"),
        }
    }

    #[inline(always)]
    pub fn current(&self) -> &Path {
        &self.current
    }

    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.current.elements.len()
    }
}
