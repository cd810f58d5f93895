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

use tracing::trace;

use crate::buffer::{Reader, Token, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::heap::{Heap, Object, ObjectId, Value};
use crate::path::{Path, PathElement, PathStack, Reference};
use crate::resolver::graph_resolver::{resolve_frame, Frame, FrameKind, FrameTarget};
use crate::resolver::placeholder::{PlaceholderId, PlaceholderKind, Placeholders};
use crate::resolver::ref_resolver::{IdentityRegistry, Lookup, PathTable, Slot};
use crate::resolver::type_resolver::{FieldType, TypeResolver};
use crate::serializer;
use crate::types::{ReferencePolicy, HASH_TOKEN};

/// State of one write pass.
pub struct WriteSession<'a> {
    types: &'a TypeResolver,
    config: &'a Config,
    heap: &'a Heap,
    pub writer: Writer,
    path: PathStack,
    registry: IdentityRegistry,
    objects: Vec<ObjectId>,
}

impl<'a> WriteSession<'a> {
    pub fn new(types: &'a TypeResolver, config: &'a Config, heap: &'a Heap) -> WriteSession<'a> {
        WriteSession {
            types,
            config,
            heap,
            writer: Writer::new(),
            path: PathStack::new(),
            registry: IdentityRegistry::new(config.policy()),
            objects: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn types(&self) -> &'a TypeResolver {
        self.types
    }

    #[inline(always)]
    pub fn heap(&self) -> &'a Heap {
        self.heap
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        self.path.current()
    }

    /// Writes the value at the root path.
    pub fn write_root(&mut self, value: &Value, ty: &FieldType) -> Result<(), Error> {
        self.write_current(value, ty)
    }

    /// Writes `value` as child `element` of the composite being written.
    pub fn write_value(
        &mut self,
        element: PathElement,
        value: &Value,
        ty: &FieldType,
    ) -> Result<(), Error> {
        self.path.enter(element);
        if self.path.depth() > self.config.max_depth() as usize {
            return Err(Error::depth_exceed(format!(
                "path `{}` is deeper than the limit of {}",
                self.path.current(),
                self.config.max_depth()
            )));
        }
        self.write_current(value, ty)?;
        self.path.exit();
        Ok(())
    }

    fn write_current(&mut self, value: &Value, ty: &FieldType) -> Result<(), Error> {
        let Value::Object(id) = value else {
            return serializer::leaf::write(self, value, ty);
        };
        let id = *id;
        let heap = self.heap;
        let object = heap
            .get(id)
            .ok_or_else(|| Error::invalid_data(format!("dangling object handle {id}")))?;
        if !ty.admits_object(object) {
            return Err(Error::type_mismatch(
                ty.to_string(),
                object_name(object),
                self.path.current().to_string(),
            ));
        }
        if self.types.is_leaf(ty)? {
            self.registry.push_level();
            serializer::write_object(self, object, ty)?;
            self.registry.pop_level();
            return Ok(());
        }
        if let Some(reference) = self.registry.offer(id, self.path.current())? {
            self.writer.string(&reference.to_string());
            return Ok(());
        }

        self.registry.enter(id, self.path.current());
        self.objects.push(id);
        serializer::write_object(self, object, ty)?;
        match self.objects.pop() {
            Some(top) if top == id => {}
            top => panic!("object stack out of balance: closed {id}, top was {top:?}"),
        }
        self.registry.exit(id);
        Ok(())
    }

    pub fn finish(self) -> Result<String, Error> {
        debug_assert!(self.objects.is_empty());
        self.writer.dump(self.config.is_pretty())
    }
}

/// Class name of a record, kind name of anything else.
pub(crate) fn object_name(object: &Object) -> String {
    match object {
        Object::Record(record) => record.class().to_string(),
        other => other.kind_name().to_string(),
    }
}

/// State of one read pass.
///
/// Codecs drive the session: a composite codec opens a frame with
/// [`ReadSession::begin_frame`], registers its target with
/// [`ReadSession::register_object`] or [`ReadSession::register_placeholder`],
/// reads each child through [`ReadSession::read_slot`] and closes with
/// [`ReadSession::end_frame`].
pub struct ReadSession<'a> {
    types: &'a TypeResolver,
    config: &'a Config,
    pub reader: Reader,
    heap: Heap,
    path: PathStack,
    table: PathTable,
    placeholders: Placeholders,
    frames: Vec<Frame>,
    last_placeholder: Option<PlaceholderId>,
}

impl<'a> ReadSession<'a> {
    pub fn new(types: &'a TypeResolver, config: &'a Config, reader: Reader) -> ReadSession<'a> {
        ReadSession {
            types,
            config,
            reader,
            heap: Heap::new(),
            path: PathStack::new(),
            table: PathTable::new(),
            placeholders: Placeholders::new(),
            frames: Vec::new(),
            last_placeholder: None,
        }
    }

    #[inline(always)]
    pub fn types(&self) -> &'a TypeResolver {
        self.types
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        self.path.current()
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn into_heap(self) -> Heap {
        self.heap
    }

    /// Reads the whole document as a value of type `ty`.
    pub fn read_root(&mut self, ty: &FieldType) -> Result<Value, Error> {
        let value = self.read_current(ty)?;
        if self.take_placeholder().is_some() {
            return Err(Error::invalid_data("the root cannot be a reference"));
        }
        crate::ensure!(self.reader.is_exhausted(), "trailing tokens after the root value");
        trace!(
            objects = self.heap.len(),
            paths = self.table.len(),
            placeholders = self.placeholders.len(),
            "document read"
        );
        Ok(value)
    }

    /// Reads child `element` of the current composite. When the child is a
    /// reference to a value still under construction the result is `Null`
    /// and the placeholder is left for [`ReadSession::take_placeholder`].
    pub fn read_value(&mut self, element: PathElement, ty: &FieldType) -> Result<Value, Error> {
        self.path.enter(element);
        if self.path.depth() > self.config.max_depth() as usize {
            return Err(Error::depth_exceed(format!(
                "path `{}` is deeper than the limit of {}",
                self.path.current(),
                self.config.max_depth()
            )));
        }
        let value = self.read_current(ty)?;
        self.path.exit();
        Ok(value)
    }

    fn read_current(&mut self, ty: &FieldType) -> Result<Value, Error> {
        if !self.types.is_leaf(ty)? {
            if let Some(Token::Str(text)) = self.reader.peek() {
                let text = text.clone();
                self.reader.next_token()?;
                return self.resolve_reference(&text, ty);
            }
        }
        serializer::read_value(self, ty)
    }

    /// The placeholder returned by the last reference read, if any.
    pub fn take_placeholder(&mut self) -> Option<PlaceholderId> {
        self.last_placeholder.take()
    }

    fn resolve_reference(&mut self, text: &str, ty: &FieldType) -> Result<Value, Error> {
        let at = self.path.current().clone();
        let reference = Reference::parse(text)?;
        let Some(target) = reference.target(&at) else {
            return Err(Error::invalid_data(format!(
                "reference `{text}` cannot be used at `{at}`"
            )));
        };
        self.check_policy(&reference, &target, &at)?;

        match self.table.lookup(&target, &self.placeholders) {
            Lookup::Value(value) => {
                self.check_referent(&value, ty, &at)?;
                trace!(%at, reference = text, "reference resolved");
                self.table.insert_value(at, value.clone());
                Ok(value)
            }
            Lookup::Placeholder(p) => {
                if let PlaceholderKind::Object { class } = self.placeholders.get(p).kind() {
                    if *ty != FieldType::Class(class.clone()) {
                        return Err(Error::type_mismatch(ty.to_string(), class.clone(), at.to_string()));
                    }
                }
                trace!(%at, reference = text, placeholder = %p, "reference to a value under construction");
                self.last_placeholder = Some(p);
                Ok(Value::Null)
            }
            Lookup::NotFound => {
                if let Reference::Sibling(element) = &reference {
                    let pending = self.frames.last().and_then(|frame| frame.pending_at(element));
                    if let Some(pending) = pending {
                        self.check_pending_sibling(pending, element, ty, &at)?;
                        let p = self.placeholders.create(PlaceholderKind::FieldReference {
                            element: element.clone(),
                            cached: None,
                        });
                        self.last_placeholder = Some(p);
                        return Ok(Value::Null);
                    }
                }
                Err(Error::missing_reference(text.to_string(), at.to_string()))
            }
        }
    }

    /// Rejects references the configured policy would never have written.
    fn check_policy(&self, reference: &Reference, target: &Path, at: &Path) -> Result<(), Error> {
        let policy = self.config.policy();
        let permitted = match policy {
            ReferencePolicy::None | ReferencePolicy::DetectAndThrow => false,
            ReferencePolicy::CircularOnly => {
                matches!(reference, Reference::Full(_)) && target.is_ancestor_of(at)
            }
            ReferencePolicy::CircularAndSiblings => {
                matches!(reference, Reference::Sibling(_)) || target.is_ancestor_of(at)
            }
            ReferencePolicy::AllDuplicates => true,
        };
        if permitted {
            Ok(())
        } else {
            Err(Error::illegal_reference(
                policy.name(),
                at.to_string(),
                target.to_string(),
            ))
        }
    }

    fn check_referent(&self, value: &Value, ty: &FieldType, at: &Path) -> Result<(), Error> {
        let Some(object) = value.as_object().and_then(|id| self.heap.get(id)) else {
            return Ok(());
        };
        if ty.admits_object(object) {
            Ok(())
        } else {
            Err(Error::type_mismatch(ty.to_string(), object_name(object), at.to_string()))
        }
    }

    /// Validates `@.element` against a slot of the current frame that is still
    /// pending. The slot must not lead to the record hash, and a record field
    /// must be declared with the type expected at `at`.
    fn check_pending_sibling(
        &self,
        mut pending: PlaceholderId,
        element: &PathElement,
        ty: &FieldType,
        at: &Path,
    ) -> Result<(), Error> {
        let Some(frame) = self.frames.last() else {
            return Ok(());
        };
        loop {
            match self.placeholders.get(pending).kind() {
                PlaceholderKind::Hash => {
                    return Err(Error::invalid_data(format!(
                        "`@.{element}` at `{at}` refers to the hash of its own record"
                    )))
                }
                PlaceholderKind::FieldReference { element: next, .. } => {
                    match frame.pending_at(next) {
                        Some(p) => pending = p,
                        None => break,
                    }
                }
                PlaceholderKind::Object { .. } => break,
            }
        }
        if let (FrameKind::Record, Some(class), Some(name)) =
            (frame.kind, frame.class.as_deref(), element.as_field())
        {
            if let Some(def) = self.types.get(class)?.field_def(name) {
                if def.ty() != ty {
                    return Err(Error::type_mismatch(
                        ty.to_string(),
                        def.ty().to_string(),
                        at.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Opens the frame of the composite at the current path.
    pub fn begin_frame(&mut self, kind: FrameKind, class: Option<&str>) {
        let frame = Frame::new(self.path.current().clone(), kind, class.map(str::to_string));
        self.frames.push(frame);
    }

    /// Registers an already allocated composite as the current frame's value,
    /// making it available to references from its descendants.
    #[track_caller]
    pub fn register_object(&mut self, id: ObjectId) {
        let frame = self.open_frame();
        frame.target = Some(FrameTarget::Object(id));
        let path = frame.path.clone();
        self.table.insert_value(path, Value::Object(id));
    }

    /// Registers the current frame as a sealed record of `class`; references
    /// to it resolve to the returned placeholder until the frame ends.
    #[track_caller]
    pub fn register_placeholder(&mut self, class: &str) -> PlaceholderId {
        let p = self.placeholders.create(PlaceholderKind::Object {
            class: class.to_string(),
        });
        let frame = self.open_frame();
        frame.target = Some(FrameTarget::Sealed(p));
        let path = frame.path.clone();
        self.table.insert_pending(path, p);
        p
    }

    #[track_caller]
    fn open_frame(&mut self) -> &mut Frame {
        match self.frames.last_mut() {
            Some(frame) if frame.target.is_none() => frame,
            Some(frame) => panic!("composite at `{}` registered twice", frame.path),
            None => panic!("register called outside a composite"),
        }
    }

    /// Reads child `element` of the current frame and stores it in its slot.
    ///
    /// # Panics
    ///
    /// Panics when the frame has not registered its target yet.
    #[track_caller]
    pub fn read_slot(&mut self, element: PathElement, ty: &FieldType) -> Result<(), Error> {
        self.assert_registered();
        let value = self.read_value(element.clone(), ty)?;
        self.store_slot(element, value)
    }

    /// Reads the `@hash` token of a record's hash field.
    #[track_caller]
    pub fn read_hash_slot(&mut self, element: PathElement) -> Result<(), Error> {
        self.assert_registered();
        match self.reader.next_token()? {
            Token::Str(text) if text == HASH_TOKEN => {}
            other => {
                return Err(Error::type_mismatch(
                    HASH_TOKEN,
                    other.kind_name(),
                    self.path.current().child(element).to_string(),
                ))
            }
        }
        let p = self.placeholders.create(PlaceholderKind::Hash);
        self.last_placeholder = Some(p);
        self.store_slot(element, Value::Null)
    }

    #[track_caller]
    fn assert_registered(&self) {
        match self.frames.last() {
            Some(frame) if frame.target.is_some() => {}
            Some(frame) => panic!("child read before composite at `{}` was registered", frame.path),
            None => panic!("child read outside a composite"),
        }
    }

    fn store_slot(&mut self, element: PathElement, value: Value) -> Result<(), Error> {
        let pending = self.take_placeholder();
        let Some(frame) = self.frames.last_mut() else {
            panic!("slot stored outside a composite");
        };
        if let Some(FrameTarget::Object(id)) = frame.target {
            let stored = if pending.is_some() { Value::Null } else { value.clone() };
            self.heap.set_slot(id, &element, stored)?;
            if let Some(p) = pending {
                let use_ = frame.slot_use(id, &element);
                self.placeholders.register_use(p, use_, &mut self.heap)?;
            }
        }
        let slot = match pending {
            Some(p) => Slot::Pending(p),
            None => Slot::Value(value),
        };
        frame.slots.push((element, slot));
        Ok(())
    }

    /// Closes the current frame and settles its pending slots.
    pub fn end_frame(&mut self) -> Result<Value, Error> {
        let Some(frame) = self.frames.pop() else {
            panic!("end_frame without an open composite");
        };
        resolve_frame(&frame, &mut self.heap, &mut self.placeholders, &mut self.table)
    }
}
