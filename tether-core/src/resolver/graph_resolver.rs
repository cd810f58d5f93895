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

//! End-of-composite processing of pending slots.
//!
//! When the last child of a composite has been read, some of its slots may
//! still hold placeholders. [`resolve_frame`] settles what it can, chains the
//! rest behind the placeholders they wait on, allocates sealed records, and
//! schedules the record hash so that it is computed exactly once, after
//! every slot it depends on has settled.

use std::collections::HashMap;

use tracing::trace;

use crate::error::Error;
use crate::heap::{Heap, ObjectId, Record, Value};
use crate::path::{Path, PathElement};
use crate::resolver::placeholder::{
    HashJob, JobSlot, PlaceholderId, PlaceholderKind, PlaceholderUse, Placeholders,
};
use crate::resolver::ref_resolver::{PathTable, Slot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Record,
    List,
    Map,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameTarget {
    /// Allocated before its children were read.
    Object(ObjectId),
    /// A sealed record, allocated when the frame ends.
    Sealed(PlaceholderId),
}

/// A composite under construction.
#[derive(Debug)]
pub struct Frame {
    pub path: Path,
    pub kind: FrameKind,
    /// Record class; `None` for lists and maps.
    pub class: Option<String>,
    pub target: Option<FrameTarget>,
    /// Every slot read so far, in wire order.
    pub slots: Vec<(PathElement, Slot)>,
}

impl Frame {
    pub fn new(path: Path, kind: FrameKind, class: Option<String>) -> Self {
        Frame {
            path,
            kind,
            class,
            target: None,
            slots: Vec::new(),
        }
    }

    /// The patch that writes slot `element` of `object`.
    pub fn slot_use(&self, object: ObjectId, element: &PathElement) -> PlaceholderUse {
        match (self.kind, element) {
            (FrameKind::List, PathElement::Index(index)) => PlaceholderUse::SetIndex {
                object,
                index: *index,
            },
            (FrameKind::Map, _) => PlaceholderUse::SetEntry {
                object,
                key: element_key(element),
            },
            _ => PlaceholderUse::SetField {
                object,
                field: element_key(element),
            },
        }
    }

    /// The placeholder held by slot `element`, if that slot is pending.
    pub fn pending_at(&self, element: &PathElement) -> Option<PlaceholderId> {
        self.slots.iter().find_map(|(e, slot)| match slot {
            Slot::Pending(p) if e == element => Some(*p),
            _ => None,
        })
    }
}

fn element_key(element: &PathElement) -> String {
    match element {
        PathElement::Field(name) => name.clone(),
        PathElement::Index(index) => index.to_string(),
    }
}

/// Settles the pending slots of `frame` and returns the composite's value.
///
/// # Panics
///
/// Panics if the frame never registered its target, or if a field reference
/// names no slot of the frame or leads back to itself. Both mean the read
/// session was driven incorrectly.
pub fn resolve_frame(
    frame: &Frame,
    heap: &mut Heap,
    placeholders: &mut Placeholders,
    table: &mut PathTable,
) -> Result<Value, Error> {
    let Some(target) = frame.target else {
        panic!("composite at `{}` finished without registering", frame.path);
    };

    let mut hashes = Vec::new();
    let mut others = Vec::new();
    for (_, slot) in &frame.slots {
        if let Slot::Pending(p) = slot {
            match placeholders.get(*p).kind() {
                PlaceholderKind::Hash => hashes.push(*p),
                _ => others.push(*p),
            }
        }
    }

    let mut fields = FieldReferences {
        frame,
        outcomes: HashMap::new(),
        visiting: Vec::new(),
    };
    let mut deferred = Vec::new();
    for p in others {
        if !fields.resolve(p, heap, placeholders)? {
            deferred.push(p);
        }
    }

    let value = match target {
        FrameTarget::Object(id) => Value::Object(id),
        FrameTarget::Sealed(_) => Value::Object(allocate_sealed(frame, heap, placeholders)?),
    };

    if !hashes.is_empty() {
        schedule_hash(frame, hashes, deferred, heap, placeholders)?;
    }

    if let FrameTarget::Sealed(placeholder) = target {
        placeholders.apply(placeholder, value.clone(), heap)?;
        table.insert_value(frame.path.clone(), value.clone());
    }
    Ok(value)
}

/// Builds the record of a sealed frame. Pending fields start out `Null` and
/// are patched when their placeholders resolve.
fn allocate_sealed(
    frame: &Frame,
    heap: &mut Heap,
    placeholders: &mut Placeholders,
) -> Result<ObjectId, Error> {
    let mut record = Record::new(frame.class.clone().unwrap_or_default());
    for (element, slot) in &frame.slots {
        let value = match slot {
            Slot::Value(value) => value.clone(),
            Slot::Pending(_) => Value::Null,
        };
        record.set(element_key(element), value);
    }
    let id = heap.record(record);
    for (element, slot) in &frame.slots {
        if let Slot::Pending(p) = slot {
            placeholders.register_use(*p, frame.slot_use(id, element), heap)?;
        }
    }
    trace!(at = %frame.path, object = %id, "sealed record allocated");
    Ok(id)
}

fn schedule_hash(
    frame: &Frame,
    targets: Vec<PlaceholderId>,
    deferred: Vec<PlaceholderId>,
    heap: &mut Heap,
    placeholders: &mut Placeholders,
) -> Result<(), Error> {
    let snapshot = frame
        .slots
        .iter()
        .filter_map(|(element, slot)| {
            let slot = match slot {
                Slot::Value(value) => JobSlot::Known(value.clone()),
                Slot::Pending(p) if targets.contains(p) => return None,
                Slot::Pending(p) => JobSlot::Pending(*p),
            };
            Some((element_key(element), slot))
        })
        .collect();
    let mut job = HashJob::new(frame.class.clone().unwrap_or_default(), snapshot);
    job.targets = targets;
    job.deferred = deferred;
    let waiting = job.deferred.clone();
    let job = placeholders.add_hash_job(job);
    if waiting.is_empty() {
        return placeholders.run_hash_job(job, heap);
    }
    trace!(at = %frame.path, waiting = waiting.len(), "record hash deferred");
    for p in waiting {
        placeholders.register_use(p, PlaceholderUse::HashCheck(job), heap)?;
    }
    Ok(())
}

/// Resolution of `@.element` placeholders against the slots of one frame.
struct FieldReferences<'f> {
    frame: &'f Frame,
    /// `true` once resolved, `false` once chained behind an open placeholder.
    outcomes: HashMap<PlaceholderId, bool>,
    visiting: Vec<PlaceholderId>,
}

impl FieldReferences<'_> {
    /// Returns whether `p` is resolved once this call returns.
    fn resolve(
        &mut self,
        p: PlaceholderId,
        heap: &mut Heap,
        placeholders: &mut Placeholders,
    ) -> Result<bool, Error> {
        if placeholders.is_resolved(p) {
            return Ok(true);
        }
        if let Some(outcome) = self.outcomes.get(&p) {
            return Ok(*outcome);
        }
        let PlaceholderKind::FieldReference { element, cached } = placeholders.get(p).kind().clone()
        else {
            // object placeholders of enclosing sealed records
            return Ok(false);
        };
        let frame = self.frame;
        if self.visiting.contains(&p) {
            panic!("field references at `{}` form a cycle", frame.path);
        }
        let index = match cached {
            Some(index) => index,
            None => {
                let Some(index) = frame.slots.iter().position(|(e, _)| *e == element) else {
                    panic!("`@.{element}` names no slot of `{}`", frame.path);
                };
                *placeholders.kind_mut(p) = PlaceholderKind::FieldReference {
                    element,
                    cached: Some(index),
                };
                index
            }
        };

        let outcome = match &frame.slots[index].1 {
            Slot::Value(value) => {
                placeholders.apply(p, value.clone(), heap)?;
                true
            }
            Slot::Pending(target) => {
                self.visiting.push(p);
                let ready = self.resolve(*target, heap, placeholders)?;
                self.visiting.pop();
                if ready {
                    let value = placeholders.value(*target).cloned().unwrap_or_default();
                    placeholders.apply(p, value, heap)?;
                } else {
                    placeholders.register_use(*target, PlaceholderUse::ChainTo(p), heap)?;
                }
                ready
            }
        };
        self.outcomes.insert(p, outcome);
        Ok(outcome)
    }
}
