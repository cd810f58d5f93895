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

//! Forward-reference placeholders.
//!
//! A placeholder stands in for a value that does not exist yet when the token
//! stream names it: a sealed record still being read, a sibling slot whose
//! own value is still pending, or the hash of the record being read. Every
//! slot that received a placeholder registers a [`PlaceholderUse`]; applying
//! the placeholder fires those uses against the heap, once each, in
//! registration order.

use std::fmt;

use tracing::trace;

use crate::error::Error;
use crate::heap::{hash_record, Heap, ObjectId, Value};
use crate::path::PathElement;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u32);

impl PlaceholderId {
    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HashJobId(u32);

#[derive(Clone, Debug, PartialEq)]
pub enum PlaceholderKind {
    /// A sealed record of `class` whose fields are still being read.
    Object { class: String },
    /// Slot `element` of the composite under construction. `cached` is the
    /// slot's position once it has been looked up.
    FieldReference {
        element: PathElement,
        cached: Option<usize>,
    },
    /// The hash of the record under construction.
    Hash,
}

/// A deferred patch run when its placeholder resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaceholderUse {
    SetField { object: ObjectId, field: String },
    SetIndex { object: ObjectId, index: usize },
    SetEntry { object: ObjectId, key: String },
    /// Resolve another placeholder with the same value.
    ChainTo(PlaceholderId),
    /// Re-check a pending record hash.
    HashCheck(HashJobId),
}

#[derive(Debug)]
pub struct Placeholder {
    kind: PlaceholderKind,
    value: Option<Value>,
    uses: Vec<PlaceholderUse>,
}

impl Placeholder {
    pub fn kind(&self) -> &PlaceholderKind {
        &self.kind
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    pub fn pending_uses(&self) -> &[PlaceholderUse] {
        &self.uses
    }
}

/// A record field as captured for a deferred hash.
#[derive(Clone, Debug)]
pub enum JobSlot {
    Known(Value),
    Pending(PlaceholderId),
}

/// A record hash waiting on the placeholders in `deferred`.
#[derive(Debug)]
pub struct HashJob {
    pub class: String,
    /// Every field except the hash field, in read order.
    pub fields: Vec<(String, JobSlot)>,
    pub deferred: Vec<PlaceholderId>,
    /// The `Hash` placeholders that receive the result.
    pub targets: Vec<PlaceholderId>,
    done: bool,
}

impl HashJob {
    pub fn new(class: impl Into<String>, fields: Vec<(String, JobSlot)>) -> Self {
        HashJob {
            class: class.into(),
            fields,
            deferred: Vec::new(),
            targets: Vec::new(),
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Arena of the placeholders and hash jobs of one read session.
#[derive(Debug, Default)]
pub struct Placeholders {
    arena: Vec<Placeholder>,
    jobs: Vec<HashJob>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn create(&mut self, kind: PlaceholderKind) -> PlaceholderId {
        let id = PlaceholderId(self.arena.len() as u32);
        trace!(placeholder = %id, ?kind, "placeholder created");
        self.arena.push(Placeholder {
            kind,
            value: None,
            uses: Vec::new(),
        });
        id
    }

    #[inline(always)]
    pub fn get(&self, id: PlaceholderId) -> &Placeholder {
        &self.arena[id.index()]
    }

    pub fn kind_mut(&mut self, id: PlaceholderId) -> &mut PlaceholderKind {
        &mut self.arena[id.index()].kind
    }

    #[inline(always)]
    pub fn value(&self, id: PlaceholderId) -> Option<&Value> {
        self.get(id).value.as_ref()
    }

    #[inline(always)]
    pub fn is_resolved(&self, id: PlaceholderId) -> bool {
        self.get(id).is_resolved()
    }

    /// Queues `use_` on `id`, or fires it right away if `id` already resolved.
    pub fn register_use(
        &mut self,
        id: PlaceholderId,
        use_: PlaceholderUse,
        heap: &mut Heap,
    ) -> Result<(), Error> {
        match self.get(id).value.clone() {
            Some(value) => self.fire(use_, &value, heap),
            None => {
                self.arena[id.index()].uses.push(use_);
                Ok(())
            }
        }
    }

    /// Resolves `id` and fires its queued uses.
    ///
    /// # Panics
    ///
    /// Panics if `id` was already resolved.
    #[track_caller]
    pub fn apply(&mut self, id: PlaceholderId, value: Value, heap: &mut Heap) -> Result<(), Error> {
        let placeholder = &mut self.arena[id.index()];
        if placeholder.value.is_some() {
            panic!("placeholder {id} applied twice");
        }
        placeholder.value = Some(value.clone());
        let uses = std::mem::take(&mut placeholder.uses);
        trace!(placeholder = %id, ?value, uses = uses.len(), "placeholder resolved");
        for use_ in uses {
            self.fire(use_, &value, heap)?;
        }
        Ok(())
    }

    fn fire(&mut self, use_: PlaceholderUse, value: &Value, heap: &mut Heap) -> Result<(), Error> {
        match use_ {
            PlaceholderUse::SetField { object, field } => {
                heap.set_field(object, &field, value.clone())
            }
            PlaceholderUse::SetIndex { object, index } => {
                heap.set_index(object, index, value.clone())
            }
            PlaceholderUse::SetEntry { object, key } => heap.set_entry(object, &key, value.clone()),
            PlaceholderUse::ChainTo(next) => self.apply(next, value.clone(), heap),
            PlaceholderUse::HashCheck(job) => self.run_hash_job(job, heap),
        }
    }

    pub fn add_hash_job(&mut self, job: HashJob) -> HashJobId {
        let id = HashJobId(self.jobs.len() as u32);
        self.jobs.push(job);
        id
    }

    pub fn hash_job(&self, id: HashJobId) -> &HashJob {
        &self.jobs[id.0 as usize]
    }

    /// Computes and applies the hash once every deferred placeholder of the
    /// job has resolved. Later calls are no-ops.
    pub fn run_hash_job(&mut self, id: HashJobId, heap: &mut Heap) -> Result<(), Error> {
        let job = &self.jobs[id.0 as usize];
        if job.done || !job.deferred.iter().all(|p| self.is_resolved(*p)) {
            return Ok(());
        }
        let fields: Vec<(&str, Value)> = job
            .fields
            .iter()
            .map(|(name, slot)| {
                let value = match slot {
                    JobSlot::Known(value) => value.clone(),
                    JobSlot::Pending(p) => self.value(*p).cloned().unwrap_or_default(),
                };
                (name.as_str(), value)
            })
            .collect();
        let hash = hash_record(&job.class, fields.iter().map(|(name, value)| (*name, value)));
        let targets = job.targets.clone();
        self.jobs[id.0 as usize].done = true;
        trace!(class = %self.jobs[id.0 as usize].class, hash, "record hash resolved");
        for target in targets {
            self.apply(target, Value::Int(hash), heap)?;
        }
        Ok(())
    }
}
