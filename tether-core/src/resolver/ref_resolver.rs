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

use std::collections::HashMap;

use tracing::trace;

use crate::error::Error;
use crate::heap::{ObjectId, Value};
use crate::path::{Path, PathElement, Reference};
use crate::resolver::placeholder::{PlaceholderId, Placeholders};
use crate::types::{CycleAction, PolicyTraits, ReferencePolicy, RegistryScope};

type SiblingMap = HashMap<ObjectId, PathElement>;

/// Write-side identity tracking.
///
/// IdentityRegistry maps every object currently eligible for a back-reference
/// to the path where it was written in full. Under scoped policies an entry
/// lives only while the object's own subtree is written, which makes every
/// hit an ancestor, i.e. a cycle. Under [`ReferencePolicy::AllDuplicates`]
/// entries live for the whole session.
///
/// Policies that detect siblings also keep one map per open composite: the
/// identities of the non-leaf children written so far at that level, written
/// in full or not. A hit there becomes the `@.element` shorthand.
///
/// # Examples
///
/// ```rust
/// use tether_core::heap::{Heap, Record};
/// use tether_core::path::{Path, Reference};
/// use tether_core::resolver::ref_resolver::IdentityRegistry;
/// use tether_core::types::ReferencePolicy;
///
/// let mut heap = Heap::new();
/// let node = heap.record(Record::new("Node"));
/// let mut registry = IdentityRegistry::new(ReferencePolicy::CircularOnly);
///
/// let root = Path::root();
/// assert_eq!(registry.offer(node, &root).unwrap(), None);
/// registry.enter(node, &root);
///
/// // the node reached again from inside itself
/// let inner = root.child("connections").child(0);
/// assert_eq!(
///     registry.offer(node, &inner).unwrap(),
///     Some(Reference::Full(Path::root()))
/// );
/// registry.exit(node);
/// ```
#[derive(Debug)]
pub struct IdentityRegistry {
    policy: ReferencePolicy,
    traits: PolicyTraits,
    paths: HashMap<ObjectId, Path>,
    levels: Vec<SiblingMap>,
    pool: Vec<SiblingMap>,
}

impl IdentityRegistry {
    pub fn new(policy: ReferencePolicy) -> Self {
        let traits = policy.traits();
        let levels = if traits.detect_siblings {
            vec![SiblingMap::new()]
        } else {
            Vec::new()
        };
        IdentityRegistry {
            policy,
            traits,
            paths: HashMap::new(),
            levels,
            pool: Vec::new(),
        }
    }

    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.traits.scope != RegistryScope::Disabled
    }

    /// Number of identities that would currently produce a full reference.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.paths.contains_key(&id)
    }

    /// Decides whether the non-leaf object `id`, about to be written at
    /// `current`, is written as a reference.
    ///
    /// `Ok(None)` means write it in full and call [`IdentityRegistry::enter`].
    pub fn offer(&mut self, id: ObjectId, current: &Path) -> Result<Option<Reference>, Error> {
        if !self.is_enabled() {
            return Ok(None);
        }
        if let Some(element) = self.levels.last().and_then(|level| level.get(&id)) {
            let reference = Reference::Sibling(element.clone());
            trace!(at = %current, %reference, "sibling reference");
            return Ok(Some(reference));
        }
        let Some(target) = self.paths.get(&id) else {
            return Ok(None);
        };
        if self.traits.on_cycle == CycleAction::Throw {
            return Err(Error::circular_reference(
                current.to_string(),
                target.to_string(),
            ));
        }
        let reference = Reference::Full(target.clone());
        trace!(at = %current, %reference, "back reference");
        self.note_sibling(id, current);
        Ok(Some(reference))
    }

    /// Registers `id` as written in full at `current` and opens the sibling
    /// level of its children.
    pub fn enter(&mut self, id: ObjectId, current: &Path) {
        if !self.is_enabled() {
            return;
        }
        self.note_sibling(id, current);
        self.paths.insert(id, current.clone());
        self.push_level();
    }

    /// Closes the subtree opened by [`IdentityRegistry::enter`].
    pub fn exit(&mut self, id: ObjectId) {
        if !self.is_enabled() {
            return;
        }
        self.pop_level();
        if self.traits.scope == RegistryScope::Scoped {
            self.paths.remove(&id);
        }
    }

    /// Opens a sibling level for a composite that is not itself tracked.
    pub fn push_level(&mut self) {
        if self.traits.detect_siblings {
            let level = self.pool.pop().unwrap_or_default();
            self.levels.push(level);
        }
    }

    pub fn pop_level(&mut self) {
        if self.traits.detect_siblings {
            if let Some(mut level) = self.levels.pop() {
                level.clear();
                self.pool.push(level);
            }
        }
    }

    fn note_sibling(&mut self, id: ObjectId, current: &Path) {
        if let (Some(level), Some(element)) = (self.levels.last_mut(), current.last()) {
            level.entry(id).or_insert_with(|| element.clone());
        }
    }
}

/// What a read session knows about one path.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    Value(Value),
    Pending(PlaceholderId),
}

/// Result of a [`PathTable`] lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Value(Value),
    Placeholder(PlaceholderId),
    NotFound,
}

/// Read-side map from every path read so far to its value, or to the
/// placeholder standing in for a value still under construction.
#[derive(Debug, Default)]
pub struct PathTable {
    slots: HashMap<Path, Slot>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn insert_value(&mut self, path: Path, value: Value) {
        self.slots.insert(path, Slot::Value(value));
    }

    pub fn insert_pending(&mut self, path: Path, placeholder: PlaceholderId) {
        self.slots.insert(path, Slot::Pending(placeholder));
    }

    /// A pending entry whose placeholder has since resolved reads as its value.
    pub fn lookup(&self, path: &Path, placeholders: &Placeholders) -> Lookup {
        match self.slots.get(path) {
            Some(Slot::Value(value)) => Lookup::Value(value.clone()),
            Some(Slot::Pending(id)) => match placeholders.value(*id) {
                Some(value) => Lookup::Value(value.clone()),
                None => Lookup::Placeholder(*id),
            },
            None => Lookup::NotFound,
        }
    }
}
