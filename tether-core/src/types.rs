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

use std::fmt;

/// Prefix shared by every reference token on the wire.
pub const REF_MARKER: char = '@';
/// Full-path references start with this token; on its own it names the root.
pub const ROOT_TOKEN: &str = "@root";
/// Stands for the hash of the enclosing record.
pub const HASH_TOKEN: &str = "@hash";
/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';
/// Escape character inside field segments.
pub const PATH_ESCAPE: char = '\\';

/// How aggressively a write pass detects duplicates and cycles, and which
/// references a read pass will accept.
///
/// The policy is fixed for a whole session; writer and reader must agree on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReferencePolicy {
    /// No identity tracking. Shared values are duplicated and cyclic input
    /// never terminates (it is cut off by the depth limit).
    None,
    /// Track ancestors only and fail on the first cycle.
    DetectAndThrow,
    /// Reference ancestors (cycles); duplicates elsewhere are written in full.
    #[default]
    CircularOnly,
    /// As [`ReferencePolicy::CircularOnly`], plus the sibling shorthand for
    /// duplicates that share an immediate parent.
    CircularAndSiblings,
    /// Every repeated identity is written as a reference.
    AllDuplicates,
}

/// Lifetime of an identity registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryScope {
    /// Nothing is registered.
    Disabled,
    /// An entry lives while its value's own subtree is being written.
    Scoped,
    /// An entry lives until the session ends.
    Session,
}

/// What a registry hit turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleAction {
    Reference,
    Throw,
}

/// The three knobs every [`ReferencePolicy`] reduces to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyTraits {
    pub scope: RegistryScope,
    pub detect_siblings: bool,
    pub on_cycle: CycleAction,
}

impl ReferencePolicy {
    pub const ALL: [ReferencePolicy; 5] = [
        ReferencePolicy::None,
        ReferencePolicy::DetectAndThrow,
        ReferencePolicy::CircularOnly,
        ReferencePolicy::CircularAndSiblings,
        ReferencePolicy::AllDuplicates,
    ];

    #[inline(always)]
    pub const fn traits(self) -> PolicyTraits {
        match self {
            ReferencePolicy::None => PolicyTraits {
                scope: RegistryScope::Disabled,
                detect_siblings: false,
                on_cycle: CycleAction::Reference,
            },
            ReferencePolicy::DetectAndThrow => PolicyTraits {
                scope: RegistryScope::Scoped,
                detect_siblings: false,
                on_cycle: CycleAction::Throw,
            },
            ReferencePolicy::CircularOnly => PolicyTraits {
                scope: RegistryScope::Scoped,
                detect_siblings: false,
                on_cycle: CycleAction::Reference,
            },
            ReferencePolicy::CircularAndSiblings => PolicyTraits {
                scope: RegistryScope::Scoped,
                detect_siblings: true,
                on_cycle: CycleAction::Reference,
            },
            ReferencePolicy::AllDuplicates => PolicyTraits {
                scope: RegistryScope::Session,
                detect_siblings: true,
                on_cycle: CycleAction::Reference,
            },
        }
    }

    /// Whether a pass under this policy can reproduce cyclic graphs.
    pub const fn supports_cycles(self) -> bool {
        matches!(
            self,
            ReferencePolicy::CircularOnly
                | ReferencePolicy::CircularAndSiblings
                | ReferencePolicy::AllDuplicates
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            ReferencePolicy::None => "None",
            ReferencePolicy::DetectAndThrow => "DetectAndThrow",
            ReferencePolicy::CircularOnly => "CircularOnly",
            ReferencePolicy::CircularAndSiblings => "CircularAndSiblings",
            ReferencePolicy::AllDuplicates => "AllDuplicates",
        }
    }
}

impl fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
