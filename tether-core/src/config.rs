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

use crate::types::ReferencePolicy;

/// Default cap on path depth. `serde_json` refuses to parse documents nested
/// deeper than 128 levels, so anything we write stays below that.
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Configuration for tether serialization.
///
/// Shared between the [`Tether`](crate::tether::Tether) instance and every
/// session it creates, so reader and writer see the same settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// Reference policy used by both write and read sessions.
    pub policy: ReferencePolicy,
    /// Maximum path depth of a single pass. Exceeding it aborts the pass with
    /// [`Error::DepthExceed`](crate::error::Error::DepthExceed).
    pub max_depth: u32,
    /// Whether `serialize` indents its output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            policy: ReferencePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            pretty: false,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline(always)]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}
