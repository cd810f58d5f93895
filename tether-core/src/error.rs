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

//! Error type for tether serialization and deserialization.
//!
//! Error constructors sit on the hot path of every read and write, so they are
//! marked `#[cold]` and `#[track_caller]`; keep those attributes when adding
//! new ones.
//!
//! Structural protocol violations (unbalanced `enter`/`exit`, a placeholder
//! applied twice, children read before their parent was registered) are codec
//! bugs and panic instead of producing an [`enum@Error`].

use std::borrow::Cow;

use thiserror::Error;

/// Global flag to check if TETHER_PANIC_ON_ERROR environment variable is set at compile time.
/// Set TETHER_PANIC_ON_ERROR=1 at compile time to enable panic on error.
pub const PANIC_ON_ERROR: bool = option_env!("TETHER_PANIC_ON_ERROR").is_some();

/// Error type for tether operations.
///
/// # Always use the constructor functions
///
/// Do not build variants directly; use [`Error::missing_reference`],
/// [`Error::illegal_reference`], [`Error::circular_reference`] and friends.
/// They convert their arguments and honor `TETHER_PANIC_ON_ERROR`.
///
/// ```rust
/// use tether_core::error::Error;
///
/// let err = Error::missing_reference("@root.items.3", "@root.owner");
/// assert_eq!(
///     err.to_string(),
///     "reference `@root.items.3` at `@root.owner` does not match any value read so far"
/// );
/// ```
///
/// ## Debug mode: TETHER_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 TETHER_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// With the variable set at compile time every constructor panics with the
/// error message, so the backtrace points at the code that created the error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A reference token names a path that holds no value.
    ///
    /// Do not construct this variant directly; use [`Error::missing_reference`] instead.
    #[error("reference `{reference}` at `{at}` does not match any value read so far")]
    MissingReference {
        reference: Cow<'static, str>,
        at: Cow<'static, str>,
    },

    /// A well-formed reference that the active policy could never have written.
    ///
    /// Do not construct this variant directly; use [`Error::illegal_reference`] instead.
    #[error("reference from `{from}` to `{to}` is not permitted under policy {policy}")]
    IllegalReference {
        policy: Cow<'static, str>,
        from: Cow<'static, str>,
        to: Cow<'static, str>,
    },

    /// A cycle found while writing under `DetectAndThrow`.
    ///
    /// Do not construct this variant directly; use [`Error::circular_reference`] instead.
    #[error("circular reference detected: `{from}` refers back to `{to}`")]
    CircularReference {
        from: Cow<'static, str>,
        to: Cow<'static, str>,
    },

    /// Two entries of one keyed container share a key.
    ///
    /// Do not construct this variant directly; use [`Error::duplicate_key`] instead.
    #[error("duplicate key `{key}` in `{at}`")]
    DuplicateKey {
        key: Cow<'static, str>,
        at: Cow<'static, str>,
    },

    /// A value or token does not have the shape its declared type requires.
    ///
    /// Do not construct this variant directly; use [`Error::type_mismatch`] instead.
    #[error("type mismatch at `{at}`: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
        at: Cow<'static, str>,
    },

    /// A class name that was never registered.
    ///
    /// Do not construct this variant directly; use [`Error::unknown_class`] instead.
    #[error("class `{0}` is not registered")]
    UnknownClass(Cow<'static, str>),

    /// A record field that its class does not declare.
    ///
    /// Do not construct this variant directly; use [`Error::unknown_field`] instead.
    #[error("class `{class}` has no field `{field}`")]
    UnknownField {
        class: Cow<'static, str>,
        field: Cow<'static, str>,
    },

    /// Invalid or corrupted data encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// The input is not well-formed JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic unknown error.
    ///
    /// Do not construct this variant directly; use [`Error::unknown`] instead.
    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

impl Error {
    #[inline(always)]
    #[track_caller]
    fn checked(self) -> Self {
        if PANIC_ON_ERROR {
            panic!("TETHER_PANIC_ON_ERROR: {}", self);
        }
        self
    }

    /// Creates a new [`Error::MissingReference`].
    ///
    /// # Example
    /// ```
    /// use tether_core::error::Error;
    ///
    /// let err = Error::missing_reference("@.left", "@root.right");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn missing_reference<R, A>(reference: R, at: A) -> Self
    where
        R: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        Error::MissingReference {
            reference: reference.into(),
            at: at.into(),
        }
        .checked()
    }

    /// Creates a new [`Error::IllegalReference`] carrying both paths for diagnostics.
    ///
    /// # Example
    /// ```
    /// use tether_core::error::Error;
    ///
    /// let err = Error::illegal_reference("CircularOnly", "@root.b", "@root.a");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn illegal_reference<P, F, T>(policy: P, from: F, to: T) -> Self
    where
        P: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
        T: Into<Cow<'static, str>>,
    {
        Error::IllegalReference {
            policy: policy.into(),
            from: from.into(),
            to: to.into(),
        }
        .checked()
    }

    /// Creates a new [`Error::CircularReference`] from the origin and target paths.
    ///
    /// # Example
    /// ```
    /// use tether_core::error::Error;
    ///
    /// let err = Error::circular_reference("@root.connections.0", "@root");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn circular_reference<F, T>(from: F, to: T) -> Self
    where
        F: Into<Cow<'static, str>>,
        T: Into<Cow<'static, str>>,
    {
        Error::CircularReference {
            from: from.into(),
            to: to.into(),
        }
        .checked()
    }

    /// Creates a new [`Error::DuplicateKey`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn duplicate_key<K, A>(key: K, at: A) -> Self
    where
        K: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        Error::DuplicateKey {
            key: key.into(),
            at: at.into(),
        }
        .checked()
    }

    /// Creates a new [`Error::TypeMismatch`].
    ///
    /// # Example
    /// ```
    /// use tether_core::error::Error;
    ///
    /// let err = Error::type_mismatch("record `Node`", "list", "@root.next");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<E, F, A>(expected: E, found: F, at: A) -> Self
    where
        E: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            at: at.into(),
        }
        .checked()
    }

    /// Creates a new [`Error::UnknownClass`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_class<S: Into<Cow<'static, str>>>(class: S) -> Self {
        Error::UnknownClass(class.into()).checked()
    }

    /// Creates a new [`Error::UnknownField`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_field<C, F>(class: C, field: F) -> Self
    where
        C: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
    {
        Error::UnknownField {
            class: class.into(),
            field: field.into(),
        }
        .checked()
    }

    /// Creates a new [`Error::InvalidData`] from a string or static message.
    ///
    /// # Example
    /// ```
    /// use tether_core::error::Error;
    ///
    /// let err = Error::invalid_data("unexpected end of token stream");
    /// let err = Error::invalid_data(format!("malformed reference `{}`", "@rooot"));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::InvalidData(s.into()).checked()
    }

    /// Creates a new [`Error::DepthExceed`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::DepthExceed(s.into()).checked()
    }

    /// Creates a new [`Error::Unknown`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::Unknown(s.into()).checked()
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use tether_core::ensure;
/// use tether_core::error::Error;
///
/// fn check_len(n: usize) -> Result<(), Error> {
///     ensure!(n > 0, "length must be positive");
///     ensure!(n < 10, "length {} too large", n);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`enum@Error`].
///
/// # Examples
/// ```
/// use tether_core::bail;
/// use tether_core::error::Error;
///
/// fn fail_fast() -> Result<(), Error> {
///     bail!("something went wrong");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::unknown($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)))
    };
}
