//! Resolution options.
//!
//! Two behaviours are left open by the payload format itself: what to do
//! when a declared relation meets a value of the wrong shape, and what a
//! dynamic accessor that is not `getX` should return. Both are chosen here
//! and carried by every [`Document`](crate::types::Document), including the
//! nested documents it hands out.

use std::env;

/// Handling of a declared relation whose raw value has the wrong shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapePolicy {
    /// Report a [`MalformedRelation`] error.
    ///
    /// [`MalformedRelation`]: crate::types::DocumentErrorType::MalformedRelation
    #[default]
    Strict,
    /// Coerce: one-object relations fall back to the raw value, list
    /// relations to an empty collection, and non-object list elements are
    /// skipped.
    Lenient,
}

/// Handling of dynamic accessor calls that are not of the `getX` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallPolicy {
    /// Report an [`UnsupportedOperation`] error.
    ///
    /// [`UnsupportedOperation`]: crate::types::DocumentErrorType::UnsupportedOperation
    #[default]
    Error,
    /// Return `Ok(None)`, the falsy sentinel older callers test for.
    Legacy,
}

/// Options shared by a document tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub shape: ShapePolicy,
    pub calls: CallPolicy,
}

impl ResolveOptions {
    /// Environment variable selecting the [`ShapePolicy`].
    pub const SHAPE_VAR: &'static str = "TELEGRAM_OBJECTS_SHAPE";
    /// Environment variable selecting the [`CallPolicy`].
    pub const CALLS_VAR: &'static str = "TELEGRAM_OBJECTS_CALLS";

    /// Strict shapes and erroring calls.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: ShapePolicy) -> Self {
        self.shape = shape;
        self
    }

    pub fn calls(mut self, calls: CallPolicy) -> Self {
        self.calls = calls;
        self
    }

    /// Read options from `TELEGRAM_OBJECTS_SHAPE` (`strict` | `lenient`)
    /// and `TELEGRAM_OBJECTS_CALLS` (`error` | `legacy`).
    ///
    /// Unset or unrecognised values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        match lookup(Self::SHAPE_VAR).as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("lenient") => options.shape = ShapePolicy::Lenient,
            Some(v) if v.eq_ignore_ascii_case("strict") => options.shape = ShapePolicy::Strict,
            Some(other) => tracing::warn!(
                var = Self::SHAPE_VAR,
                value = other,
                "unrecognised shape policy, keeping strict"
            ),
            None => {}
        }

        match lookup(Self::CALLS_VAR).as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("legacy") => options.calls = CallPolicy::Legacy,
            Some(v) if v.eq_ignore_ascii_case("error") => options.calls = CallPolicy::Error,
            Some(other) => tracing::warn!(
                var = Self::CALLS_VAR,
                value = other,
                "unrecognised call policy, keeping error"
            ),
            None => {}
        }

        options
    }
}
