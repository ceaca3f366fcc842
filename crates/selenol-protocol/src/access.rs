//! Exception-safe views over raw payload trees.
//!
//! [`SafeDict`] and [`SafeList`] wrap borrowed mapping/sequence nodes so
//! that a failed lookup raises a caller-chosen [`SelenolError`] variant
//! carrying the missing key or index, instead of panicking or silently
//! returning nothing. Lookups on present entries re-wrap nested composites
//! with the same error kind and pass every other value through verbatim, so
//! a present-but-falsy value (`null`, `0`, `false`, `""`) is never confused
//! with an absent one.
//!
//! Views borrow their source and never mutate it; any number of views may
//! wrap the same node at once.

use serde_json::{Map, Value};

use crate::error::SelenolError;
use crate::segment::Segment;

/// Selects which [`SelenolError`] variant a failed lookup raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    /// Generic missing-entry failure, outside any argument context.
    Entry,
    /// Missing required content argument.
    ContentArgument,
    /// Missing required session argument.
    SessionArgument,
}

impl MissingKind {
    /// Builds the error this kind raises for the given offending segment.
    #[must_use]
    pub fn error(self, segment: Segment) -> SelenolError {
        match self {
            Self::Entry => SelenolError::MissingEntry { segment },
            Self::ContentArgument => SelenolError::MissingArgument { segment },
            Self::SessionArgument => SelenolError::MissingSessionArgument { segment },
        }
    }
}

/// Read-only view over a mapping node.
#[derive(Debug, Clone, Copy)]
pub struct SafeDict<'a> {
    map: &'a Map<String, Value>,
    kind: MissingKind,
}

impl<'a> SafeDict<'a> {
    /// Wraps a mapping with the error kind its lookups raise.
    #[must_use]
    pub const fn new(map: &'a Map<String, Value>, kind: MissingKind) -> Self {
        Self { map, kind }
    }

    /// Returns the error kind this view raises.
    #[must_use]
    pub const fn kind(&self) -> MissingKind {
        self.kind
    }

    /// Looks up `key`, re-wrapping composite values.
    ///
    /// # Errors
    ///
    /// Raises this view's error kind carrying `key` when the entry is
    /// absent.
    pub fn get(&self, key: &str) -> Result<SafeValue<'a>, SelenolError> {
        self.map
            .get(key)
            .map(|value| SafeValue::wrap(value, self.kind))
            .ok_or_else(|| self.kind.error(Segment::key(key)))
    }

    /// Returns the number of entries in the wrapped mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true when the wrapped mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Read-only view over a sequence node.
#[derive(Debug, Clone, Copy)]
pub struct SafeList<'a> {
    items: &'a [Value],
    kind: MissingKind,
}

impl<'a> SafeList<'a> {
    /// Wraps a sequence with the error kind its lookups raise.
    #[must_use]
    pub const fn new(items: &'a [Value], kind: MissingKind) -> Self {
        Self { items, kind }
    }

    /// Returns the error kind this view raises.
    #[must_use]
    pub const fn kind(&self) -> MissingKind {
        self.kind
    }

    /// Looks up `index`, re-wrapping composite values.
    ///
    /// # Errors
    ///
    /// Raises this view's error kind carrying `index` when it falls outside
    /// `[0, len)`. Negative and past-the-end indices share one error shape.
    pub fn get(&self, index: i64) -> Result<SafeValue<'a>, SelenolError> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.items.get(position))
            .map(|value| SafeValue::wrap(value, self.kind))
            .ok_or_else(|| self.kind.error(Segment::index(index)))
    }

    /// Returns the number of items in the wrapped sequence.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the wrapped sequence has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A payload node produced by a safe lookup.
///
/// Composite nodes come back as fresh views carrying the parent's error
/// kind; everything else is the borrowed raw value, verbatim.
#[derive(Debug, Clone, Copy)]
pub enum SafeValue<'a> {
    /// Nested mapping, re-wrapped.
    Dict(SafeDict<'a>),
    /// Nested sequence, re-wrapped.
    List(SafeList<'a>),
    /// Scalar or null, unwrapped.
    Scalar(&'a Value),
}

impl<'a> SafeValue<'a> {
    /// Wraps a raw node with the given error kind.
    #[must_use]
    pub fn wrap(value: &'a Value, kind: MissingKind) -> Self {
        match value {
            Value::Object(map) => Self::Dict(SafeDict::new(map, kind)),
            Value::Array(items) => Self::List(SafeList::new(items.as_slice(), kind)),
            other => Self::Scalar(other),
        }
    }

    /// Returns the node as an owned raw value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Dict(dict) => Value::Object(dict.map.clone()),
            Self::List(list) => Value::Array(list.items.to_vec()),
            Self::Scalar(value) => (*value).clone(),
        }
    }
}
