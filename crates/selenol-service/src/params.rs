//! Declarative parameter extraction for request handlers.
//!
//! A handler declares its inputs as named extractors, each a function of the
//! opaque store handle and the inbound [`Message`]. [`ParamSpec`] captures
//! the set once at registration time and resolves every extractor into an
//! [`Args`] bag per request; any extraction failure propagates unmodified to
//! the dispatcher, which owns the recoverable-vs-fatal decision.
//!
//! The extractor factories mirror the three argument origins: caller
//! content, hub session, and computed values (the request id, or an entity
//! loaded from the store by a resolved identifier).

use std::collections::BTreeMap;

use serde_json::Value;

use selenol_protocol::{Message, SafeDict, SafeValue, Segment, SelenolError, ValuePath};

use crate::errors::HandlerError;

/// Named extractor registered on a [`ParamSpec`].
pub type Extractor<S> = Box<dyn Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync>;

/// Descends `path` from a dictionary view, returning the leaf as an owned
/// value.
///
/// Each step uses the view's own lookup, so a missing key or index raises
/// the view's error kind carrying the segment that failed. A step whose type
/// class does not match the node (a key against a sequence, an index against
/// a mapping, anything against a scalar) raises the same kind.
///
/// # Errors
///
/// Returns [`SelenolError::EmptyPath`] for an empty path, or the view's
/// missing-entry error for the first unreachable step.
pub fn value_at(root: SafeDict<'_>, path: &[Segment]) -> Result<Value, SelenolError> {
    if path.is_empty() {
        return Err(SelenolError::EmptyPath);
    }
    let kind = root.kind();
    let mut node = SafeValue::Dict(root);
    for segment in path {
        node = match (node, segment) {
            (SafeValue::Dict(dict), Segment::Key(key)) => dict.get(key)?,
            (SafeValue::List(list), Segment::Index(index)) => list.get(*index)?,
            (_, unreachable_segment) => return Err(kind.error(unreachable_segment.clone())),
        };
    }
    Ok(node.to_value())
}

/// Extractor reading a value from the caller's content section.
///
/// A missing step raises the content-argument kind, no matter where the
/// path would have pointed in other sections.
pub fn value_from_content<S>(
    path: impl Into<ValuePath>,
) -> impl Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync {
    let path = path.into();
    move |_store: &S, message: &Message| value_at(message.content(), path.segments())
}

/// Extractor reading a value from the hub-managed session section.
///
/// A missing step raises the session-argument kind, distinct from the
/// content kind so callers can tell "caller omitted it" from "hub omitted
/// it".
pub fn value_from_session<S>(
    path: impl Into<ValuePath>,
) -> impl Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync {
    let path = path.into();
    move |_store: &S, message: &Message| value_at(message.session(), path.segments())
}

/// Extractor resolving a content value into a store entity.
///
/// The raw value is read exactly like [`value_from_content`]; the loader
/// then maps it through the store. A `None` result raises
/// [`SelenolError::InvalidArgument`] carrying the path and the resolved
/// value: the argument was present but names no real entity.
pub fn object_from_content<S, L>(
    loader: L,
    path: impl Into<ValuePath>,
) -> impl Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync
where
    L: Fn(&S, &Value) -> Option<Value> + Send + Sync,
{
    let path = path.into();
    move |store: &S, message: &Message| {
        let value = value_at(message.content(), path.segments())?;
        loader(store, &value)
            .ok_or_else(|| SelenolError::invalid_argument(path.clone(), value))
    }
}

/// Extractor resolving a session value into a store entity.
///
/// Session counterpart of [`object_from_content`].
pub fn object_from_session<S, L>(
    loader: L,
    path: impl Into<ValuePath>,
) -> impl Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync
where
    L: Fn(&S, &Value) -> Option<Value> + Send + Sync,
{
    let path = path.into();
    move |store: &S, message: &Message| {
        let value = value_at(message.session(), path.segments())?;
        loader(store, &value)
            .ok_or_else(|| SelenolError::invalid_argument(path.clone(), value))
    }
}

/// Extractor returning the inbound request id unconditionally.
pub fn request_id<S>() -> impl Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync {
    |_store: &S, message: &Message| Ok(message.request_id().clone())
}

/// Named argument values resolved for one request.
///
/// Binding is by name; registration order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: BTreeMap<String, Value>,
}

impl Args {
    /// Returns the value bound to `name`, when one was resolved.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    ///
    /// Returns a missing-argument error naming `name` when no extractor of
    /// that name was registered.
    pub fn require(&self, name: &str) -> Result<&Value, SelenolError> {
        self.values
            .get(name)
            .ok_or_else(|| SelenolError::missing_argument(name))
    }

    /// Removes and returns the value bound to `name`.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Returns the number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no arguments are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }
}

/// Fixed set of named extractors composed into handler call arguments.
///
/// The builder equivalent of a parameter decorator: the extractor set is
/// captured once when the handler is registered and reused for the lifetime
/// of the process.
pub struct ParamSpec<S> {
    extractors: Vec<(String, Extractor<S>)>,
}

impl<S> ParamSpec<S> {
    /// Creates an empty spec.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registers a named extractor.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&S, &Message) -> Result<Value, SelenolError> + Send + Sync + 'static,
    {
        self.extractors.push((name.into(), Box::new(extractor)));
        self
    }

    /// Evaluates every extractor against the store and message.
    ///
    /// # Errors
    ///
    /// The first extractor failure propagates unmodified; nothing is caught
    /// at this layer.
    pub fn resolve(&self, store: &S, message: &Message) -> Result<Args, SelenolError> {
        let mut args = Args::default();
        for (name, extractor) in &self.extractors {
            args.insert(name.clone(), extractor(store, message)?);
        }
        Ok(args)
    }

    /// Composes the spec with a handler into one callable of the dispatch
    /// shape.
    pub fn bind<F>(
        self,
        handler: F,
    ) -> impl Fn(&S, &Message) -> Result<Value, HandlerError> + Send + Sync
    where
        F: Fn(&S, Args) -> Result<Value, HandlerError> + Send + Sync,
    {
        move |store: &S, message: &Message| {
            let args = self.resolve(store, message)?;
            handler(store, args)
        }
    }
}

impl<S> Default for ParamSpec<S> {
    fn default() -> Self {
        Self::new()
    }
}
