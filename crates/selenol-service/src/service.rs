//! Service dispatcher and connection lifecycle.
//!
//! A [`Service`] owns one hub connection and answers the requests whose
//! reason path starts with its configured prefix. The run loop is strictly
//! sequential: receive, filter, dispatch, reply, repeat, with exactly one
//! in-flight request at a time. The only way out is the transport failing;
//! the closed-connection signal reaches the handler's `on_closed` hook and
//! then propagates to the caller of [`Service::run`].

use std::fmt;

use serde_json::Value;
use tracing::{debug, error};

use selenol_protocol::{Connection, ConnectionError, Message};

use crate::context::ServiceContext;
use crate::errors::{HandlerError, ServiceError};

/// Tracing target for the dispatch loop.
pub(crate) const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Wire text reported for failures outside the Selenol taxonomy.
const FOREIGN_FAILURE_TEXT: &str = "Not a Selenol exception";

/// Reason-path prefix a service instance answers for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReasonPrefix(Vec<String>);

impl ReasonPrefix {
    /// Builds a prefix from its components.
    pub fn new<I, T>(components: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// Returns the prefix components in routing order.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty prefix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Component-wise prefix match against an inbound reason.
    ///
    /// An absent reason never matches; a present one must be at least as
    /// long as the prefix and equal over the prefix length. The first
    /// mismatched component decides rejection.
    #[must_use]
    pub fn matches(&self, reason: Option<&[String]>) -> bool {
        let Some(reason) = reason else {
            return false;
        };
        reason.len() >= self.0.len()
            && self
                .0
                .iter()
                .zip(reason)
                .all(|(prefix, component)| prefix == component)
    }
}

impl From<Vec<String>> for ReasonPrefix {
    fn from(components: Vec<String>) -> Self {
        Self(components)
    }
}

impl fmt::Display for ReasonPrefix {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0.join("."))
    }
}

/// Lifecycle and request capabilities injected into a [`Service`].
///
/// `on_open` and `on_closed` default to no-ops; only `on_request` must be
/// provided.
pub trait ServiceHandler<C: Connection, S> {
    /// Invoked once before the first receive; may emit outbound frames.
    ///
    /// # Errors
    ///
    /// A transport failure here terminates the service before its loop
    /// starts.
    fn on_open(&mut self, _context: &mut ServiceContext<C, S>) -> Result<(), ConnectionError> {
        Ok(())
    }

    /// Handles one inbound request whose reason matched the prefix.
    ///
    /// The return value becomes the result frame's content; a
    /// [`HandlerError::Domain`] failure is reported to the hub verbatim and
    /// any other failure is redacted to a fixed sentinel text.
    ///
    /// # Errors
    ///
    /// Failures are translated into exception frames by the dispatcher;
    /// they never terminate the loop.
    fn on_request(
        &mut self,
        context: &mut ServiceContext<C, S>,
        message: &Message,
    ) -> Result<Value, HandlerError>;

    /// Invoked once when the hub closes the connection, before the failure
    /// propagates out of [`Service::run`].
    fn on_closed(&mut self, _code: Option<u16>, _reason: Option<&str>) {}
}

/// Dispatcher bound to one hub connection and one reason prefix.
pub struct Service<C, S, H> {
    context: ServiceContext<C, S>,
    handler: H,
}

impl<C, S, H> Service<C, S, H>
where
    C: Connection,
    H: ServiceHandler<C, S>,
{
    /// Builds the service and announces it to the hub.
    ///
    /// # Errors
    ///
    /// Fails when the registration frame cannot be delivered.
    pub fn new(
        prefix: ReasonPrefix,
        connection: C,
        store: S,
        handler: H,
    ) -> Result<Self, ServiceError> {
        let mut context = ServiceContext::new(prefix, connection, store);
        context.register()?;
        Ok(Self { context, handler })
    }

    /// Returns the messaging context, for use outside the dispatch loop.
    pub const fn context(&mut self) -> &mut ServiceContext<C, S> {
        &mut self.context
    }

    /// Attaches metadata to an in-flight request.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn metadata(&mut self, request_id: Value, content: Value) -> Result<(), ConnectionError> {
        self.context.metadata(request_id, content)
    }

    /// Registers a deferred event for a request.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn event(
        &mut self,
        request_id: Value,
        trigger: Value,
        reason: Value,
        content: Value,
    ) -> Result<(), ConnectionError> {
        self.context.event(request_id, trigger, reason, content)
    }

    /// Broadcasts a notification on a topic.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn notify(&mut self, topic: Value, content: Value) -> Result<(), ConnectionError> {
        self.context.notify(topic, content)
    }

    /// Routes an arbitrary payload through the hub.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn send(&mut self, reason: Value, content: Value) -> Result<(), ConnectionError> {
        self.context.send(reason, content)
    }

    /// Runs the dispatch loop until the connection fails.
    ///
    /// The loop has no orderly exit: it ends when the transport reports a
    /// failure, closed-connection included, and that failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the fatal failure that ended the loop. A frame without a
    /// `request_id` is also fatal and surfaces as
    /// [`ServiceError::Message`].
    pub fn run(&mut self) -> Result<(), ServiceError> {
        self.handler.on_open(&mut self.context)?;
        loop {
            let outcome = match self.context.recv() {
                Ok(raw) => self.dispatch(&raw),
                Err(error) => Err(ServiceError::from(error)),
            };
            if let Err(failure) = outcome {
                if let ServiceError::Connection(ConnectionError::Closed { code, reason }) =
                    &failure
                {
                    self.handler.on_closed(*code, reason.as_deref());
                }
                return Err(failure);
            }
        }
    }

    fn dispatch(&mut self, raw: &Value) -> Result<(), ServiceError> {
        let message = Message::parse(raw).map_err(ServiceError::Message)?;

        if !self.context.prefix().matches(message.reason()) {
            debug!(
                target: SERVICE_TARGET,
                prefix = %self.context.prefix(),
                "ignoring frame outside the service prefix"
            );
            return Ok(());
        }

        let request_id = message.request_id().clone();
        match self.handler.on_request(&mut self.context, &message) {
            Ok(content) => self.context.reply_result(request_id, content)?,
            Err(HandlerError::Domain(failure)) => {
                error!(target: SERVICE_TARGET, %failure, "request failed");
                self.context
                    .reply_exception(request_id, &failure.to_string())?;
            }
            Err(HandlerError::Other(failure)) => {
                error!(
                    target: SERVICE_TARGET,
                    failure = ?failure,
                    "request failed outside the Selenol taxonomy"
                );
                self.context
                    .reply_exception(request_id, FOREIGN_FAILURE_TEXT)?;
            }
        }
        Ok(())
    }
}
