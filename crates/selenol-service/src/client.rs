//! Low-level hub client without reason filtering.
//!
//! A [`Client`] dispatches every inbound frame, verbatim and unfiltered, to
//! its handler's `on_message`; a returned value is sent back as-is. Services
//! build on the same link but add the prefix filter and the typed outcome
//! translation — use [`crate::Service`] unless the raw traffic is wanted.

use serde_json::Value;
use tracing::debug;

use selenol_protocol::{Connection, ConnectionError};

use crate::context::HubLink;
use crate::errors::{HandlerError, ServiceError};
use crate::service::SERVICE_TARGET;

/// Lifecycle and message capabilities injected into a [`Client`].
pub trait ClientHandler<C: Connection, S> {
    /// Invoked once before the first receive; may emit outbound frames.
    ///
    /// # Errors
    ///
    /// A transport failure here terminates the client before its loop
    /// starts.
    fn on_open(&mut self, _link: &mut HubLink<C, S>) -> Result<(), ConnectionError> {
        Ok(())
    }

    /// Handles one inbound frame; a `Some` return is sent back verbatim.
    ///
    /// # Errors
    ///
    /// Unlike a service handler, a failure here is fatal for the loop: the
    /// raw client has no exception frames to answer with.
    fn on_message(
        &mut self,
        link: &mut HubLink<C, S>,
        message: &Value,
    ) -> Result<Option<Value>, HandlerError>;

    /// Invoked once when the hub closes the connection, before the failure
    /// propagates out of [`Client::run`].
    fn on_closed(&mut self, _code: Option<u16>, _reason: Option<&str>) {}
}

/// Unfiltered dispatcher bound to one hub connection.
pub struct Client<C, S, H> {
    link: HubLink<C, S>,
    handler: H,
}

impl<C, S, H> Client<C, S, H>
where
    C: Connection,
    H: ClientHandler<C, S>,
{
    /// Bundles a connection, a store handle and a handler.
    pub const fn new(connection: C, store: S, handler: H) -> Self {
        Self {
            link: HubLink::new(connection, store),
            handler,
        }
    }

    /// Returns the raw link, for sends outside the dispatch loop.
    pub const fn link(&mut self) -> &mut HubLink<C, S> {
        &mut self.link
    }

    /// Sends a bare `{reason, content}` frame.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn send(&mut self, reason: Value, content: Value) -> Result<(), ConnectionError> {
        self.link.send(reason, content)
    }

    /// Sends a notification on a topic.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn notify(&mut self, topic: Value, content: Value) -> Result<(), ConnectionError> {
        self.link.notify(topic, content)
    }

    /// Runs the message loop until the connection fails.
    ///
    /// # Errors
    ///
    /// Returns the fatal failure that ended the loop: a transport failure,
    /// or the first handler failure.
    pub fn run(&mut self) -> Result<(), ServiceError> {
        self.handler.on_open(&mut self.link)?;
        loop {
            if let Err(failure) = self.step() {
                if let ServiceError::Connection(ConnectionError::Closed { code, reason }) =
                    &failure
                {
                    self.handler.on_closed(*code, reason.as_deref());
                }
                return Err(failure);
            }
        }
    }

    fn step(&mut self) -> Result<(), ServiceError> {
        let message = self.link.recv()?;
        debug!(target: SERVICE_TARGET, "dispatching raw frame");
        let reply = self
            .handler
            .on_message(&mut self.link, &message)
            .map_err(ServiceError::Handler)?;
        if let Some(reply) = reply {
            self.link.send_value(&reply)?;
        }
        Ok(())
    }
}
