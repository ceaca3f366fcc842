//! Service engine for Selenol hubs.
//!
//! The crate owns everything between the transport and the business logic:
//! declarative parameter extraction ([`ParamSpec`] and the extractor
//! factories), the reason-filtered dispatch loop ([`Service`]), the
//! unfiltered low-level variant ([`Client`]), and telemetry bootstrap.
//!
//! A service instance is one connection, one reason prefix, one handler.
//! The run loop is strictly sequential with a single in-flight request;
//! concurrency lives above this crate, as independent instances that share
//! no state. The loop ends only when the transport fails, and the
//! closed-connection signal is always fatal — there is no reconnect layer
//! here.

mod client;
mod context;
mod errors;
mod params;
mod service;
pub mod telemetry;
#[cfg(test)]
mod test_support;

pub use client::{Client, ClientHandler};
pub use context::{HubLink, ServiceContext};
pub use errors::{HandlerError, ServiceError};
pub use params::{
    Args, Extractor, ParamSpec, object_from_content, object_from_session, request_id, value_at,
    value_from_content, value_from_session,
};
pub use service::{ReasonPrefix, Service, ServiceHandler};
