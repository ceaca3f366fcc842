//! WebSocket transport for Selenol services.
//!
//! Implements the `selenol-protocol` [`selenol_protocol::Connection`]
//! boundary over a blocking WebSocket: [`HubEndpoint`] parses the hub's
//! `ws://` address and [`WsConnection`] carries JSON values as text frames,
//! retrying the initial connect until the hub is up.

mod connection;
mod endpoint;

pub use connection::WsConnection;
pub use endpoint::{EndpointParseError, HubEndpoint};
