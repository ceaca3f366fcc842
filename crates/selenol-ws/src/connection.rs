//! Blocking WebSocket transport to the hub.
//!
//! Messages are JSON text frames, one value per frame. Connecting retries
//! with a fixed backoff until the hub accepts or the deadline passes, so a
//! service process can come up before its hub does. Once established, the
//! connection maps every terminal transport state onto
//! [`ConnectionError::Closed`] so the run loop sees a single fatal signal.

use std::io;
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;
use tungstenite::error::{Error as WsError, ProtocolError};
use tungstenite::protocol::CloseFrame;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message as WsMessage, WebSocket};

use selenol_protocol::{Connection, ConnectionError};

use crate::endpoint::HubEndpoint;

/// Tracing target for transport operations.
const WS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::connection");

const CONNECT_RETRY_BACKOFF: Duration = Duration::from_millis(250);
const CONNECT_DEADLINE: Duration = Duration::from_secs(30);

/// Blocking WebSocket connection to a hub.
pub struct WsConnection {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WsConnection {
    /// Connects to the hub, retrying until it accepts.
    ///
    /// # Errors
    ///
    /// Returns the last mapped failure once the default deadline passes.
    pub fn connect(endpoint: &HubEndpoint) -> Result<Self, ConnectionError> {
        Self::connect_with_deadline(endpoint, CONNECT_DEADLINE)
    }

    /// Connects to the hub, retrying until it accepts or `deadline` passes.
    ///
    /// # Errors
    ///
    /// Returns the last mapped failure once the deadline passes.
    pub fn connect_with_deadline(
        endpoint: &HubEndpoint,
        deadline: Duration,
    ) -> Result<Self, ConnectionError> {
        let started = Instant::now();
        loop {
            match tungstenite::connect(endpoint.url().as_str()) {
                Ok((socket, _response)) => {
                    debug!(target: WS_TARGET, hub = %endpoint, "connected to hub");
                    return Ok(Self { socket });
                }
                Err(error) if started.elapsed() < deadline => {
                    debug!(
                        target: WS_TARGET,
                        hub = %endpoint,
                        error = %error,
                        "hub not accepting yet, retrying"
                    );
                    thread::sleep(CONNECT_RETRY_BACKOFF);
                }
                Err(error) => return Err(map_ws_error(error)),
            }
        }
    }
}

impl Connection for WsConnection {
    fn send(&mut self, message: &Value) -> Result<(), ConnectionError> {
        let text = serde_json::to_string(message)?;
        self.socket
            .send(WsMessage::text(text))
            .map_err(map_ws_error)
    }

    fn recv(&mut self) -> Result<Value, ConnectionError> {
        loop {
            match self.socket.read() {
                Ok(WsMessage::Text(text)) => {
                    return serde_json::from_str(text.as_str()).map_err(ConnectionError::from);
                }
                Ok(WsMessage::Close(frame)) => return Err(close_error(frame)),
                Ok(other) => {
                    debug!(
                        target: WS_TARGET,
                        kind = ?other,
                        "skipping non-text frame"
                    );
                }
                Err(error) => return Err(map_ws_error(error)),
            }
        }
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        match self.socket.close(None) {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(error) => Err(map_ws_error(error)),
        }
    }
}

fn map_ws_error(error: WsError) -> ConnectionError {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => ConnectionError::closed(),
        WsError::Protocol(
            ProtocolError::ResetWithoutClosingHandshake | ProtocolError::SendAfterClosing,
        ) => ConnectionError::closed(),
        WsError::Io(source) if is_disconnect(source.kind()) => ConnectionError::closed(),
        other => ConnectionError::transport(other.to_string()),
    }
}

const fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
    )
}

fn close_error(frame: Option<CloseFrame>) -> ConnectionError {
    frame.map_or_else(ConnectionError::closed, |frame| ConnectionError::Closed {
        code: Some(u16::from(frame.code)),
        reason: (!frame.reason.is_empty()).then(|| frame.reason.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use serde_json::json;

    use super::*;

    /// Accepts one connection and echoes text frames until closure.
    fn spawn_echo_server() -> (HubEndpoint, JoinHandle<()>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let endpoint = endpoint_for(&listener);
        let handle = thread::spawn(move || echo_loop(&listener));
        (endpoint, handle)
    }

    fn endpoint_for(listener: &TcpListener) -> HubEndpoint {
        let addr = listener.local_addr().expect("listener address");
        format!("ws://{addr}").parse().expect("endpoint parses")
    }

    fn echo_loop(listener: &TcpListener) {
        let (stream, _) = listener.accept().expect("accept connection");
        let mut socket = tungstenite::accept(stream).expect("websocket handshake");
        loop {
            match socket.read() {
                Ok(message @ WsMessage::Text(_)) => {
                    if socket.send(message).is_err() {
                        break;
                    }
                }
                Ok(WsMessage::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }

    #[test]
    fn echoes_a_json_document() {
        let (endpoint, server) = spawn_echo_server();
        let mut connection =
            WsConnection::connect_with_deadline(&endpoint, Duration::from_secs(5))
                .expect("connect");

        let document = json!({"doc": "test"});
        connection.send(&document).expect("send document");
        assert_eq!(connection.recv().expect("echo"), document);

        connection.close().expect("close");
        server.join().expect("server thread");
    }

    #[test]
    fn recv_on_a_closed_connection_reports_closed() {
        let (endpoint, server) = spawn_echo_server();
        let mut connection =
            WsConnection::connect_with_deadline(&endpoint, Duration::from_secs(5))
                .expect("connect");

        connection.close().expect("close");
        let error = connection.recv().expect_err("connection is closed");
        assert!(error.is_closed());
        server.join().expect("server thread");
    }

    #[test]
    fn send_on_a_closed_connection_reports_closed() {
        let (endpoint, server) = spawn_echo_server();
        let mut connection =
            WsConnection::connect_with_deadline(&endpoint, Duration::from_secs(5))
                .expect("connect");

        connection.close().expect("close");
        let error = connection
            .send(&json!({"doc": "test"}))
            .expect_err("connection is closed");
        assert!(error.is_closed());
        server.join().expect("server thread");
    }

    #[test]
    fn connects_while_the_hub_is_still_starting() {
        // Reserve a port, release it, and bring the server up only after a
        // delay; the client keeps retrying until the handshake succeeds.
        let reserved = TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
        let addr = reserved.local_addr().expect("reserved address");
        drop(reserved);

        let server = thread::spawn(move || {
            thread::sleep(Duration::from_millis(400));
            let listener = TcpListener::bind(addr).expect("late bind");
            echo_loop(&listener);
        });

        let endpoint: HubEndpoint = format!("ws://{addr}").parse().expect("endpoint parses");
        let mut connection =
            WsConnection::connect_with_deadline(&endpoint, Duration::from_secs(10))
                .expect("connect to late hub");

        let document = json!({"doc": "late"});
        connection.send(&document).expect("send document");
        assert_eq!(connection.recv().expect("echo"), document);

        connection.close().expect("close");
        server.join().expect("server thread");
    }

    #[test]
    fn gives_up_once_the_deadline_passes() {
        let reserved = TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
        let addr = reserved.local_addr().expect("reserved address");
        drop(reserved);

        let endpoint: HubEndpoint = format!("ws://{addr}").parse().expect("endpoint parses");
        let error = WsConnection::connect_with_deadline(&endpoint, Duration::from_millis(300));
        assert!(error.is_err(), "nothing ever listens on the reserved port");
    }
}
