#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `chia-rpc-websocket`: Daemon WebSocket Transport
//!
//! [`WebSocketRpcClient`] keeps one WebSocket connection to the Chia daemon
//! and multiplexes every request over it. Requests are matched to responses
//! by request id through a [`Correlator`]; messages nobody asked for (state
//! change notifications, mostly) are published on a broadcast channel.
//! Each connection has its own channel and the receive loop owns its only
//! sender, so subscribers see `Closed` once the connection is gone and must
//! subscribe again after a reconnect.
//!
//! The daemon listens on `wss://` and requires the client certificate from
//! `config/ssl/daemon`. Plain `ws://` endpoints are supported for local
//! tooling and tests.
//!
//! ## Example
//! ```no_run
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//! use transport::{EndpointInfo, Message, RpcClient};
//! use websocket::WebSocketRpcClient;
//!
//! # async fn demo() -> Result<(), transport::TransportError> {
//! let endpoint = EndpointInfo::new("wss://localhost:55400").with_certificate(
//!     "/root/.chia/mainnet/config/ssl/daemon/private_daemon.crt",
//!     "/root/.chia/mainnet/config/ssl/daemon/private_daemon.key",
//! );
//! let client = WebSocketRpcClient::new(endpoint);
//! client.connect().await?;
//!
//! let ping = Message::new("ping", json!({}), "daemon", "demo");
//! let pong = client.post_message(ping, &CancellationToken::new()).await?;
//! assert!(pong.is_successful_response());
//! client.close().await;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use transport::{
    Correlator, Dispatch, EndpointInfo, Message, Result, RpcClient, TransportError,
};

mod tls;

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Writer = Arc<tokio::sync::Mutex<SplitSink<Stream, Frame>>>;

/// Capacity of the unsolicited message channel; slow subscribers lag.
pub const BROADCAST_CAPACITY: usize = 256;

struct Connection {
    writer: Writer,
    correlator: Arc<Correlator>,
    events: broadcast::WeakSender<Message>,
    shutdown: CancellationToken,
    reader: JoinHandle<()>,
}

/// WebSocket client for the Chia daemon.
pub struct WebSocketRpcClient {
    endpoint: EndpointInfo,
    connection: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for WebSocketRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketRpcClient")
            .field("uri", &self.endpoint.uri)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl WebSocketRpcClient {
    /// Creates a disconnected client; call [`WebSocketRpcClient::connect`] before use.
    pub fn new(endpoint: EndpointInfo) -> Self {
        Self { endpoint, connection: Mutex::new(None) }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.connection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens the connection and starts the receive loop.
    ///
    /// Connecting an already connected client is a no-op. A client whose
    /// connection dropped can be connected again; it gets a fresh
    /// correlator.
    ///
    /// # Errors
    /// - [`TransportError::Tls`] if the client certificate cannot be loaded
    /// - [`TransportError::WebSocket`] if the handshake fails
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let uri = self.endpoint.uri.as_str();
        let connector = if uri.starts_with("wss://") {
            Some(Connector::Rustls(tls::client_config(&self.endpoint)?))
        } else {
            None
        };

        logging::trace("WS", &format!("→ connecting to {}", uri));
        let (stream, _response) =
            tokio_tungstenite::connect_async_tls_with_config(uri, None, false, connector)
                .await
                .map_err(|e| {
                    tracing::error!(uri, "WebSocket handshake failed: {}", e);
                    TransportError::WebSocket(e.to_string())
                })?;
        tracing::info!(uri, "connected");

        let (sink, source) = stream.split();
        let correlator = Arc::new(Correlator::new());
        let shutdown = CancellationToken::new();
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        let weak_events = events.downgrade();
        let reader =
            tokio::spawn(receive_loop(source, Arc::clone(&correlator), events, shutdown.clone()));

        let connection = Connection {
            writer: Arc::new(tokio::sync::Mutex::new(sink)),
            correlator,
            events: weak_events,
            shutdown,
            reader,
        };
        let previous = self.lock().replace(connection);
        if let Some(stale) = previous {
            stale.shutdown.cancel();
            stale.correlator.close();
        }
        Ok(())
    }

    /// `true` while the receive loop is running.
    pub fn is_connected(&self) -> bool {
        self.lock().as_ref().is_some_and(|c| !c.correlator.is_closed())
    }

    /// Number of requests waiting for a response on the current connection.
    pub fn pending_requests(&self) -> usize {
        self.lock().as_ref().map_or(0, |c| c.correlator.pending_count())
    }

    fn current(&self) -> Result<(Writer, Arc<Correlator>)> {
        match self.lock().as_ref() {
            Some(c) if !c.correlator.is_closed() =>
                Ok((Arc::clone(&c.writer), Arc::clone(&c.correlator))),
            _ => Err(TransportError::NotConnected),
        }
    }
}

async fn write(writer: &Writer, message: &Message) -> Result<()> {
    let text = message.to_json()?;
    writer.lock().await.send(Frame::Text(text.into())).await.map_err(|e| {
        tracing::error!(command = %message.command, "WebSocket write failed: {}", e);
        TransportError::WebSocket(e.to_string())
    })
}

fn handle_text(text: &str, correlator: &Correlator, events: &broadcast::Sender<Message>) {
    let message = match Message::from_json(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("skipping malformed frame: {}", e);
            return;
        }
    };
    if let Dispatch::Unsolicited(message) = correlator.dispatch(message) {
        tracing::trace!(command = %message.command, origin = %message.origin, "broadcast");
        // no subscribers is not an error
        let _ = events.send(message);
    }
}

async fn receive_loop(
    mut source: SplitStream<Stream>,
    correlator: Arc<Correlator>,
    events: broadcast::Sender<Message>,
    shutdown: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = source.next() => frame,
        };
        match frame {
            Some(Ok(Frame::Text(text))) => handle_text(text.as_str(), &correlator, &events),
            Some(Ok(Frame::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                Ok(text) => handle_text(text, &correlator, &events),
                Err(e) => tracing::warn!("skipping non-UTF-8 frame: {}", e),
            },
            Some(Ok(Frame::Close(reason))) => {
                tracing::info!(?reason, "server closed the connection");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::warn!("WebSocket read failed: {}", e);
                break;
            }
            None => break,
        }
    }
    correlator.close();
    logging::trace("WS", "receive loop stopped");
}

#[async_trait]
impl RpcClient for WebSocketRpcClient {
    async fn send_message(&self, message: Message) -> Result<()> {
        let (writer, _) = self.current()?;
        write(&writer, &message).await
    }

    async fn post_message(&self, message: Message, cancel: &CancellationToken) -> Result<Message> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let (writer, correlator) = self.current()?;
        logging::trace(
            "WS",
            &format!("→ {} to {} ({})", message.command, message.destination, message.request_id),
        );
        // registered before the write so a fast answer cannot be missed
        let pending = correlator.register(&message.request_id)?;
        write(&writer, &message).await?;
        pending.wait(cancel).await
    }

    fn endpoint(&self) -> &EndpointInfo { &self.endpoint }

    /// Subscribes to the current connection's unsolicited messages.
    ///
    /// Without a live connection the receiver is already closed.
    fn subscribe(&self) -> Option<broadcast::Receiver<Message>> {
        let live = self.lock().as_ref().and_then(|c| c.events.upgrade());
        match live {
            Some(events) => Some(events.subscribe()),
            None => Some(broadcast::channel(1).1),
        }
    }

    async fn close(&self) {
        let taken = self.lock().take();
        let Some(connection) = taken else { return };
        connection.shutdown.cancel();
        connection.correlator.close();
        if let Err(e) = connection.writer.lock().await.close().await {
            tracing::debug!("close frame not delivered: {}", e);
        }
        if let Err(e) = connection.reader.await {
            tracing::warn!("receive loop ended abnormally: {}", e);
        }
        tracing::info!(uri = %self.endpoint.uri, "disconnected");
    }
}
