#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `chia-rpc-transport`: Foundational Communication Layer
//!
//! This crate defines the **core transport abstraction** used throughout
//! chia-rpc.
//!
//! Every request sent to a Chia service, whether it travels over the
//! daemon's WebSocket or directly to a service's HTTPS port, is a
//! [`Message`] envelope. Backends such as `chia-rpc-websocket` and
//! `chia-rpc-http` implement [`RpcClient`] to perform the actual I/O work.
//!
//! ## Core Concepts
//!
//! ### `Message`
//! The daemon's JSON envelope: `command`, `ack`, `data`, `request_id`,
//! `destination` and `origin`. Responses echo the request id of the request
//! they answer.
//!
//! ### `RpcClient` Trait
//! Defines how messages are sent without waiting (`send_message`) and how a
//! request is paired with its response (`post_message`). Unsolicited
//! messages are exposed through `subscribe`.
//!
//! ### `Correlator`
//! The pending-request table shared by a connection's send path and its
//! receive loop. See [`correlator`].
//!
//! ### `TransportError`
//! Enumerates all possible classes of errors encountered during communication,
//! ensuring consistent reporting across backends.
//!
//! ## Example
//! ```no_run
//! use transport::{DynRpcClient, Message, TransportError};
//! use tokio_util::sync::CancellationToken;
//! use serde_json::json;
//!
//! async fn demo(client: DynRpcClient) -> Result<(), TransportError> {
//!     let request = Message::new("get_blockchain_state", json!({}), "chia_full_node", "demo");
//!     let response = client.post_message(request, &CancellationToken::new()).await?;
//!     println!("peak = {}", response.into_data()?["blockchain_state"]["peak"]["height"]);
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub mod correlator;
mod message;

pub use correlator::{Correlator, Dispatch, PendingResponse};
pub use message::{new_request_id, Message};

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Canonical error type for all transport implementations.
///
/// Each variant corresponds to a distinct communication or parsing
/// failure mode. Backend error types are flattened into strings so
/// that higher layers can reason uniformly about network, TLS and RPC
/// failures.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// An HTTP-level failure (connection refused, timeout, or bad status code).
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// A WebSocket protocol or socket failure.
    #[error("WebSocket transport error: {0}")]
    WebSocket(String),

    /// Loading the client certificate or configuring TLS failed.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// Failure to serialize or deserialize a JSON payload.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The remote service answered with `success: false`.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The response did not conform to the expected envelope format.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// A request with the same id is already waiting for its response.
    #[error("Duplicate request id: {0}")]
    DuplicateRequestId(String),

    /// The caller's cancellation token fired before the response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// No response arrived within the allotted time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection went away while the request was outstanding.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The client has not been connected, or has been closed.
    #[error("Not connected")]
    NotConnected,

    /// Any other error not covered by the specific variants above.
    #[error("Other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self { TransportError::Serialization(err.to_string()) }
}

/// Where a service listens and which client certificate to present.
///
/// Chia services only accept connections authenticated with the
/// certificates found under the node's `config/ssl` directory.
///
/// # Examples
///
/// ```
/// use transport::EndpointInfo;
///
/// let endpoint = EndpointInfo::new("wss://localhost:55400")
///     .with_certificate("/root/.chia/mainnet/config/ssl/daemon/private_daemon.crt",
///                       "/root/.chia/mainnet/config/ssl/daemon/private_daemon.key");
/// assert!(endpoint.client_certificate().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// Connection URI (`wss://host:port` for the daemon, `https://host:port` for services)
    pub uri: String,
    /// PEM certificate presented to the service
    pub cert_path: Option<PathBuf>,
    /// PEM private key matching `cert_path`
    pub key_path: Option<PathBuf>,
}

impl EndpointInfo {
    /// Endpoint without a client certificate.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), cert_path: None, key_path: None }
    }

    /// Attach a client certificate and key.
    pub fn with_certificate(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.cert_path = Some(cert.into());
        self.key_path = Some(key.into());
        self
    }

    /// The certificate/key pair, only when both are configured.
    pub fn client_certificate(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.cert_path.as_ref().zip(self.key_path.as_ref())
    }
}

/// A duplex channel to a Chia service.
///
/// Implementations must be safe to share between tasks: proxies hold the
/// client behind an [`Arc`] and issue requests concurrently.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Sends a message without waiting for, or registering interest in, a response.
    async fn send_message(&self, message: Message) -> Result<()>;

    /// Sends a message and waits for the response carrying the same request id.
    ///
    /// When `cancel` fires first the request is abandoned and
    /// [`TransportError::Cancelled`] is returned. The returned message is
    /// the raw response; callers decide how to interpret `data`.
    async fn post_message(&self, message: Message, cancel: &CancellationToken) -> Result<Message>;

    /// Returns the configured endpoint.
    fn endpoint(&self) -> &EndpointInfo;

    /// Subscribes to messages that did not answer any outstanding request.
    ///
    /// Transports without a push channel (plain HTTP) return `None`.
    fn subscribe(&self) -> Option<broadcast::Receiver<Message>> { None }

    /// Shuts the channel down. Outstanding requests fail with
    /// [`TransportError::ConnectionClosed`].
    async fn close(&self);
}

/// Type alias for a shared, dynamically dispatched client instance.
///
/// ```
/// use transport::{DynRpcClient, RpcClient};
///
/// fn describe(client: &DynRpcClient) -> String {
///     format!("talking to {}", client.endpoint().uri)
/// }
/// ```
pub type DynRpcClient = Arc<dyn RpcClient>;

/// Gets a random free port assigned by the OS.
///
/// This function binds to `127.0.0.1:0`, which causes the OS to assign
/// an available port. The listener is then dropped and the port number
/// is returned.
///
/// # Errors
///
/// Returns an error if binding to the address fails.
pub fn get_random_free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from() {
        let err = serde_json::from_str::<serde_json::Value>("not-json")
            .expect_err("Expected JSON parsing to fail");
        let terr: TransportError = err.into();

        match terr {
            TransportError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("expected Serialization error variant"),
        }
    }

    #[test]
    fn test_endpoint_certificate_requires_both_paths() {
        let plain = EndpointInfo::new("https://localhost:8555");
        assert!(plain.client_certificate().is_none());

        let half = EndpointInfo { key_path: None, ..plain.clone().with_certificate("a.crt", "a.key") };
        assert!(half.client_certificate().is_none());

        let full = plain.with_certificate("a.crt", "a.key");
        let (cert, key) = full.client_certificate().expect("both paths set");
        assert_eq!(cert, &PathBuf::from("a.crt"));
        assert_eq!(key, &PathBuf::from("a.key"));
    }

    #[test]
    fn test_get_random_free_port() {
        let port = get_random_free_port().expect("Should get a free port");

        assert!(port > 0);
    }
}
