//! The request path shared by every proxy.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use transport::{DynRpcClient, Message, TransportError};

use crate::{FromServiceProxy, ProxyError, Result};

/// Time allowed for a response before a request fails with
/// [`TransportError::Timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends commands to one service over a shared client.
///
/// Cloning is cheap; clones share the client and the cancellation token, so
/// [`ServiceProxy::cancel_all`] on any clone aborts requests from all of them.
#[derive(Clone)]
pub struct ServiceProxy {
    client: DynRpcClient,
    destination: String,
    origin: String,
    timeout: Duration,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ServiceProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProxy")
            .field("uri", &self.client.endpoint().uri)
            .field("destination", &self.destination)
            .field("origin", &self.origin)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServiceProxy {
    /// A proxy sending to `destination` as `origin`.
    pub fn new(
        client: DynRpcClient,
        destination: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            client,
            destination: destination.into(),
            origin: origin.into(),
            timeout: DEFAULT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same client, origin, timeout and cancellation, different destination.
    pub fn for_service(&self, destination: impl Into<String>) -> Self {
        Self { destination: destination.into(), ..self.clone() }
    }

    /// Builds a typed proxy routed to `P`'s service over this proxy's client.
    pub fn create_proxy<P: FromServiceProxy>(&self) -> P {
        P::from_service_proxy(self.for_service(P::SERVICE_NAME))
    }

    /// The shared transport.
    pub fn client(&self) -> &DynRpcClient { &self.client }

    /// Service messages are addressed to.
    pub fn destination(&self) -> &str { &self.destination }

    /// Name this proxy sends as.
    pub fn origin(&self) -> &str { &self.origin }

    /// Current request timeout.
    pub fn timeout(&self) -> Duration { self.timeout }

    /// Sends `command` and returns the response `data` once the service
    /// reports success.
    ///
    /// # Errors
    /// - [`TransportError::Timeout`] when no response arrives in time
    /// - [`TransportError::Cancelled`] after [`ServiceProxy::cancel_all`]
    /// - [`TransportError::Rpc`] when the service answers `success: false`
    pub async fn send(&self, command: &str, data: Value) -> Result<Value> {
        let message = Message::new(command, data, &self.destination, &self.origin);
        let token = self.cancel.child_token();
        tracing::debug!(command, destination = %self.destination, "sending");

        let response =
            match tokio::time::timeout(self.timeout, self.client.post_message(message, &token))
                .await
            {
                Ok(response) => response?,
                Err(_) => {
                    tracing::warn!(command, timeout = ?self.timeout, "request timed out");
                    return Err(TransportError::Timeout(self.timeout).into());
                }
            };
        Ok(response.into_data()?)
    }

    /// Sends `command` and decodes the whole response `data` as `T`.
    pub async fn send_as<T: DeserializeOwned>(&self, command: &str, data: Value) -> Result<T> {
        let value = self.send(command, data).await?;
        serde_json::from_value(value).map_err(|source| ProxyError::Decode {
            command: command.to_string(),
            field: "data".to_string(),
            source,
        })
    }

    /// Sends `command` and decodes the response field `field` as `T`.
    ///
    /// # Errors
    /// - [`ProxyError::MissingField`] when the response has no such field
    /// - [`ProxyError::Decode`] when the field does not match `T`
    pub async fn send_for<T: DeserializeOwned>(
        &self,
        command: &str,
        data: Value,
        field: &str,
    ) -> Result<T> {
        let mut value = self.send(command, data).await?;
        let field_value = value.get_mut(field).map(Value::take).ok_or_else(|| {
            ProxyError::MissingField { command: command.to_string(), field: field.to_string() }
        })?;
        serde_json::from_value(field_value).map_err(|source| ProxyError::Decode {
            command: command.to_string(),
            field: field.to_string(),
            source,
        })
    }

    /// Sends a command that only reports success.
    pub async fn send_ok(&self, command: &str, data: Value) -> Result<()> {
        self.send(command, data).await.map(|_| ())
    }

    /// Sends without waiting for a response.
    pub async fn notify(&self, command: &str, data: Value) -> Result<()> {
        let message = Message::new(command, data, &self.destination, &self.origin);
        Ok(self.client.send_message(message).await?)
    }

    /// `state_changed` notifications pushed by this proxy's service.
    ///
    /// `None` when the transport has no push channel (plain HTTPS).
    pub fn state_changes(&self) -> Option<StateChanges> {
        self.client
            .subscribe()
            .map(|rx| StateChanges { rx, service: self.destination.clone() })
    }

    /// Aborts every outstanding request of this proxy and its clones.
    ///
    /// Requests issued afterwards fail with [`TransportError::Cancelled`]
    /// immediately.
    pub fn cancel_all(&self) { self.cancel.cancel(); }
}

/// Stream of `state_changed` messages from one service.
#[derive(Debug)]
pub struct StateChanges {
    rx: broadcast::Receiver<Message>,
    service: String,
}

impl StateChanges {
    /// The next notification, or `None` once the connection is gone.
    ///
    /// Notifications dropped because the reader fell behind are skipped.
    pub async fn next(&mut self) -> Option<Message> {
        loop {
            match self.rx.recv().await {
                Ok(message) if self.matches(&message) => return Some(message),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, service = %self.service, "state changes dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn matches(&self, message: &Message) -> bool {
        message.command == "state_changed" && message.origin == self.service
    }
}
