#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `chia-rpc-http`: Per-Service HTTPS Transport
//!
//! Every Chia service also exposes its RPC commands directly over HTTPS:
//! a command is a `POST` to `https://host:rpc_port/<command>` whose body is
//! the message `data`. [`HttpRpcClient`] implements [`RpcClient`] on top of
//! that, so proxies work the same over either transport.
//!
//! Each HTTP exchange is its own request/response pair, so no correlator is
//! needed and there is no push channel: [`RpcClient::subscribe`] returns
//! `None`.
//!
//! ## Example
//! ```no_run
//! use chia_rpc_http::HttpRpcClient;
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//! use transport::{EndpointInfo, Message, RpcClient};
//!
//! # async fn demo() -> Result<(), transport::TransportError> {
//! let endpoint = EndpointInfo::new("https://localhost:8555").with_certificate(
//!     "/root/.chia/mainnet/config/ssl/full_node/private_full_node.crt",
//!     "/root/.chia/mainnet/config/ssl/full_node/private_full_node.key",
//! );
//! let client = HttpRpcClient::new(endpoint)?;
//!
//! let request = Message::new("get_blockchain_state", json!({}), "chia_full_node", "demo");
//! let response = client.post_message(request, &CancellationToken::new()).await?;
//! println!("{:#?}", response.into_data()?);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use transport::{EndpointInfo, Message, Result, RpcClient, TransportError};

/// A [`RpcClient`] speaking to a single service over HTTPS.
///
/// The service's certificate is signed by the node's private CA, so server
/// certificates are not validated; the client authenticates itself with
/// the endpoint's certificate and key.
#[derive(Clone, Debug)]
pub struct HttpRpcClient {
    client: reqwest::Client,
    endpoint: EndpointInfo,
    timeout: Option<Duration>,
}

impl HttpRpcClient {
    /// Builds the client, loading the endpoint's client certificate if set.
    ///
    /// # Errors
    /// Returns [`TransportError::Tls`] if the certificate or key cannot be
    /// read or parsed.
    pub fn new(endpoint: EndpointInfo) -> Result<Self> {
        logging::trace("HTTP", &format!("→ initializing HTTP transport for {}", endpoint.uri));
        let mut builder =
            reqwest::Client::builder().use_rustls_tls().danger_accept_invalid_certs(true);

        if let Some((cert, key)) = endpoint.client_certificate() {
            let read = |path: &std::path::Path| {
                std::fs::read(path)
                    .map_err(|e| TransportError::Tls(format!("{}: {}", path.display(), e)))
            };
            let mut pem = read(cert)?;
            pem.push(b'\n');
            pem.extend(read(key)?);
            let identity =
                reqwest::Identity::from_pem(&pem).map_err(|e| TransportError::Tls(e.to_string()))?;
            builder = builder.identity(identity);
        }

        let client = builder.build().map_err(|e| TransportError::Tls(e.to_string()))?;
        Ok(Self { client, endpoint, timeout: None })
    }

    /// Applies a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, command: &str) -> String {
        format!("{}/{}", self.endpoint.uri.trim_end_matches('/'), command)
    }

    async fn exchange(&self, message: &Message) -> Result<Value> {
        let url = self.url(&message.command);
        logging::trace("HTTP", &format!("→ POST {}", url));

        let mut request = self.client.post(&url).json(&message.data);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await.map_err(|e| self.request_error(e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            tracing::error!("HTTP Transport - Failed to read body: {}", e);
            self.request_error(e)
        })?;

        // the node reports command failures as `success: false`, even on error statuses
        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(%status, "HTTP Transport - Non-JSON reply to {}", message.command);
            TransportError::Serialization(format!("{} (status: {}, body: {})", e, status, text))
        })
    }

    fn request_error(&self, e: reqwest::Error) -> TransportError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => TransportError::Timeout(timeout),
            _ => {
                tracing::error!("HTTP Transport - Request failed: {}", e);
                TransportError::Http(e.to_string())
            }
        }
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn send_message(&self, message: Message) -> Result<()> {
        self.exchange(&message).await.map(|_| ())
    }

    /// Posts `message.data` to `<uri>/<command>` and wraps the JSON reply as
    /// the response to `message`.
    async fn post_message(&self, message: Message, cancel: &CancellationToken) -> Result<Message> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            data = self.exchange(&message) => Ok(Message::response_to(&message, data?)),
        }
    }

    fn endpoint(&self) -> &EndpointInfo { &self.endpoint }

    async fn close(&self) {}
}
