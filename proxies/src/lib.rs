#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Typed service proxies
//!
//! Each Chia service (full node, wallet, farmer, harvester, crawler, data
//! layer and the daemon itself) gets a proxy whose methods map one RPC
//! command each: build the `data` payload, send it through a
//! [`ServiceProxy`], unwrap the named field of the response into a typed
//! record from the `types` crate.
//!
//! Proxies are transport agnostic. Over the daemon's WebSocket every proxy
//! shares one connection and messages are routed by destination; over
//! HTTPS each proxy gets its own [`transport::RpcClient`] pointed at the
//! service's port.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use transport::TransportError;
use types::{Bytes32, Connection, NodeType};

/// Declares a proxy struct wrapping a [`ServiceProxy`] addressed to `$service`.
macro_rules! define_service_proxy {
    ($(#[$meta:meta])* $name:ident, $service:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            proxy: $crate::ServiceProxy,
        }

        impl $name {
            /// Creates a proxy sending as `origin` over `client`.
            pub fn new(client: transport::DynRpcClient, origin: impl Into<String>) -> Self {
                Self { proxy: $crate::ServiceProxy::new(client, $service, origin) }
            }
        }

        impl $crate::FromServiceProxy for $name {
            const SERVICE_NAME: &'static str = $service;

            fn from_service_proxy(proxy: $crate::ServiceProxy) -> Self { Self { proxy } }
        }

        impl $crate::Service for $name {
            fn proxy(&self) -> &$crate::ServiceProxy { &self.proxy }
        }
    };
}
pub(crate) use define_service_proxy;

pub mod crawler;
pub mod daemon;
pub mod data_layer;
pub mod farmer;
pub mod full_node;
pub mod harvester;
pub mod service_proxy;
pub mod wallet;

pub use crawler::CrawlerProxy;
pub use daemon::DaemonProxy;
pub use data_layer::{Change, DataLayerProxy};
pub use farmer::FarmerProxy;
pub use full_node::FullNodeProxy;
pub use harvester::HarvesterProxy;
pub use service_proxy::{ServiceProxy, StateChanges, DEFAULT_TIMEOUT};
pub use wallet::{CatWallet, Wallet, WalletProxy};

/// Errors returned by proxy methods
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The transport failed or the service answered `success: false`
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response lacked the field the command is expected to return
    #[error("response to {command} has no '{field}' field")]
    MissingField {
        /// Command sent
        command: String,
        /// Field expected in the response
        field: String,
    },
    /// The field was present but did not match the expected record
    #[error("failed to decode '{field}' of {command}: {source}")]
    Decode {
        /// Command sent
        command: String,
        /// Field being decoded
        field: String,
        /// Underlying decode error
        source: serde_json::Error,
    },
    /// A caller-supplied argument was rejected before sending
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProxyError {
    pub(crate) fn decode(command: &str, field: &str, reason: impl std::fmt::Display) -> Self {
        ProxyError::Decode {
            command: command.to_string(),
            field: field.to_string(),
            source: <serde_json::Error as serde::de::Error>::custom(reason),
        }
    }

    /// `true` when the service itself rejected the command.
    pub fn is_rpc_error(&self) -> bool { matches!(self, ProxyError::Transport(TransportError::Rpc(_))) }
}

/// Result alias for proxy methods
pub type Result<T> = std::result::Result<T, ProxyError>;

/// A proxy that can be built from a [`ServiceProxy`] routed to its service.
///
/// Used by [`DaemonProxy::create_proxy`] to hand out proxies sharing the
/// daemon connection.
pub trait FromServiceProxy: Sized {
    /// Destination name of the service, e.g. `chia_full_node`
    const SERVICE_NAME: &'static str;

    /// Wraps a proxy already addressed to [`Self::SERVICE_NAME`].
    fn from_service_proxy(proxy: ServiceProxy) -> Self;
}

/// Commands every service answers.
#[async_trait]
pub trait Service: Send + Sync {
    /// The underlying proxy.
    fn proxy(&self) -> &ServiceProxy;

    /// Peers connected to the service, optionally limited to one node type.
    async fn get_connections(&self, node_type: Option<NodeType>) -> Result<Vec<Connection>> {
        let data = match node_type {
            Some(node_type) => json!({ "node_type": u8::from(node_type) }),
            None => json!({}),
        };
        self.proxy().send_for("get_connections", data, "connections").await
    }

    /// Asks the service to connect to a peer.
    async fn open_connection(&self, host: &str, port: u16) -> Result<()> {
        self.proxy().send_ok("open_connection", json!({ "host": host, "port": port })).await
    }

    /// Drops the connection to a peer.
    async fn close_connection(&self, node_id: &Bytes32) -> Result<()> {
        self.proxy().send_ok("close_connection", json!({ "node_id": node_id })).await
    }

    /// Stops the service process.
    async fn stop_node(&self) -> Result<()> { self.proxy().send_ok("stop_node", json!({})).await }

    /// Commands the service understands.
    async fn get_routes(&self) -> Result<Vec<String>> {
        self.proxy().send_for("get_routes", json!({}), "routes").await
    }

    /// `true` if the service reports healthy, `false` if it answers with a failure.
    async fn healthz(&self) -> Result<bool> {
        match self.proxy().send("healthz", json!({})).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_rpc_error() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
