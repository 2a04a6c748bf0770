//! The daemon: service lifecycle, keyring and message routing.

use serde_json::json;
use transport::DynRpcClient;
use types::{service_names, KeyData, KeyringStatus, NodeVersion};

use crate::{FromServiceProxy, ProxyError, Result, Service, ServiceProxy};

/// Proxy for the daemon itself.
///
/// Besides its own commands, the daemon relays messages addressed to the
/// services it runs. [`DaemonProxy::create_proxy`] hands out typed proxies
/// that share the daemon's connection.
#[derive(Debug, Clone)]
pub struct DaemonProxy {
    proxy: ServiceProxy,
}

impl Service for DaemonProxy {
    fn proxy(&self) -> &ServiceProxy { &self.proxy }
}

impl FromServiceProxy for DaemonProxy {
    const SERVICE_NAME: &'static str = service_names::DAEMON;

    fn from_service_proxy(proxy: ServiceProxy) -> Self { Self { proxy } }
}

impl DaemonProxy {
    /// Creates a daemon proxy sending as `origin` over `client`.
    pub fn new(client: DynRpcClient, origin: impl Into<String>) -> Self {
        Self { proxy: ServiceProxy::new(client, service_names::DAEMON, origin) }
    }

    /// A proxy for another service, routed through this connection.
    pub fn create_proxy<P: FromServiceProxy>(&self) -> P { self.proxy.create_proxy() }

    /// Subscribes `service` to the daemon's broadcasts.
    ///
    /// Clients usually register their own origin, or
    /// [`service_names::WALLET_UI`] to receive wallet and full node
    /// `state_changed` notifications.
    pub async fn register_service(&self, service: &str) -> Result<()> {
        self.proxy.send_ok("register_service", json!({ "service": service })).await
    }

    /// Round trip check; returns the daemon's reply, normally `pong`.
    pub async fn ping(&self) -> Result<String> {
        self.proxy.send_for("ping", json!({}), "value").await
    }

    /// Whether the daemon is running `service`.
    pub async fn is_running(&self, service: &str) -> Result<bool> {
        self.proxy.send_for("is_running", json!({ "service": service }), "is_running").await
    }

    /// Starts `service`.
    pub async fn start_service(&self, service: &str) -> Result<()> {
        self.proxy.send_ok("start_service", json!({ "service": service, "testing": false })).await
    }

    /// Stops `service`.
    pub async fn stop_service(&self, service: &str) -> Result<()> {
        self.proxy.send_ok("stop_service", json!({ "service": service })).await
    }

    /// Names of the services the daemon is running.
    pub async fn running_services(&self) -> Result<Vec<String>> {
        self.proxy.send_for("running_services", json!({}), "running_services").await
    }

    /// The node software version.
    pub async fn get_version(&self) -> Result<NodeVersion> {
        let version: String = self.proxy.send_for("get_version", json!({}), "version").await?;
        NodeVersion::from_string(&version).map_err(|e| ProxyError::decode("get_version", "version", e))
    }

    /// State of the keyring.
    pub async fn keyring_status(&self) -> Result<KeyringStatus> {
        self.proxy.send_as("keyring_status", json!({})).await
    }

    /// Whether keys are locked behind a passphrase.
    pub async fn is_keyring_locked(&self) -> Result<bool> {
        self.proxy.send_for("is_keyring_locked", json!({}), "is_keyring_locked").await
    }

    /// Unlocks the keyring.
    pub async fn unlock_keyring(&self, passphrase: &str) -> Result<()> {
        if passphrase.is_empty() {
            return Err(ProxyError::InvalidArgument("passphrase must not be empty".to_string()));
        }
        self.proxy.send_ok("unlock_keyring", json!({ "key": passphrase })).await
    }

    /// Keys in the keychain, with secrets only when `include_secrets` is set.
    pub async fn get_keys(&self, include_secrets: bool) -> Result<Vec<KeyData>> {
        self.proxy.send_for("get_keys", json!({ "include_secrets": include_secrets }), "keys").await
    }

    /// Asks the daemon to stop all services and exit.
    pub async fn exit(&self) -> Result<()> { self.proxy.send_ok("exit", json!({})).await }
}
