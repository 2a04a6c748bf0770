#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Commands behind the `chia-rpc` binary.

use std::path::Path;
use std::sync::Arc;

use config::{Config, ConfigError};
use http::HttpRpcClient;
use proxies::{DaemonProxy, ProxyError, ServiceProxy};
use serde_json::Value;
use thiserror::Error;
use transport::{DynRpcClient, Message, RpcClient, TransportError};
use types::{service_names, AddressError, Bytes32, Bytes32Error};
use websocket::WebSocketRpcClient;

/// Origin used when the caller does not pick one.
pub const DEFAULT_ORIGIN: &str = "chia_rpc_cli";

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading the node configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The service rejected or mangled a command.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    /// Code generation failed.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Address encoding or decoding failed.
    #[error(transparent)]
    Address(#[from] AddressError),
    /// A puzzle hash did not parse.
    #[error(transparent)]
    PuzzleHash(#[from] Bytes32Error),
    /// Command data or a reply is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Logging could not be set up.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// The arguments do not make sense together.
    #[error("{0}")]
    Usage(String),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Maps a service given on the command line to its daemon service name.
///
/// Both `full_node` and `chia_full_node` are accepted.
pub fn service_name(name: &str) -> Result<&'static str> {
    let short = name.strip_prefix("chia_").unwrap_or(name);
    let service = match short {
        "daemon" => service_names::DAEMON,
        "full_node" => service_names::FULL_NODE,
        "wallet" => service_names::WALLET,
        "farmer" => service_names::FARMER,
        "harvester" => service_names::HARVESTER,
        "crawler" => service_names::CRAWLER,
        "data_layer" => service_names::DATA_LAYER,
        "timelord" => service_names::TIMELORD,
        _ => return Err(CliError::Usage(format!("Unknown service '{}'", name))),
    };
    Ok(service)
}

/// Parses `--data`; absent data is an empty object and anything else must
/// be a JSON object.
pub fn parse_data(data: Option<&str>) -> Result<Value> {
    let Some(data) = data else { return Ok(Value::Object(Default::default())) };
    match serde_json::from_str(data)? {
        value @ Value::Object(_) => Ok(value),
        _ => Err(CliError::Usage("--data must be a JSON object".to_string())),
    }
}

/// Encodes a hex puzzle hash as an address.
pub fn encode_address(puzzle_hash: &str, prefix: &str) -> Result<String> {
    let puzzle_hash: Bytes32 = puzzle_hash.parse()?;
    Ok(types::encode_puzzle_hash(&puzzle_hash, prefix)?)
}

/// Decodes an address into its prefix and `0x` puzzle hash.
pub fn decode_address(address: &str) -> Result<(String, String)> {
    let (prefix, puzzle_hash) = types::decode_puzzle_hash(address)?;
    Ok((prefix, puzzle_hash.to_string()))
}

/// Generates proxy methods from the OpenAPI document at `input`.
///
/// Writes to `output` when given and returns `None`; otherwise returns the
/// source.
pub fn generate(input: &Path, proxy: &str, output: Option<&Path>) -> Result<Option<String>> {
    let source = std::fs::read_to_string(input)?;
    let generated = codegen::generate(&source, proxy)?;
    match output {
        Some(path) => {
            codegen::write_generated(path, &generated)?;
            tracing::info!(path = %path.display(), "wrote generated methods");
            Ok(None)
        }
        None => Ok(Some(generated)),
    }
}

/// Sends one command and returns the reply data.
///
/// By default the command goes through the daemon's WebSocket; with `http`
/// it is posted straight to the service's own RPC server.
pub async fn call(
    config: &Config,
    service: &str,
    command: &str,
    data: Value,
    http: bool,
) -> Result<Value> {
    let destination = service_name(service)?;

    if http {
        if destination == service_names::DAEMON {
            return Err(CliError::Usage("The daemon is only reachable over WebSocket".to_string()));
        }
        let client: DynRpcClient = Arc::new(HttpRpcClient::new(config.endpoint(destination)?)?);
        let proxy = ServiceProxy::new(client, destination, DEFAULT_ORIGIN);
        return Ok(proxy.send(command, data).await?);
    }

    let client = Arc::new(WebSocketRpcClient::new(config.endpoint(service_names::DAEMON)?));
    client.connect().await?;
    let proxy = ServiceProxy::new(client.clone(), destination, DEFAULT_ORIGIN);
    let result = proxy.send(command, data).await;
    client.close().await;
    Ok(result?)
}

/// Registers `origin` with the daemon and hands every message it pushes
/// to `on_message` until `stop` completes or the connection drops.
pub async fn watch<F, S>(config: &Config, origin: &str, mut on_message: F, stop: S) -> Result<()>
where
    F: FnMut(&Message),
    S: std::future::Future<Output = ()>,
{
    let client = Arc::new(WebSocketRpcClient::new(config.endpoint(service_names::DAEMON)?));
    client.connect().await?;
    let mut events = client.subscribe().ok_or(TransportError::NotConnected)?;

    let daemon = DaemonProxy::new(client.clone(), origin);
    daemon.register_service(origin).await?;
    tracing::info!(origin, "watching daemon broadcasts");

    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => break,
            received = events.recv() => match received {
                Ok(message) => on_message(&message),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "broadcasts dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
        if !client.is_connected() {
            tracing::warn!("daemon connection closed");
            break;
        }
    }

    client.close().await;
    Ok(())
}

/// Loads the configuration under `root`, or the default root.
pub fn load_config(root: Option<&Path>) -> Result<Config> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => Config::default_root()?,
    };
    Ok(Config::open(root)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("full_node").expect("known"), "chia_full_node");
        assert_eq!(service_name("chia_wallet").expect("known"), "chia_wallet");
        assert_eq!(service_name("daemon").expect("known"), "daemon");
        assert!(matches!(service_name("miner"), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_parse_data() {
        assert_eq!(parse_data(None).expect("empty"), serde_json::json!({}));
        assert_eq!(
            parse_data(Some(r#"{"height": 10}"#)).expect("object"),
            serde_json::json!({"height": 10})
        );
        assert!(matches!(parse_data(Some("[1]")), Err(CliError::Usage(_))));
        assert!(matches!(parse_data(Some("{")), Err(CliError::Json(_))));
    }

    #[test]
    fn test_address_round_trip() {
        let hash = "0x000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
        let address = encode_address(hash, "txch").expect("encode");
        assert!(address.starts_with("txch1"));
        let (prefix, decoded) = decode_address(&address).expect("decode");
        assert_eq!(prefix, "txch");
        assert_eq!(decoded, hash);
    }

    #[tokio::test]
    async fn test_call_over_http_rejects_daemon() {
        let config = Config::from_yaml("self_hostname: localhost\n", "/tmp").expect("config");
        let result = call(&config, "daemon", "ping", serde_json::json!({}), true).await;
        assert!(matches!(result, Err(CliError::Usage(_))));
    }
}
