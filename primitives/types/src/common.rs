use serde::{Deserialize, Serialize};

use crate::bytes32::Bytes32;

/// Kind of peer at the other end of a connection.
///
/// Serialized as the integer the node uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeType {
    /// Full node
    FullNode,
    /// Harvester
    Harvester,
    /// Farmer
    Farmer,
    /// Timelord
    Timelord,
    /// Introducer
    Introducer,
    /// Wallet
    Wallet,
    /// Data layer
    DataLayer,
}

impl TryFrom<u8> for NodeType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => NodeType::FullNode,
            2 => NodeType::Harvester,
            3 => NodeType::Farmer,
            4 => NodeType::Timelord,
            5 => NodeType::Introducer,
            6 => NodeType::Wallet,
            7 => NodeType::DataLayer,
            other => return Err(format!("unknown node type {}", other)),
        })
    }
}

impl From<NodeType> for u8 {
    fn from(value: NodeType) -> Self {
        match value {
            NodeType::FullNode => 1,
            NodeType::Harvester => 2,
            NodeType::Farmer => 3,
            NodeType::Timelord => 4,
            NodeType::Introducer => 5,
            NodeType::Wallet => 6,
            NodeType::DataLayer => 7,
        }
    }
}

/// A peer connection as reported by `get_connections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Peer node id
    pub node_id: Bytes32,
    /// Peer host
    pub peer_host: String,
    /// Peer port of this connection
    pub peer_port: u16,
    /// Port the peer's server listens on
    #[serde(default)]
    pub peer_server_port: u16,
    /// Local port of this connection
    #[serde(default)]
    pub local_port: u16,
    /// Peer kind
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Seconds since epoch
    #[serde(default)]
    pub creation_time: f64,
    /// Seconds since epoch
    #[serde(default)]
    pub last_message_time: f64,
    /// Bytes received
    #[serde(default)]
    pub bytes_read: Option<u64>,
    /// Bytes sent
    #[serde(default)]
    pub bytes_written: Option<u64>,
    /// Only present for full node peers
    #[serde(default)]
    pub peak_height: Option<u32>,
    /// Only present for full node peers
    #[serde(default)]
    pub peak_hash: Option<Bytes32>,
}

/// State of the OS keyring as reported by `keyring_status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyringStatus {
    /// Keys cannot be read until `unlock_keyring` is called
    pub is_keyring_locked: bool,
    /// The passphrase may be stored in the OS credential store
    pub can_save_passphrase: bool,
    /// A user passphrase (rather than the default) protects the keyring
    pub user_passphrase_is_set: bool,
    /// A passphrase hint may be stored
    pub can_set_passphrase_hint: bool,
    /// The stored hint, if any
    pub passphrase_hint: Option<String>,
    /// Length/complexity requirements, shape varies by node version
    pub passphrase_requirements: serde_json::Value,
}

/// A key known to the daemon's keychain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyData {
    /// Public key fingerprint
    pub fingerprint: u32,
    /// G1 public key, hex
    pub public_key: String,
    /// User-assigned label
    #[serde(default)]
    pub label: Option<String>,
    /// Only present when secrets were requested
    #[serde(default)]
    pub secrets: Option<serde_json::Value>,
}
