#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Core record types for the Chia RPC surface
//!
//! This crate defines the typed records returned by the node's services,
//! plus the small pieces of domain logic clients need around them: the
//! `0x`-prefixed 32-byte hash type, the bech32m address codec, XCH/mojo
//! amount conversion and node version parsing.
//!
//! Records derive `serde` and ignore unknown fields, so a newer node adding
//! fields does not break older clients. Fields whose shape differs between
//! node versions are kept as [`serde_json::Value`].

/// bech32m puzzle-hash ⇄ address codec
pub mod address;
/// The `0x`-prefixed 32-byte hash type
pub mod bytes32;
/// Records shared by every service (connections, node types)
pub mod common;
/// Farmer, harvester and crawler records
pub mod farming;
/// Full node records (blocks, coins, mempool)
pub mod full_node;
/// XCH/mojo amount conversion
pub mod units;
/// Node version parsing
pub mod version;
/// Wallet records
pub mod wallet;

pub use address::{decode_puzzle_hash, encode_puzzle_hash, AddressError};
pub use bytes32::{Bytes32, Bytes32Error};
pub use common::*;
pub use farming::*;
pub use full_node::*;
pub use units::{format_xch, parse_xch, AmountError, MOJO_PER_XCH};
pub use version::{NodeVersion, VersionError};
pub use wallet::*;

/// Service names used as message destinations and as `register_service` origins.
pub mod service_names {
    /// The daemon itself
    pub const DAEMON: &str = "daemon";
    /// Full node
    pub const FULL_NODE: &str = "chia_full_node";
    /// Wallet
    pub const WALLET: &str = "chia_wallet";
    /// Farmer
    pub const FARMER: &str = "chia_farmer";
    /// Harvester
    pub const HARVESTER: &str = "chia_harvester";
    /// Crawler (seeder)
    pub const CRAWLER: &str = "chia_crawler";
    /// Data layer
    pub const DATA_LAYER: &str = "chia_data_layer";
    /// Timelord
    pub const TIMELORD: &str = "chia_timelord";
    /// Conventional origin for UI clients; the daemon forwards wallet and
    /// full node state changes to it
    pub const WALLET_UI: &str = "wallet_ui";
}
