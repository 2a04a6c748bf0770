// SPDX-License-Identifier: MIT

//! chia-rpc umbrella crate.
//!
//! Re-exports the workspace members so applications can depend on a single
//! crate. The building blocks live in their own crates:
//!
//! - [`transport`]: message envelope, `RpcClient` trait and the request/response correlator
//! - [`websocket`]: the daemon WebSocket transport
//! - [`http`]: the per-service HTTPS transport
//! - [`proxies`]: typed service proxies
//! - [`types`]: typed records, address codec and units
//! - [`config`]: `config.yaml` loading and endpoint resolution
//! - [`logging`]: subscriber setup for binaries
//! - [`codegen`]: proxy method generation from OpenAPI documents
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chia_rpc::config::Config;
//! use chia_rpc::proxies::{DaemonProxy, FullNodeProxy};
//! use chia_rpc::websocket::WebSocketRpcClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::open(Config::default_root()?)?;
//! let client = Arc::new(WebSocketRpcClient::new(config.endpoint("daemon")?));
//! client.connect().await?;
//!
//! let daemon = DaemonProxy::new(client, "example");
//! let full_node: FullNodeProxy = daemon.create_proxy();
//! let state = full_node.get_blockchain_state().await?;
//! println!("synced = {}", state.sync.synced);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

pub use {codegen, config, http, logging, proxies, transport, types, websocket};

/// Miscellaneous metadata about the chia-rpc workspace.
pub mod chia_rpc_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
