//! Data layer service: key/value stores anchored on chain.

use bitcoin::hex::DisplayHex;
use serde::Serialize;
use serde_json::json;
use types::{service_names, Bytes32, RootInfo};

use crate::{ProxyError, Result};

crate::define_service_proxy!(
    /// Proxy for the data layer service.
    DataLayerProxy,
    service_names::DATA_LAYER
);

/// One change of a [`DataLayerProxy::batch_update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Change {
    /// Adds `key` with `value`
    Insert {
        /// Key, hex
        key: String,
        /// Value, hex
        value: String,
    },
    /// Removes `key`
    Delete {
        /// Key, hex
        key: String,
    },
}

impl Change {
    /// Insert of raw bytes.
    pub fn insert(key: &[u8], value: &[u8]) -> Self {
        Change::Insert { key: key.to_lower_hex_string(), value: value.to_lower_hex_string() }
    }

    /// Delete of a raw key.
    pub fn delete(key: &[u8]) -> Self { Change::Delete { key: key.to_lower_hex_string() } }
}

impl DataLayerProxy {
    /// Creates a store, returning its id.
    pub async fn create_data_store(&self, fee: u64) -> Result<Bytes32> {
        self.proxy.send_for("create_data_store", json!({ "fee": fee }), "id").await
    }

    /// Stores owned by this wallet.
    pub async fn get_owned_stores(&self) -> Result<Vec<Bytes32>> {
        self.proxy.send_for("get_owned_stores", json!({}), "store_ids").await
    }

    /// Value of `key` (hex), at `root_hash` or the latest root.
    pub async fn get_value(
        &self,
        id: &Bytes32,
        key: &[u8],
        root_hash: Option<&Bytes32>,
    ) -> Result<Option<String>> {
        let mut data = json!({ "id": id, "key": key.to_lower_hex_string() });
        if let Some(root_hash) = root_hash {
            data["root_hash"] = json!(root_hash);
        }
        self.proxy.send_for("get_value", data, "value").await
    }

    /// Keys of a store (hex), at `root_hash` or the latest root.
    pub async fn get_keys(&self, id: &Bytes32, root_hash: Option<&Bytes32>) -> Result<Vec<String>> {
        let mut data = json!({ "id": id });
        if let Some(root_hash) = root_hash {
            data["root_hash"] = json!(root_hash);
        }
        self.proxy.send_for("get_keys", data, "keys").await
    }

    /// Latest root of a store.
    pub async fn get_root(&self, id: &Bytes32) -> Result<RootInfo> {
        let mut root: RootInfo = self.proxy.send_as("get_root", json!({ "id": id })).await?;
        root.id.get_or_insert(*id);
        Ok(root)
    }

    /// Applies `changes` in one transaction, returning its id.
    pub async fn batch_update(&self, id: &Bytes32, changes: &[Change], fee: u64) -> Result<Bytes32> {
        if changes.is_empty() {
            return Err(ProxyError::InvalidArgument("changelist must not be empty".to_string()));
        }
        let data = json!({ "id": id, "changelist": changes, "fee": fee });
        self.proxy.send_for("batch_update", data, "tx_id").await
    }

    /// Follows a store owned by someone else, mirrored from `urls`.
    pub async fn subscribe(&self, id: &Bytes32, urls: &[String]) -> Result<()> {
        self.proxy.send_ok("subscribe", json!({ "id": id, "urls": urls })).await
    }

    /// Stops following a store; `retain` keeps the downloaded data.
    pub async fn unsubscribe(&self, id: &Bytes32, retain: bool) -> Result<()> {
        self.proxy.send_ok("unsubscribe", json!({ "id": id, "retain": retain })).await
    }

    /// Stores being followed.
    pub async fn subscriptions(&self) -> Result<Vec<Bytes32>> {
        self.proxy.send_for("subscriptions", json!({}), "store_ids").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changelist_encoding() {
        let changes = vec![Change::insert(b"key", &[0x00, 0xff]), Change::delete(b"old")];
        let encoded = serde_json::to_value(&changes).expect("encode");
        assert_eq!(
            encoded,
            json!([
                {"action": "insert", "key": "6b6579", "value": "00ff"},
                {"action": "delete", "key": "6f6c64"}
            ])
        );
    }
}
