//! Full node: chain state, blocks, coins and the mempool.

use serde_json::{json, Value};
use types::{
    service_names, AdditionsAndRemovals, BlockRecord, BlockchainState, Bytes32, CoinRecord,
    FeeEstimate, MempoolItem, NetworkInfo, SpendBundle,
};

use crate::{ProxyError, Result};

crate::define_service_proxy!(
    /// Proxy for the full node service.
    FullNodeProxy,
    service_names::FULL_NODE
);

fn check_range(start: u32, end: u32) -> Result<()> {
    if start > end {
        return Err(ProxyError::InvalidArgument(format!(
            "start height {} is above end height {}",
            start, end
        )));
    }
    Ok(())
}

impl FullNodeProxy {
    /// Current state of the blockchain.
    pub async fn get_blockchain_state(&self) -> Result<BlockchainState> {
        self.proxy.send_for("get_blockchain_state", json!({}), "blockchain_state").await
    }

    /// Name and address prefix of the network the node is on.
    pub async fn get_network_info(&self) -> Result<NetworkInfo> {
        self.proxy.send_as("get_network_info", json!({})).await
    }

    /// A full block; its deep structure is left as JSON.
    pub async fn get_block(&self, header_hash: &Bytes32) -> Result<Value> {
        self.proxy.send_for("get_block", json!({ "header_hash": header_hash }), "block").await
    }

    /// Full blocks in `[start, end)`.
    pub async fn get_blocks(
        &self,
        start: u32,
        end: u32,
        exclude_header_hash: bool,
        exclude_reorged: bool,
    ) -> Result<Vec<Value>> {
        check_range(start, end)?;
        let data = json!({
            "start": start,
            "end": end,
            "exclude_header_hash": exclude_header_hash,
            "exclude_reorged": exclude_reorged,
        });
        self.proxy.send_for("get_blocks", data, "blocks").await
    }

    /// Header summary of a block.
    pub async fn get_block_record(&self, header_hash: &Bytes32) -> Result<BlockRecord> {
        self.proxy
            .send_for("get_block_record", json!({ "header_hash": header_hash }), "block_record")
            .await
    }

    /// Header summary of the block at `height` on the main chain.
    pub async fn get_block_record_by_height(&self, height: u32) -> Result<BlockRecord> {
        self.proxy
            .send_for("get_block_record_by_height", json!({ "height": height }), "block_record")
            .await
    }

    /// Header summaries for heights in `[start, end)`.
    pub async fn get_block_records(&self, start: u32, end: u32) -> Result<Vec<BlockRecord>> {
        check_range(start, end)?;
        self.proxy
            .send_for("get_block_records", json!({ "start": start, "end": end }), "block_records")
            .await
    }

    /// Coins created and spent by a block.
    pub async fn get_additions_and_removals(
        &self,
        header_hash: &Bytes32,
    ) -> Result<AdditionsAndRemovals> {
        self.proxy.send_as("get_additions_and_removals", json!({ "header_hash": header_hash })).await
    }

    /// A coin by id.
    pub async fn get_coin_record_by_name(&self, name: &Bytes32) -> Result<CoinRecord> {
        self.proxy.send_for("get_coin_record_by_name", json!({ "name": name }), "coin_record").await
    }

    /// Coins locked by `puzzle_hash`, optionally limited to a height range.
    pub async fn get_coin_records_by_puzzle_hash(
        &self,
        puzzle_hash: &Bytes32,
        include_spent_coins: bool,
        start_height: Option<u32>,
        end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>> {
        let mut data = json!({
            "puzzle_hash": puzzle_hash,
            "include_spent_coins": include_spent_coins,
        });
        if let Some(start) = start_height {
            data["start_height"] = json!(start);
        }
        if let Some(end) = end_height {
            data["end_height"] = json!(end);
        }
        self.proxy.send_for("get_coin_records_by_puzzle_hash", data, "coin_records").await
    }

    /// Ids of every spend bundle in the mempool.
    pub async fn get_all_mempool_tx_ids(&self) -> Result<Vec<Bytes32>> {
        self.proxy.send_for("get_all_mempool_tx_ids", json!({}), "tx_ids").await
    }

    /// A mempool entry by spend bundle id.
    pub async fn get_mempool_item_by_tx_id(&self, tx_id: &Bytes32) -> Result<MempoolItem> {
        self.proxy
            .send_for("get_mempool_item_by_tx_id", json!({ "tx_id": tx_id }), "mempool_item")
            .await
    }

    /// Estimated network space, in bytes, between two blocks.
    pub async fn get_network_space(
        &self,
        newer_block_header_hash: &Bytes32,
        older_block_header_hash: &Bytes32,
    ) -> Result<u128> {
        let data = json!({
            "newer_block_header_hash": newer_block_header_hash,
            "older_block_header_hash": older_block_header_hash,
        });
        self.proxy.send_for("get_network_space", data, "space").await
    }

    /// Submits a spend bundle; returns the mempool inclusion status.
    pub async fn push_tx(&self, spend_bundle: &SpendBundle) -> Result<String> {
        self.proxy.send_for("push_tx", json!({ "spend_bundle": spend_bundle }), "status").await
    }

    /// Fee estimates for a transaction of `cost` confirmed within each
    /// target time, in seconds.
    pub async fn get_fee_estimate(&self, target_times: &[u64], cost: u64) -> Result<FeeEstimate> {
        if target_times.is_empty() {
            return Err(ProxyError::InvalidArgument("target_times must not be empty".to_string()));
        }
        self.proxy
            .send_as("get_fee_estimate", json!({ "target_times": target_times, "cost": cost }))
            .await
    }
}
