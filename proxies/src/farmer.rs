//! Farmer service: signage points, reward targets and pools.

use serde_json::{json, Value};
use types::{decode_puzzle_hash, service_names, Bytes32, RewardTargets, SignagePointBundle};

use crate::{ProxyError, Result};

crate::define_service_proxy!(
    /// Proxy for the farmer service.
    FarmerProxy,
    service_names::FARMER
);

impl FarmerProxy {
    /// A signage point the farmer has seen, with the proofs found for it.
    pub async fn get_signage_point(&self, sp_hash: &Bytes32) -> Result<SignagePointBundle> {
        self.proxy.send_as("get_signage_point", json!({ "sp_hash": sp_hash })).await
    }

    /// Every signage point the farmer still remembers.
    pub async fn get_signage_points(&self) -> Result<Vec<SignagePointBundle>> {
        self.proxy.send_for("get_signage_points", json!({}), "signage_points").await
    }

    /// Reward addresses; with `search_for_private_key` the farmer also
    /// reports whether it holds the matching keys.
    pub async fn get_reward_targets(&self, search_for_private_key: bool) -> Result<RewardTargets> {
        let data = json!({
            "search_for_private_key": search_for_private_key,
            "max_ph_to_search": 500,
        });
        self.proxy.send_as("get_reward_targets", data).await
    }

    /// Changes either or both reward addresses.
    pub async fn set_reward_targets(
        &self,
        farmer_target: Option<&str>,
        pool_target: Option<&str>,
    ) -> Result<()> {
        let mut data = json!({});
        for (key, target) in [("farmer_target", farmer_target), ("pool_target", pool_target)] {
            if let Some(address) = target {
                decode_puzzle_hash(address)
                    .map_err(|e| ProxyError::InvalidArgument(format!("{}: {}", address, e)))?;
                data[key] = json!(address);
            }
        }
        self.proxy.send_ok("set_reward_targets", data).await
    }

    /// State of each pool the farmer belongs to.
    pub async fn get_pool_state(&self) -> Result<Vec<Value>> {
        self.proxy.send_for("get_pool_state", json!({}), "pool_state").await
    }

    /// Connected harvesters with their plot listings.
    pub async fn get_harvesters(&self) -> Result<Vec<Value>> {
        self.proxy.send_for("get_harvesters", json!({}), "harvesters").await
    }

    /// Connected harvesters with plot counts only.
    pub async fn get_harvesters_summary(&self) -> Result<Vec<Value>> {
        self.proxy.send_for("get_harvesters_summary", json!({}), "harvesters").await
    }

    /// Login link for the pool of the plot NFT `launcher_id`.
    pub async fn get_pool_login_link(&self, launcher_id: &Bytes32) -> Result<String> {
        self.proxy
            .send_for("get_pool_login_link", json!({ "launcher_id": launcher_id }), "login_link")
            .await
    }
}
