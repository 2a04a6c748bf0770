//! Wallet service: keys, sync state, and per-wallet operations.

use serde_json::json;
use types::{
    decode_puzzle_hash, service_names, Bytes32, Coin, NetworkInfo, SentTransaction, SyncStatus,
    TransactionRecord, WalletBalance, WalletInfo, WalletType,
};

use crate::{ProxyError, Result, ServiceProxy};

crate::define_service_proxy!(
    /// Proxy for the wallet service.
    ///
    /// Commands that act on a single wallet live on [`Wallet`] and
    /// [`CatWallet`], obtained from [`WalletProxy::wallet`] and
    /// [`WalletProxy::cat_wallet`].
    WalletProxy,
    service_names::WALLET
);

fn check_address(address: &str) -> Result<()> {
    decode_puzzle_hash(address)
        .map(|_| ())
        .map_err(|e| ProxyError::InvalidArgument(format!("{}: {}", address, e)))
}

fn check_amount(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(ProxyError::InvalidArgument("amount must be positive".to_string()));
    }
    Ok(())
}

impl WalletProxy {
    /// Per-wallet commands for `wallet_id`.
    pub fn wallet(&self, wallet_id: u32) -> Wallet { Wallet { proxy: self.proxy.clone(), wallet_id } }

    /// CAT commands for `wallet_id`.
    pub fn cat_wallet(&self, wallet_id: u32) -> CatWallet { CatWallet { wallet: self.wallet(wallet_id) } }

    /// Switches the wallet to the key with `fingerprint`.
    pub async fn log_in(&self, fingerprint: u32) -> Result<u32> {
        self.proxy.send_for("log_in", json!({ "fingerprint": fingerprint }), "fingerprint").await
    }

    /// Fingerprint of the active key, if a key is logged in.
    pub async fn get_logged_in_fingerprint(&self) -> Result<Option<u32>> {
        self.proxy.send_for("get_logged_in_fingerprint", json!({}), "fingerprint").await
    }

    /// Fingerprints of every key the wallet can use.
    pub async fn get_public_keys(&self) -> Result<Vec<u32>> {
        self.proxy.send_for("get_public_keys", json!({}), "public_key_fingerprints").await
    }

    /// A fresh 24 word mnemonic; nothing is stored.
    pub async fn generate_mnemonic(&self) -> Result<Vec<String>> {
        self.proxy.send_for("generate_mnemonic", json!({}), "mnemonic").await
    }

    /// Imports a key from its mnemonic, returning its fingerprint.
    pub async fn add_key(&self, mnemonic: &[String]) -> Result<u32> {
        if mnemonic.is_empty() {
            return Err(ProxyError::InvalidArgument("mnemonic must not be empty".to_string()));
        }
        self.proxy.send_for("add_key", json!({ "mnemonic": mnemonic }), "fingerprint").await
    }

    /// Removes a key.
    pub async fn delete_key(&self, fingerprint: u32) -> Result<()> {
        self.proxy.send_ok("delete_key", json!({ "fingerprint": fingerprint })).await
    }

    /// Wallet sync progress.
    pub async fn get_sync_status(&self) -> Result<SyncStatus> {
        self.proxy.send_as("get_sync_status", json!({})).await
    }

    /// Height the wallet has synced to.
    pub async fn get_height_info(&self) -> Result<u32> {
        self.proxy.send_for("get_height_info", json!({}), "height").await
    }

    /// Name and address prefix of the wallet's network.
    pub async fn get_network_info(&self) -> Result<NetworkInfo> {
        self.proxy.send_as("get_network_info", json!({})).await
    }

    /// Wallets of the logged-in key, optionally of one type only.
    pub async fn get_wallets(&self, wallet_type: Option<WalletType>) -> Result<Vec<WalletInfo>> {
        let mut data = json!({ "include_data": true });
        if let Some(wallet_type) = wallet_type {
            data["type"] = json!(u8::from(wallet_type));
        }
        self.proxy.send_for("get_wallets", data, "wallets").await
    }

    /// A transaction by id.
    pub async fn get_transaction(&self, transaction_id: &Bytes32) -> Result<TransactionRecord> {
        self.proxy
            .send_for("get_transaction", json!({ "transaction_id": transaction_id }), "transaction")
            .await
    }

    /// Submits a serialized spend bundle (hex) through the wallet.
    pub async fn push_tx(&self, spend_bundle_hex: &str) -> Result<()> {
        let digits = spend_bundle_hex.strip_prefix("0x").unwrap_or(spend_bundle_hex);
        if digits.is_empty() || digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(ProxyError::InvalidArgument("spend bundle must be hex encoded".to_string()));
        }
        self.proxy.send_ok("push_tx", json!({ "spend_bundle": digits })).await
    }

    /// Timestamp of the transaction block at or before `height`.
    pub async fn get_timestamp_for_height(&self, height: u32) -> Result<u64> {
        self.proxy.send_for("get_timestamp_for_height", json!({ "height": height }), "timestamp").await
    }

    /// Farms a block paying `address` (simulator only).
    pub async fn farm_block(&self, address: &str) -> Result<()> {
        check_address(address)?;
        self.proxy.send_ok("farm_block", json!({ "address": address })).await
    }
}

/// Commands scoped to a single wallet id.
#[derive(Debug, Clone)]
pub struct Wallet {
    proxy: ServiceProxy,
    wallet_id: u32,
}

impl Wallet {
    /// The wallet id.
    pub fn wallet_id(&self) -> u32 { self.wallet_id }

    /// Balances of this wallet.
    pub async fn get_balance(&self) -> Result<WalletBalance> {
        self.proxy
            .send_for("get_wallet_balance", json!({ "wallet_id": self.wallet_id }), "wallet_balance")
            .await
    }

    /// Current receive address, or a new one when `new_address` is set.
    pub async fn get_next_address(&self, new_address: bool) -> Result<String> {
        let data = json!({ "wallet_id": self.wallet_id, "new_address": new_address });
        self.proxy.send_for("get_next_address", data, "address").await
    }

    /// Sends `amount` mojos to `address`.
    pub async fn send_transaction(
        &self,
        address: &str,
        amount: u64,
        fee: u64,
        memos: &[String],
    ) -> Result<SentTransaction> {
        check_amount(amount)?;
        check_address(address)?;
        let mut data = json!({
            "wallet_id": self.wallet_id,
            "address": address,
            "amount": amount,
            "fee": fee,
        });
        if !memos.is_empty() {
            data["memos"] = json!(memos);
        }
        self.proxy.send_as("send_transaction", data).await
    }

    /// Transactions in `[start, end)`, newest first when `reverse` is set.
    pub async fn get_transactions(
        &self,
        start: u32,
        end: u32,
        reverse: bool,
    ) -> Result<Vec<TransactionRecord>> {
        let data = json!({
            "wallet_id": self.wallet_id,
            "start": start,
            "end": end,
            "reverse": reverse,
        });
        self.proxy.send_for("get_transactions", data, "transactions").await
    }

    /// Number of transactions of this wallet.
    pub async fn get_transaction_count(&self) -> Result<u32> {
        self.proxy
            .send_for("get_transaction_count", json!({ "wallet_id": self.wallet_id }), "count")
            .await
    }

    /// Drops transactions not yet confirmed.
    pub async fn delete_unconfirmed_transactions(&self) -> Result<()> {
        self.proxy
            .send_ok("delete_unconfirmed_transactions", json!({ "wallet_id": self.wallet_id }))
            .await
    }

    /// Coins adding up to at least `amount` mojos.
    pub async fn select_coins(&self, amount: u64) -> Result<Vec<Coin>> {
        check_amount(amount)?;
        self.proxy
            .send_for("select_coins", json!({ "wallet_id": self.wallet_id, "amount": amount }), "coins")
            .await
    }
}

/// Commands of a CAT (Chia asset token) wallet.
#[derive(Debug, Clone)]
pub struct CatWallet {
    wallet: Wallet,
}

impl CatWallet {
    /// The generic wallet commands for this id.
    pub fn wallet(&self) -> &Wallet { &self.wallet }

    /// Display name of the token.
    pub async fn get_name(&self) -> Result<String> {
        self.wallet
            .proxy
            .send_for("cat_get_name", json!({ "wallet_id": self.wallet.wallet_id }), "name")
            .await
    }

    /// Renames the token locally.
    pub async fn set_name(&self, name: &str) -> Result<()> {
        self.wallet
            .proxy
            .send_ok("cat_set_name", json!({ "wallet_id": self.wallet.wallet_id, "name": name }))
            .await
    }

    /// Asset id (TAIL hash) of the token, hex.
    pub async fn get_asset_id(&self) -> Result<String> {
        self.wallet
            .proxy
            .send_for("cat_get_asset_id", json!({ "wallet_id": self.wallet.wallet_id }), "asset_id")
            .await
    }

    /// Sends `amount` token mojos to `inner_address`, paying `fee` in XCH mojos.
    pub async fn spend(
        &self,
        inner_address: &str,
        amount: u64,
        fee: u64,
        memos: &[String],
    ) -> Result<SentTransaction> {
        check_amount(amount)?;
        check_address(inner_address)?;
        let mut data = json!({
            "wallet_id": self.wallet.wallet_id,
            "inner_address": inner_address,
            "amount": amount,
            "fee": fee,
        });
        if !memos.is_empty() {
            data["memos"] = json!(memos);
        }
        self.wallet.proxy.send_as("cat_spend", data).await
    }
}
