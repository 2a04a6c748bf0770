use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bytes32::Bytes32;
use crate::full_node::{Coin, SpendBundle};

/// Kind of wallet, serialized as the node's integer code.
///
/// Codes this crate does not know are preserved in [`WalletType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum WalletType {
    /// Standard XCH wallet
    Standard,
    /// Atomic swap
    AtomicSwap,
    /// Authorized payee
    AuthorizedPayee,
    /// Multi-signature
    MultiSig,
    /// Custody
    Custody,
    /// Chia asset token
    Cat,
    /// Recoverable
    Recoverable,
    /// Decentralized identity
    DecentralizedId,
    /// Pool singleton
    Pooling,
    /// NFT collection
    Nft,
    /// Data layer singleton
    DataLayer,
    /// Data layer offers
    DataLayerOffer,
    /// Verifiable credentials
    VerifiableCredential,
    /// Credential-restricted CAT
    CrCat,
    /// Unrecognized code
    Other(u8),
}

impl From<u8> for WalletType {
    fn from(value: u8) -> Self {
        match value {
            0 => WalletType::Standard,
            2 => WalletType::AtomicSwap,
            3 => WalletType::AuthorizedPayee,
            4 => WalletType::MultiSig,
            5 => WalletType::Custody,
            6 => WalletType::Cat,
            7 => WalletType::Recoverable,
            8 => WalletType::DecentralizedId,
            9 => WalletType::Pooling,
            10 => WalletType::Nft,
            11 => WalletType::DataLayer,
            12 => WalletType::DataLayerOffer,
            13 => WalletType::VerifiableCredential,
            57 => WalletType::CrCat,
            other => WalletType::Other(other),
        }
    }
}

impl From<WalletType> for u8 {
    fn from(value: WalletType) -> Self {
        match value {
            WalletType::Standard => 0,
            WalletType::AtomicSwap => 2,
            WalletType::AuthorizedPayee => 3,
            WalletType::MultiSig => 4,
            WalletType::Custody => 5,
            WalletType::Cat => 6,
            WalletType::Recoverable => 7,
            WalletType::DecentralizedId => 8,
            WalletType::Pooling => 9,
            WalletType::Nft => 10,
            WalletType::DataLayer => 11,
            WalletType::DataLayerOffer => 12,
            WalletType::VerifiableCredential => 13,
            WalletType::CrCat => 57,
            WalletType::Other(code) => code,
        }
    }
}

/// A wallet as listed by `get_wallets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Wallet id, 1 is the standard wallet
    pub id: u32,
    /// Display name
    pub name: String,
    /// Wallet kind
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Type-specific data (e.g. the asset id of a CAT wallet)
    #[serde(default)]
    pub data: String,
}

/// Balances of a single wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Wallet id
    pub wallet_id: u32,
    /// Confirmed balance, mojos
    pub confirmed_wallet_balance: u128,
    /// Balance including pending transactions, mojos
    pub unconfirmed_wallet_balance: u128,
    /// Amount available to spend now, mojos
    pub spendable_balance: u128,
    /// Change from pending spends, mojos
    #[serde(default)]
    pub pending_change: u128,
    /// Largest amount sendable in one transaction, mojos
    #[serde(default)]
    pub max_send_amount: u128,
    /// Number of unspent coins
    #[serde(default)]
    pub unspent_coin_count: u32,
    /// Coins locked by pending transactions
    #[serde(default)]
    pub pending_coin_removal_count: u32,
    /// Fingerprint of the logged-in key
    #[serde(default)]
    pub fingerprint: Option<u32>,
    /// Wallet kind
    #[serde(default)]
    pub wallet_type: Option<WalletType>,
}

/// A wallet transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction id
    pub name: Bytes32,
    /// Height at which it was confirmed, 0 if pending
    pub confirmed_at_height: u32,
    /// Seconds since epoch
    pub created_at_time: u64,
    /// Recipient puzzle hash
    pub to_puzzle_hash: Bytes32,
    /// Recipient address, when the wallet could compute it
    #[serde(default)]
    pub to_address: Option<String>,
    /// Amount, mojos
    pub amount: u64,
    /// Fee, mojos
    pub fee_amount: u64,
    /// Whether the transaction is on chain
    pub confirmed: bool,
    /// Number of peers the transaction was sent to
    pub sent: u32,
    /// The spend bundle, absent for incoming transactions
    #[serde(default)]
    pub spend_bundle: Option<SpendBundle>,
    /// Coins created
    #[serde(default)]
    pub additions: Vec<Coin>,
    /// Coins spent
    #[serde(default)]
    pub removals: Vec<Coin>,
    /// Owning wallet id
    pub wallet_id: u32,
    /// Related trade, if any
    #[serde(default)]
    pub trade_id: Option<Bytes32>,
    /// Incoming/outgoing/fee/... code
    #[serde(rename = "type")]
    pub transaction_type: u32,
    /// Memos keyed by coin id
    #[serde(default)]
    pub memos: Value,
}

/// Wallet sync progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncStatus {
    /// Caught up with the chain
    pub synced: bool,
    /// Sync in progress
    pub syncing: bool,
    /// Genesis challenge known
    pub genesis_initialized: bool,
}

/// Outcome of `send_transaction` style commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentTransaction {
    /// The transaction created
    pub transaction: TransactionRecord,
    /// Its id
    pub transaction_id: Bytes32,
}
