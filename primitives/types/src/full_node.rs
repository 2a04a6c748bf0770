use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bytes32::Bytes32;

/// An unspent or spent coin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Id of the coin that created this one
    pub parent_coin_info: Bytes32,
    /// Hash of the puzzle locking this coin
    pub puzzle_hash: Bytes32,
    /// Value in mojos
    pub amount: u64,
}

/// A coin together with its chain history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// The coin
    pub coin: Coin,
    /// Height at which the coin was created
    pub confirmed_block_index: u32,
    /// Height at which the coin was spent, 0 if unspent
    pub spent_block_index: u32,
    /// Whether the coin has been spent
    #[serde(default)]
    pub spent: bool,
    /// Farmer or pool reward coin
    pub coinbase: bool,
    /// Timestamp of the creating block
    pub timestamp: u64,
}

/// A coin together with the puzzle and solution that spend it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSpend {
    /// The coin being spent
    pub coin: Coin,
    /// Serialized CLVM program, hex
    pub puzzle_reveal: String,
    /// Serialized CLVM program, hex
    pub solution: String,
}

/// A signed set of coin spends submitted as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendBundle {
    /// Spends in the bundle
    pub coin_spends: Vec<CoinSpend>,
    /// BLS aggregate signature, hex
    pub aggregated_signature: String,
}

/// Sync progress of the full node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncState {
    /// Long sync in progress
    pub sync_mode: bool,
    /// Caught up with the network peak
    pub synced: bool,
    /// Height being synced to
    pub sync_tip_height: u32,
    /// Height reached so far
    pub sync_progress_height: u32,
}

/// Header-level summary of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Block header hash
    pub header_hash: Bytes32,
    /// Previous block header hash
    pub prev_hash: Bytes32,
    /// Height
    pub height: u32,
    /// Cumulative chain weight
    pub weight: u128,
    /// Cumulative VDF iterations
    pub total_iters: u128,
    /// Signage point the block was farmed at
    pub signage_point_index: u8,
    /// Sub slot iterations in effect
    pub sub_slot_iters: u64,
    /// Reward puzzle hash of the farmer
    pub farmer_puzzle_hash: Bytes32,
    /// Reward puzzle hash of the pool
    pub pool_puzzle_hash: Bytes32,
    /// Required iterations for the proof of space
    pub required_iters: u64,
    /// Sub slot deficit
    pub deficit: u8,
    /// Farmed at an overflow signage point
    pub overflow: bool,
    /// Height of the previous transaction block
    pub prev_transaction_block_height: u32,
    /// Only set on transaction blocks
    #[serde(default)]
    pub timestamp: Option<u64>,
    /// Only set on transaction blocks
    #[serde(default)]
    pub prev_transaction_block_hash: Option<Bytes32>,
    /// Only set on transaction blocks
    #[serde(default)]
    pub fees: Option<u64>,
    /// Only set on transaction blocks
    #[serde(default)]
    pub reward_claims_incorporated: Option<Vec<Coin>>,
}

impl BlockRecord {
    /// `true` if the block carries transactions.
    pub fn is_transaction_block(&self) -> bool { self.timestamp.is_some() }
}

/// Current state of the blockchain as seen by the full node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainState {
    /// Heaviest block known, absent before the genesis block
    #[serde(default)]
    pub peak: Option<BlockRecord>,
    /// Whether the genesis challenge has been set
    pub genesis_challenge_initialized: bool,
    /// Sync progress
    pub sync: SyncState,
    /// Current difficulty
    pub difficulty: u64,
    /// Current sub slot iterations
    pub sub_slot_iters: u64,
    /// Estimated network space in bytes
    pub space: u128,
    /// Number of items in the mempool
    #[serde(default)]
    pub mempool_size: u64,
    /// Total cost of the mempool
    #[serde(default)]
    pub mempool_cost: u64,
    /// Total fees in the mempool
    #[serde(default)]
    pub mempool_fees: u64,
    /// Fee rates required to enter the mempool, keyed by cost bucket
    #[serde(default)]
    pub mempool_min_fees: Value,
    /// Maximum total cost the mempool accepts
    #[serde(default)]
    pub mempool_max_total_cost: u64,
    /// Maximum cost of a block
    #[serde(default)]
    pub block_max_cost: u64,
    /// Id of the queried node
    #[serde(default)]
    pub node_id: Option<Bytes32>,
}

/// Network name and address prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// e.g. `mainnet`, `testnet11`
    pub network_name: String,
    /// Address prefix, e.g. `xch`
    pub network_prefix: String,
}

/// Coins created and spent by a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionsAndRemovals {
    /// Coins created
    pub additions: Vec<CoinRecord>,
    /// Coins spent
    pub removals: Vec<CoinRecord>,
}

/// A transaction waiting in the mempool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolItem {
    /// The submitted bundle
    pub spend_bundle: SpendBundle,
    /// Fee in mojos
    pub fee: u64,
    /// CLVM cost
    #[serde(default)]
    pub cost: u64,
    /// Spend bundle id
    pub spend_bundle_name: Bytes32,
    /// Coins created
    #[serde(default)]
    pub additions: Vec<Coin>,
    /// Coins spent
    #[serde(default)]
    pub removals: Vec<Coin>,
}

/// Fee estimates for a set of confirmation time targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeEstimate {
    /// Estimated fee per requested target, mojos
    pub estimates: Vec<u64>,
    /// The requested targets, seconds
    pub target_times: Vec<u64>,
    /// Current fee rate, mojos per cost
    pub current_fee_rate: f64,
    /// Mempool size, cost
    pub mempool_size: u64,
    /// Mempool capacity, cost
    pub mempool_max_size: u64,
    /// Whether the node considers itself synced
    pub full_node_synced: bool,
    /// Peak height at estimation time
    pub peak_height: u32,
    /// Timestamp of the last transaction block
    pub last_peak_timestamp: u64,
    /// Node wall clock
    pub node_time_utc: u64,
}
