use serde::{Deserialize, Serialize};

use crate::bytes32::Bytes32;

/// A signage point as relayed from the full node to the farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignagePoint {
    /// Challenge hash of the sub slot
    pub challenge_hash: Bytes32,
    /// Challenge chain signage point hash
    pub challenge_chain_sp: Bytes32,
    /// Reward chain signage point hash
    pub reward_chain_sp: Bytes32,
    /// Current difficulty
    pub difficulty: u64,
    /// Current sub slot iterations
    pub sub_slot_iters: u64,
    /// Index within the sub slot
    pub signage_point_index: u8,
    /// Peak height when the signage point arrived
    #[serde(default)]
    pub peak_height: Option<u32>,
}

/// A signage point together with the proofs found for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignagePointBundle {
    /// The signage point
    pub signage_point: SignagePoint,
    /// `(plot identifier, proof of space)` pairs, proof kept as raw JSON
    #[serde(default)]
    pub proofs: Vec<(String, serde_json::Value)>,
}

/// Where farmer and pool rewards are paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTargets {
    /// Address receiving farmer rewards
    pub farmer_target: String,
    /// Address receiving pool rewards for non-pooled plots
    pub pool_target: String,
    /// Only present when `search_for_private_key` was requested
    #[serde(default)]
    pub have_farmer_sk: Option<bool>,
    /// Only present when `search_for_private_key` was requested
    #[serde(default)]
    pub have_pool_sk: Option<bool>,
}

/// A plot file loaded by a harvester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotInfo {
    /// Path of the plot file
    pub filename: String,
    /// File size in bytes
    pub file_size: u64,
    /// Plot id
    pub plot_id: Bytes32,
    /// k size
    pub size: u8,
    /// Pool public key, for solo plots
    #[serde(default)]
    pub pool_public_key: Option<String>,
    /// Pool contract puzzle hash, for pooled plots
    #[serde(default)]
    pub pool_contract_puzzle_hash: Option<Bytes32>,
    /// Public key of the plot
    pub plot_public_key: String,
    /// Modification time, seconds since epoch
    #[serde(default)]
    pub time_modified: f64,
    /// Compression level, 0 for uncompressed
    #[serde(default)]
    pub compression_level: Option<u8>,
}

/// Plot state reported by `get_plots`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotListing {
    /// Loaded plots
    pub plots: Vec<PlotInfo>,
    /// Files that could not be opened
    pub failed_to_open_filenames: Vec<String>,
    /// Files that disappeared
    pub not_found_filenames: Vec<String>,
}

/// Plot loading settings of a harvester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Decompress plots on the GPU
    pub use_gpu_harvesting: bool,
    /// Device index used for GPU decompression
    pub gpu_index: u32,
    /// Only use the configured GPU index
    pub enforce_gpu_index: bool,
    /// Let the OS schedule decompressor threads freely
    pub disable_cpu_affinity: bool,
    /// Parallel decompressors
    pub parallel_decompressor_count: u32,
    /// Threads per decompressor
    pub decompressor_thread_count: u32,
    /// Scan plot directories recursively
    pub recursive_plot_scan: bool,
    /// Seconds between plot directory scans
    pub refresh_parameter_interval_seconds: u32,
}

/// Summary of peers seen by the crawler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerCounts {
    /// All peers ever seen
    pub total_last_5_days: u64,
    /// Peers reachable in the recent window
    pub reliable_nodes: u64,
    /// IPv4 peers from the last 5 days
    pub ipv4_last_5_days: u64,
    /// IPv6 peers from the last 5 days
    pub ipv6_last_5_days: u64,
    /// Node count by reported version
    pub versions: std::collections::BTreeMap<String, u64>,
}

/// Root hash of a data layer store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootInfo {
    /// Store id; `get_root` leaves it out of the response
    #[serde(default)]
    pub id: Option<Bytes32>,
    /// Merkle root, absent for an empty store
    #[serde(default)]
    pub hash: Option<Bytes32>,
    /// Whether the root is confirmed on chain
    pub confirmed: bool,
    /// Seconds since epoch
    pub timestamp: u64,
}
