use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blockchain::Block;
use crate::config::NodeConfig;
use crate::consensus::PeerRegistry;
use crate::crypto::Hash;
use crate::error::ConfigError;
use crate::ledger::Ledger;
use crate::transaction::{Transaction, TxIn, TxOut};

/// Shared application state: the ledger engine and the peer set.
pub struct AppState {
    pub node_id: String,
    pub ledger: Mutex<Ledger>,
    pub peers: Mutex<PeerRegistry>,
    /// Beneficiary used when a mine request names none.
    pub miner_address: Option<String>,
    pub peer_timeout: Duration,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            node_id: Uuid::new_v4().simple().to_string(),
            ledger: Mutex::new(ledger),
            peers: Mutex::new(PeerRegistry::new()),
            miner_address: None,
            peer_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        let mut peers = PeerRegistry::new();
        for peer in &config.peers {
            peers.register(peer)?;
        }
        Ok(Self {
            peers: Mutex::new(peers),
            miner_address: config.miner_address.clone(),
            peer_timeout: config.peer_timeout,
            ..Self::new(Ledger::new(config.ledger.clone())?)
        })
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Deserialize)]
pub struct MineRequest {
    #[serde(default)]
    pub miner_address: Option<String>,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub hash: Hash,
    pub previous_hash: Hash,
    pub nonce: u64,
    pub difficulty: u32,
    pub transactions: Vec<Transaction>,
}

impl From<&Block> for MineResponse {
    fn from(block: &Block) -> Self {
        Self {
            message: "New Block Forged",
            index: block.index,
            hash: block.hash.clone(),
            previous_hash: block.previous_hash.clone(),
            nonce: block.nonce,
            difficulty: block.difficulty,
            transactions: block.transactions.clone(),
        }
    }
}

/* ---------- TX API Models ---------- */

/// A transaction as submitted by a client. `id` may be omitted, in which
/// case it is computed from the content.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTxRequest {
    #[serde(default)]
    pub id: Option<Hash>,
    pub tx_ins: Vec<TxIn>,
    pub tx_outs: Vec<TxOut>,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub txid: Hash,
    pub block_index: u64,
}

#[derive(Serialize)]
pub struct MempoolResponse {
    pub size: usize,
    pub transactions: Vec<String>, // list txids for brevity
}

/* ---------- Peer API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub length: usize,
    pub chain: Vec<Block>,
}

/* ---------- Query API Models ---------- */

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: u128,
    pub utxos: usize,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub node_id: String,
    pub height: usize,
    pub difficulty: u32,
    pub next_difficulty: u32,
    pub block_generation_interval: u64,
    pub difficulty_adjustment_interval: u64,
    pub last_interval_secs: Option<u64>,
    pub avg_interval_secs: Option<f64>,
    pub mempool_size: usize,
    pub utxo_size: usize,
    pub peers: usize,
}

#[derive(Serialize)]
pub struct WalletResponse {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
}
