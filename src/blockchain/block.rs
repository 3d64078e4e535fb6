use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{GENESIS_HASH, GENESIS_TIMESTAMP};
use crate::crypto::{Hash, ZERO_HASH, content_hash, meets_difficulty};
use crate::transaction::Transaction;

/// A single block in the blockchain holding a list of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub previous_hash: Hash,
    pub timestamp: u64, // Unix seconds (UTC)
    pub transactions: Vec<Transaction>,
    pub difficulty: u32,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: Hash, // Cached hash of the block
}

/// Every field of a block except its hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockContent<'a> {
    index: u64,
    previous_hash: &'a str,
    timestamp: u64,
    transactions: &'a [Transaction],
    difficulty: u32,
    nonce: u64,
}

pub fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

impl Block {
    /// The genesis block. Its hash is a fixed sentinel rather than a content
    /// hash, so it is identical on every node for a given difficulty.
    pub fn genesis(difficulty: u32) -> Self {
        Self::genesis_with_hash(difficulty, GENESIS_HASH.to_string())
    }

    pub fn genesis_with_hash(difficulty: u32, hash: Hash) -> Self {
        Self {
            index: 1,
            previous_hash: ZERO_HASH.to_string(),
            timestamp: GENESIS_TIMESTAMP,
            transactions: Vec::new(),
            difficulty,
            nonce: 0,
            hash,
        }
    }

    /// Create a new block (not mined yet) stamped with the current time.
    pub fn new(
        index: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        difficulty: u32,
    ) -> Self {
        let mut block = Self {
            index,
            previous_hash,
            timestamp: now_secs(),
            transactions,
            difficulty,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Canonical content hash of every field except `hash`.
    pub fn compute_hash(&self) -> Hash {
        content_hash(&BlockContent {
            index: self.index,
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            difficulty: self.difficulty,
            nonce: self.nonce,
        })
    }

    /// Whether the stored hash carries `difficulty` leading zero hex digits.
    pub fn meets_own_difficulty(&self) -> bool {
        meets_difficulty(&self.hash, self.difficulty)
    }
}
