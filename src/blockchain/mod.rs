pub mod block;
pub mod difficulty;
pub mod model;

pub use block::Block;
pub use difficulty::{RetargetParams, next_difficulty};
pub use model::Blockchain;

/// Initial Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Coinbase reward per mined block.
pub const BASE_REWARD: u64 = 50;

/// Expected seconds between blocks. Also the retarget cadence: difficulty
/// is reconsidered whenever the tip index is a multiple of this value.
pub const BLOCK_GENERATION_INTERVAL: u64 = 10;

/// How many blocks back the retarget anchor sits.
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: u64 = 10;

/// Fixed hash of the genesis block, shared by every node.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000001";

/// Fixed genesis timestamp so every node's genesis block is byte-identical.
pub const GENESIS_TIMESTAMP: u64 = 0;
