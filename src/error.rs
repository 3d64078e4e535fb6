use thiserror::Error;

use crate::transaction::OutPoint;

/// Rejection of a single request. Never fatal: the ledger is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("referenced transaction {tx_out_id} not found in the chain")]
    ReferenceNotFound { tx_out_id: String },
    #[error("output index {index} out of range for transaction {tx_out_id} ({outputs} outputs)")]
    IndexOutOfRange {
        tx_out_id: String,
        index: u32,
        outputs: usize,
    },
    #[error("amount {0} does not fit in a single output")]
    AmountOverflow(u128),
    #[error("output {0} was already spent")]
    AlreadySpent(OutPoint),
    #[error("signature does not authorize spending {0}")]
    BadSignature(OutPoint),
    #[error("outputs total {outputs} exceeds inputs total {inputs}")]
    InsufficientInput { inputs: u128, outputs: u128 },
    #[error("outputs total {outputs} falls short of inputs total {inputs} and no change output returns the rest")]
    UnreturnedChange { inputs: u128, outputs: u128 },
    #[error("output {0} is already claimed by a pending transaction")]
    DoubleSpendInPool(OutPoint),
    #[error("input {0} appears twice in the same transaction")]
    DuplicateInput(OutPoint),
    #[error("transaction must have at least one output")]
    EmptyOutputs,
    #[error("output {0} has a zero amount")]
    ZeroAmountOutput(usize),
    #[error("transaction id {claimed} does not match its content hash {computed}")]
    TxIdMismatch { claimed: String, computed: String },
    #[error("coinbase transactions are created by the miner only")]
    UnexpectedCoinbase,
    #[error("previous hash {previous_hash} does not link to the chain tip {tip}")]
    BrokenLink { previous_hash: String, tip: String },
    #[error("block index {found} does not follow {expected_after}")]
    UnexpectedIndex { expected_after: u64, found: u64 },
    #[error("block hash {hash} does not meet difficulty {difficulty}")]
    BadProofOfWork { hash: String, difficulty: u32 },
    #[error("stored hash {stored} differs from computed hash {computed}")]
    HashMismatch { stored: String, computed: String },
    #[error("invalid peer address: {0}")]
    InvalidAddress(String),
    #[error("invalid miner address: {0}")]
    InvalidMinerAddress(String),
}

/// Startup-time misconfiguration. The node refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed genesis configuration: {0}")]
    MalformedGenesis(String),
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("invalid local identity: {0}")]
    InvalidIdentity(String),
    #[error("invalid bootstrap peer: {0}")]
    InvalidPeer(#[from] ValidationError),
    #[error("cannot parse {key}={value}")]
    Unparsable { key: String, value: String },
}
