use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, content_hash};

/// Hex public key owning an output.
pub type Address = String;

/// Identifies a specific transaction output by its txid and index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: String,
    pub vout: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Proof of authorization: an ECDSA signature over an arbitrary message,
/// checked against the address of the output being spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSignature {
    #[serde(with = "hex::serde")]
    pub message: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signature_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxIn {
    pub tx_out_id: String,
    pub tx_out_index: u32,
    pub signature: InputSignature,
}

impl TxIn {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.tx_out_id.clone(),
            vout: self.tx_out_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub address: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Content hash of `tx_ins` and `tx_outs`.
    pub id: Hash,
    pub tx_ins: Vec<TxIn>,
    pub tx_outs: Vec<TxOut>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TxContent<'a> {
    tx_ins: &'a [TxIn],
    tx_outs: &'a [TxOut],
}

impl Transaction {
    /// Build a transaction and compute its id deterministically from its content.
    pub fn new(tx_ins: Vec<TxIn>, tx_outs: Vec<TxOut>) -> Self {
        let id = Self::content_id(&tx_ins, &tx_outs);
        Self { id, tx_ins, tx_outs }
    }

    /// Reward-minting transaction: no inputs, a single output.
    pub fn coinbase(address: Address, amount: u64) -> Self {
        Self::new(Vec::new(), vec![TxOut { address, amount }])
    }

    fn content_id(tx_ins: &[TxIn], tx_outs: &[TxOut]) -> Hash {
        content_hash(&TxContent { tx_ins, tx_outs })
    }

    /// Recompute the id from the current content.
    pub fn compute_id(&self) -> Hash {
        Self::content_id(&self.tx_ins, &self.tx_outs)
    }

    pub fn is_coinbase(&self) -> bool {
        self.tx_ins.is_empty() && self.tx_outs.len() == 1
    }

    pub fn total_output_amount(&self) -> u128 {
        self.tx_outs.iter().map(|o| o.amount as u128).sum()
    }

    pub fn outpoints(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.tx_ins.iter().map(TxIn::outpoint)
    }
}
