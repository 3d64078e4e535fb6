//! Fixtures shared by unit tests.

use std::collections::HashMap;

use crate::blockchain::{Block, Blockchain};
use crate::config::LedgerConfig;
use crate::consensus::{ChainSnapshot, PeerClient, PeerError};
use crate::mining::BlockTemplate;
use crate::transaction::{InputSignature, Transaction, TxIn};
use crate::wallet::{generate_keypair_hex, sign_message};

pub struct Keys {
    pub secret: String,
    pub address: String,
}

impl Keys {
    pub fn generate() -> Self {
        let (secret, _, address) = generate_keypair_hex();
        Self { secret, address }
    }
}

/// A chain whose second block pays `coinbase` to `alice`.
pub struct Funded {
    pub chain: Blockchain,
    pub alice: Keys,
    pub coinbase: Transaction,
}

pub fn funded_chain(reward: u64) -> Funded {
    let alice = Keys::generate();
    let mut chain = Blockchain::new(Block::genesis(1));
    let coinbase = Transaction::coinbase(alice.address.clone(), reward);
    let block = BlockTemplate::new(2, chain.last_block().hash.clone(), vec![coinbase.clone()], 1).solve();
    chain.append_block(block).unwrap();
    Funded { chain, alice, coinbase }
}

pub fn signed_input(secret: &str, tx_out_id: &str, tx_out_index: u32) -> TxIn {
    let message = format!("spend {tx_out_id}:{tx_out_index}").into_bytes();
    let signature_bytes = sign_message(secret, &message).unwrap();
    TxIn {
        tx_out_id: tx_out_id.to_string(),
        tx_out_index,
        signature: InputSignature {
            message,
            signature_bytes,
        },
    }
}

/// Ledger settings that keep proof-of-work instant.
pub fn fast_config() -> LedgerConfig {
    LedgerConfig {
        initial_difficulty: 1,
        ..LedgerConfig::default()
    }
}

/// Chain of `len` blocks at difficulty 1, every reward paid to `miner`.
pub fn grown_chain(len: usize, miner: &str) -> Blockchain {
    let mut chain = Blockchain::new(Block::genesis(1));
    while chain.len() < len {
        let last = chain.last_block();
        let block = BlockTemplate::new(
            last.index + 1,
            last.hash.clone(),
            vec![Transaction::coinbase(miner.into(), 50)],
            1,
        )
        .solve();
        chain.append_block(block).unwrap();
    }
    chain
}

/// Peers answering from memory; unknown peers are unreachable.
pub struct FakePeers(pub HashMap<String, ChainSnapshot>);

impl PeerClient for FakePeers {
    fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, PeerError> {
        self.0.get(peer).cloned().ok_or_else(|| PeerError::Status {
            peer: peer.to_string(),
            status: 503,
        })
    }
}
