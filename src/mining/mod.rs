//! Proof-of-Work search.
//!
//! A [`BlockTemplate`] freezes everything that goes into a block except the
//! nonce. The search itself needs no access to the ledger, so the node runs
//! it with the ledger lock released.

use log::debug;
use std::time::Instant;

use crate::blockchain::Block;
use crate::crypto::{Hash, meets_difficulty};
use crate::transaction::Transaction;

/// A block whose contents are fixed and whose nonce is still unknown.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    block: Block,
}

impl BlockTemplate {
    pub fn new(
        index: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        difficulty: u32,
    ) -> Self {
        Self {
            block: Block::new(index, previous_hash, transactions, difficulty),
        }
    }

    pub fn index(&self) -> u64 {
        self.block.index
    }

    pub fn previous_hash(&self) -> &str {
        &self.block.previous_hash
    }

    pub fn difficulty(&self) -> u32 {
        self.block.difficulty
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.block.transactions
    }

    /// Run the nonce search and return the sealed block.
    pub fn solve(self) -> Block {
        let t0 = Instant::now();
        let mut block = self.block;
        let difficulty = block.difficulty;
        block.nonce = proof_of_work(&block, difficulty);
        block.hash = block.compute_hash();
        debug!(
            "MINER - block #{} solved at diff={} nonce={} in {} ms",
            block.index,
            difficulty,
            block.nonce,
            t0.elapsed().as_millis()
        );
        block
    }
}

/// First nonce, counting from zero, whose block hash starts with
/// `difficulty` zero hex digits. Unbounded: there is no cancellation.
pub fn proof_of_work(template: &Block, difficulty: u32) -> u64 {
    let mut candidate = template.clone();
    candidate.nonce = 0;
    loop {
        if meets_difficulty(&candidate.compute_hash(), difficulty) {
            return candidate.nonce;
        }
        candidate.nonce = candidate.nonce.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::GENESIS_HASH;

    #[test]
    fn mining_produces_leading_zeros() {
        let tx = Transaction::coinbase("addr".into(), 1);
        let block = BlockTemplate::new(2, GENESIS_HASH.into(), vec![tx], 2).solve();
        assert!(block.hash.starts_with("00"));
        assert_eq!(block.hash, block.compute_hash());
        assert!(block.meets_own_difficulty());
    }

    #[test]
    fn nonce_is_the_first_that_works() {
        let template = Block::new(2, GENESIS_HASH.into(), vec![], 1);
        let nonce = proof_of_work(&template, 1);
        for earlier in 0..nonce {
            let mut probe = template.clone();
            probe.nonce = earlier;
            assert!(!probe.compute_hash().starts_with('0'));
        }
    }

    #[test]
    fn difficulty_zero_accepts_nonce_zero() {
        let template = Block::new(2, GENESIS_HASH.into(), vec![], 0);
        assert_eq!(proof_of_work(&template, 0), 0);
    }

    #[test]
    fn template_fields_are_frozen() {
        let template = BlockTemplate::new(7, "ab".into(), vec![], 1);
        assert_eq!(template.index(), 7);
        assert_eq!(template.previous_hash(), "ab");
        assert_eq!(template.difficulty(), 1);
        let block = template.solve();
        assert_eq!(block.index, 7);
        assert_eq!(block.previous_hash, "ab");
    }
}
