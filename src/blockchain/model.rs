use log::{debug, warn};

use super::{Block, RetargetParams, next_difficulty};
use crate::error::ValidationError;
use crate::transaction::OutputIndex;

/// In-memory, append-only chain of blocks plus an index of the outputs its
/// transactions created and spent.
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    genesis: Block,
    outputs: OutputIndex,
}

impl Blockchain {
    /// Initialize a new blockchain holding only `genesis`.
    pub fn new(genesis: Block) -> Self {
        Self {
            chain: vec![genesis.clone()],
            genesis,
            outputs: OutputIndex::new(),
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn genesis(&self) -> &Block {
        &self.genesis
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn outputs(&self) -> &OutputIndex {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Difficulty the next mined block must carry.
    pub fn next_difficulty(&self, params: &RetargetParams) -> u32 {
        next_difficulty(&self.chain, params)
    }

    /// Structural checks of `candidate` as the successor of `prev`:
    /// linkage, index continuity, proof-of-work, then hash integrity.
    pub fn check_successor(prev: &Block, candidate: &Block) -> Result<(), ValidationError> {
        if candidate.previous_hash != prev.hash {
            return Err(ValidationError::BrokenLink {
                previous_hash: candidate.previous_hash.clone(),
                tip: prev.hash.clone(),
            });
        }
        if candidate.index != prev.index + 1 {
            return Err(ValidationError::UnexpectedIndex {
                expected_after: prev.index,
                found: candidate.index,
            });
        }
        if !candidate.meets_own_difficulty() {
            return Err(ValidationError::BadProofOfWork {
                hash: candidate.hash.clone(),
                difficulty: candidate.difficulty,
            });
        }
        let computed = candidate.compute_hash();
        if computed != candidate.hash {
            return Err(ValidationError::HashMismatch {
                stored: candidate.hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Append a mined block after checking it against the current tip.
    pub fn append_block(&mut self, candidate: Block) -> Result<(), ValidationError> {
        Self::check_successor(self.last_block(), &candidate)?;
        for tx in &candidate.transactions {
            self.outputs.apply_tx(tx);
        }
        debug!(
            "CHAIN - appended block #{} ({} txs, diff={})",
            candidate.index,
            candidate.transactions.len(),
            candidate.difficulty
        );
        self.chain.push(candidate);
        Ok(())
    }

    /// A chain is valid when it starts with exactly `genesis` and every
    /// following block passes [`Blockchain::check_successor`].
    ///
    /// Transaction signatures and amounts inside the blocks are not
    /// re-audited: trust in foreign chains rests on proof-of-work.
    /// Proof-of-work is checked against each block's own `difficulty`, not
    /// against what the retarget schedule would have asked for, so a chain
    /// mined at difficulty 0 is structurally valid.
    pub fn is_valid_chain(genesis: &Block, blocks: &[Block]) -> bool {
        match blocks.first() {
            Some(first) if first == genesis => {}
            _ => return false,
        }
        blocks.windows(2).all(|pair| {
            match Self::check_successor(&pair[0], &pair[1]) {
                Ok(()) => true,
                Err(e) => {
                    debug!("CHAIN - rejected at block #{}: {}", pair[1].index, e);
                    false
                }
            }
        })
    }

    /// Validate this chain from genesis to tip.
    pub fn is_valid(&self) -> bool {
        Self::is_valid_chain(&self.genesis, &self.chain)
    }

    /// Swap in `blocks` wholesale if they form a valid chain from our
    /// genesis. The output index is rebuilt from the new blocks.
    pub fn replace(&mut self, blocks: Vec<Block>) -> bool {
        if !Self::is_valid_chain(&self.genesis, &blocks) {
            warn!("CHAIN - refusing replacement with an invalid chain");
            return false;
        }
        self.outputs = OutputIndex::from_transactions(blocks.iter().flat_map(|b| &b.transactions));
        self.chain = blocks;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ZERO_HASH;
    use crate::mining::BlockTemplate;
    use crate::testing::grown_chain;
    use crate::transaction::Transaction;

    fn mined_successor(chain: &Blockchain, difficulty: u32) -> Block {
        let last = chain.last_block();
        BlockTemplate::new(
            last.index + 1,
            last.hash.clone(),
            vec![Transaction::coinbase("02aa".into(), 50)],
            difficulty,
        )
        .solve()
    }

    fn grown(len: usize) -> Blockchain {
        grown_chain(len, "02aa")
    }

    #[test]
    fn appended_blocks_link_and_carry_pow() {
        let chain = grown(5);
        assert_eq!(chain.len(), 5);
        for pair in chain.blocks().windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash);
            assert!(pair[1].hash.starts_with('0'));
            assert_eq!(pair[1].hash, pair[1].compute_hash());
        }
        assert!(chain.is_valid());
        assert_eq!(chain.outputs().balance_of("02aa"), (200, 4));
    }

    #[test]
    fn broken_link_rejected() {
        let mut chain = grown(2);
        let mut block = mined_successor(&chain, 1);
        block.previous_hash = ZERO_HASH.into();
        assert!(matches!(
            chain.append_block(block),
            Err(ValidationError::BrokenLink { .. })
        ));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn bad_pow_rejected() {
        let mut chain = grown(2);
        let mut block = mined_successor(&chain, 1);
        block.difficulty = 64;
        assert!(matches!(
            chain.append_block(block),
            Err(ValidationError::BadProofOfWork { difficulty: 64, .. })
        ));
    }

    #[test]
    fn tampered_content_rejected() {
        let mut chain = grown(2);
        let mut block = mined_successor(&chain, 1);
        block.transactions[0].tx_outs[0].amount = 5_000;
        assert!(matches!(
            chain.append_block(block),
            Err(ValidationError::HashMismatch { .. })
        ));
    }

    #[test]
    fn skipped_index_rejected() {
        let mut chain = grown(2);
        let last = chain.last_block();
        let block = BlockTemplate::new(last.index + 2, last.hash.clone(), vec![], 1).solve();
        assert!(matches!(
            chain.append_block(block),
            Err(ValidationError::UnexpectedIndex { found: 4, .. })
        ));
    }

    #[test]
    fn foreign_genesis_makes_chain_invalid() {
        let chain = grown(3);
        let mut blocks = chain.blocks().to_vec();
        blocks[0].timestamp = 42;
        assert!(!Blockchain::is_valid_chain(chain.genesis(), &blocks));
        assert!(!Blockchain::is_valid_chain(chain.genesis(), &[]));
    }

    #[test]
    fn declared_difficulty_is_taken_at_face_value() {
        let chain = grown(1);
        let mut blocks = chain.blocks().to_vec();
        for index in 2..5 {
            let last = blocks.last().unwrap();
            let easy = BlockTemplate::new(index, last.hash.clone(), vec![], 0).solve();
            blocks.push(easy);
        }
        assert!(Blockchain::is_valid_chain(chain.genesis(), &blocks));
    }

    #[test]
    fn replace_rebuilds_index_and_refuses_invalid() {
        let mut local = grown(2);
        let longer = grown(4);

        let mut broken = longer.blocks().to_vec();
        broken[2].nonce += 1;
        assert!(!local.replace(broken));
        assert_eq!(local.len(), 2);

        assert!(local.replace(longer.blocks().to_vec()));
        assert_eq!(local.len(), 4);
        assert_eq!(local.outputs().balance_of("02aa"), (150, 3));
    }
}
