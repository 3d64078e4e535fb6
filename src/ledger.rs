//! The ledger engine: one chain, one transaction pool, one writer.
//!
//! `Ledger` itself is not synchronized. The node keeps it behind a mutex and
//! only releases the lock around the proof-of-work search, which is why
//! mining is split into [`Ledger::prepare_block`], [`BlockTemplate::solve`]
//! and [`Ledger::commit_block`].

use log::{debug, info, warn};

use crate::blockchain::{Block, Blockchain};
use crate::config::LedgerConfig;
use crate::consensus::{self, ChainSnapshot, PeerClient};
use crate::error::{ConfigError, ValidationError};
use crate::mempool::TransactionPool;
use crate::mining::BlockTemplate;
use crate::transaction::{Transaction, TxIn, TxOut, validate_input};
use crate::wallet::pubkey_to_address_hex;

#[derive(Debug)]
pub struct Ledger {
    chain: Blockchain,
    pool: TransactionPool,
    config: LedgerConfig,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            chain: Blockchain::new(config.genesis()),
            pool: TransactionPool::new(),
            config,
        })
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Difficulty the next block will be mined at.
    pub fn next_difficulty(&self) -> u32 {
        self.chain.next_difficulty(&self.config.retarget)
    }

    /// Admit `tx` to the pool. Returns the index of the block it is expected
    /// to land in.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<u64, ValidationError> {
        let txid = tx.id.clone();
        self.pool.submit(&self.chain, tx)?;
        let target = self.chain.last_block().index + 1;
        info!("LEDGER - txid={txid} pending for block #{target}");
        Ok(target)
    }

    /// Build a transaction spending `tx_ins`, appending a change output to
    /// `change_address` for whatever `tx_outs` leave over.
    pub fn spend_with_change(
        &self,
        tx_ins: Vec<TxIn>,
        mut tx_outs: Vec<TxOut>,
        change_address: &str,
    ) -> Result<Transaction, ValidationError> {
        let mut inputs: u128 = 0;
        for tx_in in &tx_ins {
            inputs += validate_input(&self.chain, tx_in)? as u128;
        }
        let outputs: u128 = tx_outs.iter().map(|o| o.amount as u128).sum();
        if outputs > inputs {
            return Err(ValidationError::InsufficientInput { inputs, outputs });
        }
        if outputs < inputs {
            let change = u64::try_from(inputs - outputs)
                .map_err(|_| ValidationError::AmountOverflow(inputs - outputs))?;
            tx_outs.push(TxOut {
                address: change_address.to_string(),
                amount: change,
            });
        }
        Ok(Transaction::new(tx_ins, tx_outs))
    }

    /// Freeze the next block: coinbase for `miner_address`, then every
    /// pending transaction. The pool is drained here, so a concurrent
    /// template never sees the same transactions.
    pub fn prepare_block(&mut self, miner_address: &str) -> Result<BlockTemplate, ValidationError> {
        let miner = pubkey_to_address_hex(miner_address.trim())
            .map_err(|_| ValidationError::InvalidMinerAddress(miner_address.to_string()))?;

        let mut transactions = vec![Transaction::coinbase(miner, self.config.block_reward)];
        transactions.extend(self.pool.drain());

        let last = self.chain.last_block();
        let difficulty = self.next_difficulty();
        debug!(
            "LEDGER - template for block #{} with {} txs at diff={}",
            last.index + 1,
            transactions.len(),
            difficulty
        );
        Ok(BlockTemplate::new(
            last.index + 1,
            last.hash.clone(),
            transactions,
            difficulty,
        ))
    }

    /// Append a solved block. If the chain moved on while it was being
    /// mined, the block is discarded and its transactions go back to the
    /// pool when still valid.
    pub fn commit_block(&mut self, block: Block) -> Result<&Block, ValidationError> {
        let included: Vec<Transaction> = block.transactions.iter().skip(1).cloned().collect();
        let (index, hash) = (block.index, block.hash.clone());

        match self.chain.append_block(block) {
            Ok(()) => {
                self.pool.settle(&included);
                info!(
                    "LEDGER - sealed block #{index} (hash={hash}, txs={})",
                    included.len() + 1
                );
                Ok(self.chain.last_block())
            }
            Err(e) => {
                warn!("LEDGER - discarded block #{index}: {e}");
                self.pool.requeue(&self.chain, included);
                Err(e)
            }
        }
    }

    /// Give up on a template that will never be committed: its transactions
    /// go back to the pool when still valid and their claims are released.
    pub fn abandon_block(&mut self, template: BlockTemplate) {
        let drafted: Vec<Transaction> = template.transactions().iter().skip(1).cloned().collect();
        warn!(
            "LEDGER - abandoned template for block #{}, requeueing {} txs",
            template.index(),
            drafted.len()
        );
        self.pool.requeue(&self.chain, drafted);
    }

    /// Prepare, solve and commit in one go, holding `&mut self` throughout.
    pub fn mine(&mut self, miner_address: &str) -> Result<Block, ValidationError> {
        let template = self.prepare_block(miner_address)?;
        let block = template.solve();
        self.commit_block(block).cloned()
    }

    pub fn chain_snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::of(&self.chain)
    }

    /// Replace the chain with the longest valid candidate strictly longer
    /// than ours. Pending transactions the new chain invalidates are dropped.
    pub fn adopt_longest(&mut self, candidates: Vec<ChainSnapshot>) -> bool {
        let Some(blocks) =
            consensus::select_longest(self.chain.len(), self.chain.genesis(), candidates)
        else {
            return false;
        };
        if !self.chain.replace(blocks) {
            return false;
        }
        info!("LEDGER - adopted peer chain, new height {}", self.chain.len());
        self.pool.prune(&self.chain);
        true
    }

    /// Poll `peers` through `client` and adopt the longest valid chain.
    pub fn resolve(&mut self, peers: &[String], client: &dyn PeerClient) -> (bool, ChainSnapshot) {
        let replaced = consensus::resolve_conflicts(&mut self.chain, peers, client);
        if replaced {
            self.pool.prune(&self.chain);
        }
        (replaced, self.chain_snapshot())
    }
}
