use std::collections::HashSet;

use log::{debug, warn};

use crate::blockchain::Blockchain;
use crate::error::ValidationError;
use crate::transaction::{OutPoint, Transaction, validate_transaction};

/// FIFO buffer of validated, not yet mined transactions.
///
/// Every outpoint spent by a pending transaction, or by a transaction
/// drained into a block that is still being mined, is claimed. A claim is
/// released when that block is committed (`settle`) or discarded
/// (`requeue`).
#[derive(Debug, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
    claimed: HashSet<OutPoint>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `tx` against the committed chain and queue it.
    pub fn submit(&mut self, chain: &Blockchain, tx: Transaction) -> Result<(), ValidationError> {
        if tx.is_coinbase() {
            return Err(ValidationError::UnexpectedCoinbase);
        }
        validate_transaction(chain, &tx)?;
        if let Some(conflict) = tx.outpoints().find(|op| self.claimed.contains(op)) {
            return Err(ValidationError::DoubleSpendInPool(conflict));
        }

        self.claimed.extend(tx.outpoints());
        debug!(
            "POOL - queued txid={} (size: {} -> {})",
            tx.id,
            self.pending.len(),
            self.pending.len() + 1
        );
        self.pending.push(tx);
        Ok(())
    }

    /// Take every pending transaction, leaving the buffer empty. Their claims
    /// stay in place until the block they go into is settled or requeued.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    /// Release the claims of transactions that made it into a block.
    pub fn settle(&mut self, txs: &[Transaction]) {
        for tx in txs {
            for op in tx.outpoints() {
                self.claimed.remove(&op);
            }
        }
    }

    /// Put back transactions from a discarded block, keeping only those
    /// still valid against `chain`.
    pub fn requeue(&mut self, chain: &Blockchain, txs: Vec<Transaction>) {
        self.settle(&txs);
        for tx in txs {
            let txid = tx.id.clone();
            if let Err(e) = self.submit(chain, tx) {
                warn!("POOL - dropped txid={txid}: {e}");
            }
        }
    }

    /// Re-validate pending transactions after the chain was replaced.
    pub fn prune(&mut self, chain: &Blockchain) {
        let pending = self.drain();
        self.requeue(chain, pending);
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Funded, funded_chain, signed_input};
    use crate::transaction::TxOut;
    use crate::wallet::generate_keypair_hex;

    fn pay(f: &Funded, to: &str, amount: u64) -> Transaction {
        let mut outs = vec![TxOut { address: to.to_string(), amount }];
        if amount < 50 {
            outs.push(TxOut { address: f.alice.address.clone(), amount: 50 - amount });
        }
        Transaction::new(vec![signed_input(&f.alice.secret, &f.coinbase.id, 0)], outs)
    }

    #[test]
    fn second_spend_of_same_output_is_rejected() {
        let funded = funded_chain(50);
        let (_, _, bob) = generate_keypair_hex();
        let (_, _, carol) = generate_keypair_hex();
        let mut pool = TransactionPool::new();

        pool.submit(&funded.chain, pay(&funded, &bob, 50)).unwrap();
        let err = pool.submit(&funded.chain, pay(&funded, &carol, 50)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DoubleSpendInPool(OutPoint { txid: funded.coinbase.id.clone(), vout: 0 })
        );
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn invalid_transactions_never_enter() {
        let funded = funded_chain(50);
        let mut pool = TransactionPool::new();
        let coinbase = Transaction::coinbase(funded.alice.address.clone(), 50);
        assert_eq!(pool.submit(&funded.chain, coinbase), Err(ValidationError::UnexpectedCoinbase));
        assert!(pool.submit(&funded.chain, pay(&funded, "02bb", 60)).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn drain_empties_but_keeps_claims_until_settled() {
        let funded = funded_chain(50);
        let (_, _, bob) = generate_keypair_hex();
        let mut pool = TransactionPool::new();
        pool.submit(&funded.chain, pay(&funded, &bob, 20)).unwrap();

        let drained = pool.drain();
        assert_eq!(drained.len(), 1);
        assert!(pool.is_empty());
        assert!(pool.drain().is_empty());

        // Block still being mined: the output stays claimed.
        assert!(matches!(
            pool.submit(&funded.chain, pay(&funded, &bob, 50)),
            Err(ValidationError::DoubleSpendInPool(_))
        ));

        pool.requeue(&funded.chain, drained);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.pending()[0].tx_outs[0].amount, 20);
    }
}
