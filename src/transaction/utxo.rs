use std::collections::HashMap;

use super::model::{OutPoint, Transaction, TxOut};

#[derive(Debug, Clone)]
struct IndexedOutputs {
    outputs: Vec<TxOut>,
    /// How many committed transactions carry this id. Identical coinbase
    /// transactions (same miner, same reward) collide on id.
    occurrences: u32,
}

/// Result of looking an outpoint up in the index.
#[derive(Debug, PartialEq, Eq)]
pub enum OutputLookup<'a> {
    Missing,
    OutOfRange { outputs: usize },
    Spent,
    Unspent(&'a TxOut),
}

/// Index of every output created by committed transactions, keyed by txid,
/// plus how many times each outpoint has been consumed.
/// Rebuilt from scratch whenever the chain is replaced.
#[derive(Debug, Default, Clone)]
pub struct OutputIndex {
    created: HashMap<String, IndexedOutputs>,
    spent: HashMap<OutPoint, u32>,
}

impl OutputIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over a whole sequence of transactions.
    pub fn from_transactions<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut index = Self::new();
        for tx in txs {
            index.apply_tx(tx);
        }
        index
    }

    /// Record a committed transaction: consume its inputs, add its outputs.
    pub fn apply_tx(&mut self, tx: &Transaction) {
        for outpoint in tx.outpoints() {
            *self.spent.entry(outpoint).or_insert(0) += 1;
        }
        self.created
            .entry(tx.id.clone())
            .and_modify(|entry| entry.occurrences += 1)
            .or_insert_with(|| IndexedOutputs {
                outputs: tx.tx_outs.clone(),
                occurrences: 1,
            });
    }

    pub fn lookup(&self, outpoint: &OutPoint) -> OutputLookup<'_> {
        let Some(entry) = self.created.get(&outpoint.txid) else {
            return OutputLookup::Missing;
        };
        let Some(output) = entry.outputs.get(outpoint.vout as usize) else {
            return OutputLookup::OutOfRange {
                outputs: entry.outputs.len(),
            };
        };
        if self.spent_count(outpoint) >= entry.occurrences {
            return OutputLookup::Spent;
        }
        OutputLookup::Unspent(output)
    }

    fn spent_count(&self, outpoint: &OutPoint) -> u32 {
        self.spent.get(outpoint).copied().unwrap_or(0)
    }

    /// Every spendable output, repeated once per unspent copy.
    pub fn iter_unspent(&self) -> impl Iterator<Item = (OutPoint, &TxOut)> {
        self.created.iter().flat_map(move |(txid, entry)| {
            entry.outputs.iter().enumerate().flat_map(move |(vout, out)| {
                let op = OutPoint {
                    txid: txid.clone(),
                    vout: vout as u32,
                };
                let left = entry.occurrences.saturating_sub(self.spent_count(&op));
                std::iter::repeat_n((op, out), left as usize)
            })
        })
    }

    /// Sum and count of the unspent outputs owned by `address`.
    pub fn balance_of(&self, address: &str) -> (u128, usize) {
        self.iter_unspent()
            .filter(|(_, out)| out.address == address)
            .fold((0u128, 0usize), |(sum, count), (_, out)| {
                (sum + out.amount as u128, count + 1)
            })
    }

    pub fn len(&self) -> usize {
        self.iter_unspent().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{InputSignature, TxIn};

    fn spend_of(txid: &str, vout: u32, to: &str, amount: u64) -> Transaction {
        Transaction::new(
            vec![TxIn {
                tx_out_id: txid.to_string(),
                tx_out_index: vout,
                signature: InputSignature {
                    message: vec![],
                    signature_bytes: vec![],
                },
            }],
            vec![TxOut {
                address: to.into(),
                amount,
            }],
        )
    }

    #[test]
    fn lookup_states() {
        let cb = Transaction::coinbase("alice".into(), 50);
        let mut index = OutputIndex::from_transactions([&cb]);
        let op = OutPoint { txid: cb.id.clone(), vout: 0 };

        assert_eq!(index.lookup(&op), OutputLookup::Unspent(&cb.tx_outs[0]));
        assert_eq!(
            index.lookup(&OutPoint { txid: cb.id.clone(), vout: 1 }),
            OutputLookup::OutOfRange { outputs: 1 }
        );
        assert_eq!(
            index.lookup(&OutPoint { txid: "nope".into(), vout: 0 }),
            OutputLookup::Missing
        );

        index.apply_tx(&spend_of(&cb.id, 0, "bob", 50));
        assert_eq!(index.lookup(&op), OutputLookup::Spent);
        assert_eq!(index.balance_of("alice"), (0, 0));
        assert_eq!(index.balance_of("bob"), (50, 1));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn identical_coinbases_are_each_spendable_once() {
        let cb = Transaction::coinbase("alice".into(), 50);
        let mut index = OutputIndex::from_transactions([&cb, &cb]);
        assert_eq!(index.balance_of("alice"), (100, 2));

        let op = OutPoint { txid: cb.id.clone(), vout: 0 };
        index.apply_tx(&spend_of(&cb.id, 0, "bob", 50));
        assert!(matches!(index.lookup(&op), OutputLookup::Unspent(_)));
        index.apply_tx(&spend_of(&cb.id, 0, "carol", 50));
        assert_eq!(index.lookup(&op), OutputLookup::Spent);
        assert_eq!(index.balance_of("alice"), (0, 0));
    }
}
