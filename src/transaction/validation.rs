use std::collections::HashSet;

use crate::blockchain::Blockchain;
use crate::crypto::verify_signature;
use crate::error::ValidationError;

use super::model::{OutPoint, Transaction, TxIn};
use super::utxo::OutputLookup;

/// Resolve `tx_in` against the committed chain and check its signature.
/// Returns the amount of the referenced output.
///
/// Pending transactions are never consulted: an input may only spend an
/// output that is already in a block.
pub fn validate_input(chain: &Blockchain, tx_in: &TxIn) -> Result<u64, ValidationError> {
    let outpoint = tx_in.outpoint();
    let output = match chain.outputs().lookup(&outpoint) {
        OutputLookup::Missing => {
            return Err(ValidationError::ReferenceNotFound {
                tx_out_id: tx_in.tx_out_id.clone(),
            });
        }
        OutputLookup::OutOfRange { outputs } => {
            return Err(ValidationError::IndexOutOfRange {
                tx_out_id: tx_in.tx_out_id.clone(),
                index: tx_in.tx_out_index,
                outputs,
            });
        }
        OutputLookup::Spent => return Err(ValidationError::AlreadySpent(outpoint)),
        OutputLookup::Unspent(output) => output,
    };

    if !verify_signature(
        &output.address,
        &tx_in.signature.message,
        &tx_in.signature.signature_bytes,
    ) {
        return Err(ValidationError::BadSignature(outpoint));
    }
    Ok(output.amount)
}

/// Full admission check for a transaction against the committed chain.
pub fn validate_transaction(chain: &Blockchain, tx: &Transaction) -> Result<(), ValidationError> {
    let computed = tx.compute_id();
    if tx.id != computed {
        return Err(ValidationError::TxIdMismatch {
            claimed: tx.id.clone(),
            computed,
        });
    }
    if tx.tx_outs.is_empty() {
        return Err(ValidationError::EmptyOutputs);
    }
    if let Some(pos) = tx.tx_outs.iter().position(|o| o.amount == 0) {
        return Err(ValidationError::ZeroAmountOutput(pos));
    }
    if tx.is_coinbase() {
        return Ok(());
    }

    let mut seen = HashSet::<OutPoint>::new();
    for outpoint in tx.outpoints() {
        if !seen.insert(outpoint.clone()) {
            return Err(ValidationError::DuplicateInput(outpoint));
        }
    }

    let mut inputs: u128 = 0;
    for tx_in in &tx.tx_ins {
        inputs += validate_input(chain, tx_in)? as u128;
    }

    let outputs = tx.total_output_amount();
    if outputs > inputs {
        return Err(ValidationError::InsufficientInput { inputs, outputs });
    }
    if outputs < inputs {
        return Err(ValidationError::UnreturnedChange { inputs, outputs });
    }
    Ok(())
}
