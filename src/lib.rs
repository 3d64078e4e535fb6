pub mod api;
pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod mempool;
pub mod mining;
pub mod transaction;
pub mod wallet;

#[cfg(test)]
mod testing;
