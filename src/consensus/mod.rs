//! Longest-valid-chain conflict resolution.

pub mod client;
pub mod peers;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Blockchain};

pub use client::{HttpPeerClient, PeerClient, PeerError};
pub use peers::PeerRegistry;

/// Path under which every node serves its chain to peers.
pub const CHAIN_PATH: &str = "/api/v1/chain/";

/// A node's chain as exchanged between peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl ChainSnapshot {
    pub fn of(chain: &Blockchain) -> Self {
        Self {
            length: chain.len(),
            chain: chain.blocks().to_vec(),
        }
    }
}

/// Ask every peer for its chain, one at a time. Failing peers are logged
/// and left out; so are peers whose reported length disagrees with the
/// chain they sent.
pub fn fetch_candidates(peers: &[String], client: &dyn PeerClient) -> Vec<ChainSnapshot> {
    let mut candidates = Vec::with_capacity(peers.len());
    for peer in peers {
        match client.fetch_chain(peer) {
            Ok(snapshot) if snapshot.length != snapshot.chain.len() => {
                warn!(
                    "CONSENSUS - peer {peer} reported length {} but sent {} blocks; skipped",
                    snapshot.length,
                    snapshot.chain.len()
                );
            }
            Ok(snapshot) => candidates.push(snapshot),
            Err(e) => warn!("CONSENSUS - skipping peer: {e}"),
        }
    }
    candidates
}

/// Longest candidate that is both strictly longer than `local_len` and a
/// valid chain from `genesis`.
pub fn select_longest(
    local_len: usize,
    genesis: &Block,
    candidates: Vec<ChainSnapshot>,
) -> Option<Vec<Block>> {
    let mut max_length = local_len;
    let mut best = None;
    for candidate in candidates {
        if candidate.length > max_length && Blockchain::is_valid_chain(genesis, &candidate.chain) {
            max_length = candidate.length;
            best = Some(candidate.chain);
        }
    }
    best
}

/// Replace `chain` with the longest valid chain any peer holds, if that is
/// longer than ours. Returns whether the chain was replaced.
pub fn resolve_conflicts(chain: &mut Blockchain, peers: &[String], client: &dyn PeerClient) -> bool {
    let candidates = fetch_candidates(peers, client);
    match select_longest(chain.len(), chain.genesis(), candidates) {
        Some(blocks) => {
            let replaced = chain.replace(blocks);
            if replaced {
                info!("CONSENSUS - chain replaced, new height {}", chain.len());
            }
            replaced
        }
        None => false,
    }
}
