//! Node and ledger configuration, read from the environment (and `.env`).

use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{BASE_REWARD, Block, DEFAULT_DIFFICULTY, GENESIS_HASH, RetargetParams};
use crate::consensus::PeerRegistry;
use crate::crypto::ZERO_HASH;
use crate::error::ConfigError;
use crate::wallet::pubkey_to_address_hex;

/// Everything that must be identical across nodes for their chains to be
/// comparable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub initial_difficulty: u32,
    pub block_reward: u64,
    pub retarget: RetargetParams,
    pub genesis_hash: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_difficulty: DEFAULT_DIFFICULTY,
            block_reward: BASE_REWARD,
            retarget: RetargetParams::default(),
            genesis_hash: GENESIS_HASH.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn genesis(&self) -> Block {
        Block::genesis_with_hash(self.initial_difficulty, self.genesis_hash.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let hash = &self.genesis_hash;
        if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::MalformedGenesis(format!(
                "hash must be 64 hex digits, got {hash:?}"
            )));
        }
        if hash == ZERO_HASH {
            return Err(ConfigError::MalformedGenesis(
                "hash must differ from the zero-hash sentinel".into(),
            ));
        }
        if self.initial_difficulty > 64 {
            return Err(ConfigError::MalformedGenesis(format!(
                "difficulty {} exceeds the 64 hex digits of a hash",
                self.initial_difficulty
            )));
        }
        if self.block_reward == 0 {
            return Err(ConfigError::MalformedGenesis("block reward must be positive".into()));
        }
        if self.retarget.block_generation_interval == 0 {
            return Err(ConfigError::ZeroInterval("BLOCK_GENERATION_INTERVAL"));
        }
        if self.retarget.difficulty_adjustment_interval == 0 {
            return Err(ConfigError::ZeroInterval("DIFFICULTY_ADJUSTMENT_INTERVAL"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Default beneficiary of mined blocks when a request names none.
    pub miner_address: Option<String>,
    /// Bootstrap peers, normalized to `host[:port]`.
    pub peers: Vec<String>,
    pub peer_timeout: Duration,
    pub ledger: LedgerConfig,
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = LedgerConfig::default();
        let ledger = LedgerConfig {
            initial_difficulty: parse_or(&lookup, "INITIAL_DIFFICULTY", defaults.initial_difficulty)?,
            block_reward: parse_or(&lookup, "BLOCK_REWARD", defaults.block_reward)?,
            retarget: RetargetParams {
                block_generation_interval: parse_or(
                    &lookup,
                    "BLOCK_GENERATION_INTERVAL",
                    defaults.retarget.block_generation_interval,
                )?,
                difficulty_adjustment_interval: parse_or(
                    &lookup,
                    "DIFFICULTY_ADJUSTMENT_INTERVAL",
                    defaults.retarget.difficulty_adjustment_interval,
                )?,
            },
            genesis_hash: lookup("GENESIS_HASH").unwrap_or(defaults.genesis_hash),
        };
        ledger.validate()?;

        let miner_address = match lookup("MINER_ADDRESS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                pubkey_to_address_hex(raw.trim())
                    .map_err(|e| ConfigError::InvalidIdentity(format!("MINER_ADDRESS: {e}")))?,
            ),
            None => None,
        };

        let mut peers = Vec::new();
        for raw in lookup("PEERS").unwrap_or_default().split(',') {
            let raw = raw.trim();
            if !raw.is_empty() {
                peers.push(PeerRegistry::normalize(raw)?);
            }
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            miner_address,
            peers,
            peer_timeout: Duration::from_secs(parse_or(&lookup, "PEER_TIMEOUT_SECS", 5)?),
            ledger,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Unparsable {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.peer_timeout, Duration::from_secs(5));
        assert_eq!(config.ledger, LedgerConfig::default());
        assert_eq!(config.ledger.genesis().difficulty, 4);
        assert!(config.miner_address.is_none());
        assert!(config.peers.is_empty());
    }

    #[test]
    fn reads_overrides_and_normalizes_peers() {
        let config = from_map(&[
            ("PORT", "5001"),
            ("INITIAL_DIFFICULTY", "2"),
            ("PEERS", "http://10.0.0.2:5000, 10.0.0.3:5000,"),
        ])
        .unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.ledger.initial_difficulty, 2);
        assert_eq!(config.peers, vec!["10.0.0.2:5000", "10.0.0.3:5000"]);
    }

    #[test]
    fn fatal_misconfigurations() {
        assert!(matches!(
            from_map(&[("PORT", "eighty")]),
            Err(ConfigError::Unparsable { .. })
        ));
        assert!(matches!(
            from_map(&[("GENESIS_HASH", "1")]),
            Err(ConfigError::MalformedGenesis(_))
        ));
        assert!(matches!(
            from_map(&[("BLOCK_GENERATION_INTERVAL", "0")]),
            Err(ConfigError::ZeroInterval(_))
        ));
        assert!(matches!(
            from_map(&[("MINER_ADDRESS", "not-a-key")]),
            Err(ConfigError::InvalidIdentity(_))
        ));
        assert!(matches!(
            from_map(&[("PEERS", "http://")]),
            Err(ConfigError::InvalidPeer(_))
        ));
    }
}
