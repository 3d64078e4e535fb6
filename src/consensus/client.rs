use std::time::Duration;

use thiserror::Error;

use super::{CHAIN_PATH, ChainSnapshot};

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("cannot build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("peer {peer} unreachable: {source}")]
    Unreachable {
        peer: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} sent a malformed chain: {reason}")]
    Malformed { peer: String, reason: String },
}

/// Source of peer chains. The node uses HTTP; tests substitute fakes.
pub trait PeerClient {
    fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, PeerError>;
}

/// Blocking HTTP client with a per-request timeout.
///
/// Build and drop it off the async runtime (inside `web::block`): the
/// blocking client owns its own runtime.
pub struct HttpPeerClient {
    client: reqwest::blocking::Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, PeerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PeerError::Client)?;
        Ok(Self { client })
    }
}

impl PeerClient for HttpPeerClient {
    fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, PeerError> {
        let url = format!("http://{peer}{CHAIN_PATH}");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| PeerError::Unreachable {
                peer: peer.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::Status {
                peer: peer.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<ChainSnapshot>()
            .map_err(|e| PeerError::Malformed {
                peer: peer.to_string(),
                reason: e.to_string(),
            })
    }
}
