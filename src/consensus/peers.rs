use std::collections::BTreeSet;

use reqwest::Url;

use crate::error::ValidationError;

/// Flat set of peer addresses in `host[:port]` form.
#[derive(Debug, Default, Clone)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce `http://host:port/` or bare `host:port` to `host:port`.
    pub fn normalize(raw: &str) -> Result<String, ValidationError> {
        let invalid = || ValidationError::InvalidAddress(raw.to_string());
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid());
        }

        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };
        let url = Url::parse(&candidate).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https")
            || !matches!(url.path(), "" | "/")
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(invalid());
        }
        let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;

        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    /// Add a peer. Registering the same peer twice is a no-op.
    pub fn register(&mut self, raw: &str) -> Result<(), ValidationError> {
        let peer = Self::normalize(raw)?;
        self.peers.insert(peer);
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
