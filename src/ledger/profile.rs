//! Connection profile
//!
//! Static JSON description of the network: organizations, their peers and the
//! TLS roots needed to reach them. Read on every connect, never cached.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::LedgerError;

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub organizations: BTreeMap<String, Organization>,
    #[serde(default)]
    pub peers: BTreeMap<String, Peer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    #[serde(rename = "mspid")]
    pub msp_id: String,
    #[serde(default)]
    pub peers: Vec<String>,
}

/// A peer entry. Only its TLS root is used: calls go through the gateway,
/// which reaches the peer itself.
#[derive(Debug, Clone, Deserialize)]
pub struct Peer {
    #[serde(default, rename = "tlsCACerts")]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

/// Peer TLS root, inline or by file
#[derive(Debug, Clone, Deserialize)]
pub struct TlsCaCerts {
    #[serde(default)]
    pub pem: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl ConnectionProfile {
    pub async fn load(path: &Path) -> Result<Self, LedgerError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            LedgerError::connection(
                &format!("failed to read connection profile {}", path.display()),
                e,
            )
        })?;
        Self::parse(&data).map_err(|e| {
            LedgerError::connection(
                &format!("invalid connection profile {}", path.display()),
                e,
            )
        })
    }

    pub fn parse(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }

    /// First peer of the organization owning `msp_id`, or the first peer in
    /// the profile when that organization lists none.
    pub fn peer_for_msp(&self, msp_id: &str) -> Option<(&str, &Peer)> {
        let org_peer = self
            .organizations
            .values()
            .filter(|org| org.msp_id == msp_id)
            .flat_map(|org| org.peers.iter())
            .find_map(|name| self.peers.get_key_value(name));

        org_peer
            .or_else(|| self.peers.iter().next())
            .map(|(name, peer)| (name.as_str(), peer))
    }
}

impl Peer {
    /// PEM-encoded TLS root for this peer, if any
    pub async fn tls_root_pem(&self) -> Result<Option<String>, LedgerError> {
        let Some(certs) = &self.tls_ca_certs else {
            return Ok(None);
        };
        if let Some(pem) = &certs.pem {
            return Ok(Some(pem.clone()));
        }
        match &certs.path {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map(Some)
                .map_err(|e| LedgerError::connection(&format!("failed to read TLS root {path}"), e)),
            None => Ok(None),
        }
    }
}
