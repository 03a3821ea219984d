//! File-system wallet
//!
//! Identities are stored one per file as `<wallet>/<label>.id`, each holding
//! the X.509 certificate and private key used to sign ledger requests.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::LedgerError;

/// Signing identity stored in the wallet
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "type", default = "default_identity_type")]
    pub kind: String,
    pub msp_id: String,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub certificate: String,
    pub private_key: String,
}

fn default_identity_type() -> String {
    "X.509".to_string()
}

/// Directory-backed identity store keyed by label
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Look up an identity. `Ok(None)` when the label has no entry.
    pub async fn get(&self, label: &str) -> Result<Option<Identity>, LedgerError> {
        let Some(path) = self.identity_path(label) else {
            return Ok(None);
        };

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LedgerError::connection(
                    &format!("failed to read identity {}", path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&data).map(Some).map_err(|e| {
            LedgerError::connection(&format!("invalid identity file {}", path.display()), e)
        })
    }

    /// Labels are plain file stems; anything that could escape the wallet
    /// directory has no entry.
    fn identity_path(&self, label: &str) -> Option<PathBuf> {
        if label.is_empty()
            || label == "."
            || label == ".."
            || label.contains(['/', '\\', '\0'])
        {
            return None;
        }
        Some(self.dir.join(format!("{label}.id")))
    }
}
