//! Ledger access module
//!
//! Everything the HTTP layer needs to talk to the asset contract:
//! - `Connector` / `Contract` traits, the seam between the API and a ledger backend
//! - Scoped sessions with an optional per-role idle pool
//! - The HTTP gateway backend (connection profile + file-system wallet)
//! - An in-process development ledger

mod error;
mod gateway;
mod memory;
mod profile;
mod session;
mod wallet;

#[cfg(test)]
pub mod testing;

pub use error::LedgerError;
pub use gateway::{GatewayConnector, GatewaySettings};
pub use memory::MemoryLedger;
pub use session::SessionPool;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::{LedgerBackend, LedgerConfig};

/// How a contract function is executed by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Ordered and committed write transaction
    Submit,
    /// Read-only query against peer state
    Evaluate,
}

impl TransactionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named operations exposed by the asset contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateAsset,
    ReadAsset,
    UpdateAsset,
    DeleteAsset,
    GetAllAssets,
    GetMyAssets,
}

impl Operation {
    /// Function name as registered in the contract
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateAsset => "CreateAsset",
            Self::ReadAsset => "ReadAsset",
            Self::UpdateAsset => "UpdateAsset",
            Self::DeleteAsset => "DeleteAsset",
            Self::GetAllAssets => "GetAllAssets",
            Self::GetMyAssets => "GetMyAssets",
        }
    }

    /// Writes go through ordering, reads are evaluated locally on a peer
    pub const fn kind(self) -> TransactionKind {
        match self {
            Self::CreateAsset | Self::UpdateAsset | Self::DeleteAsset => TransactionKind::Submit,
            Self::ReadAsset | Self::GetAllAssets | Self::GetMyAssets => TransactionKind::Evaluate,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved contract on a channel, backed by one network connection
#[async_trait]
pub trait Contract: Send + Sync {
    /// Submit a transaction for endorsement, ordering and commit
    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;

    /// Evaluate a query without touching the ledger
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;

    /// Close the underlying connection. Must be idempotent.
    fn disconnect(&mut self);
}

/// Opens connections to the ledger on behalf of a role
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, role: &str) -> Result<Box<dyn Contract>, LedgerError>;
}

/// Build the connector selected by `ledger.backend`
pub fn build_connector(config: &LedgerConfig) -> Result<Arc<dyn Connector>, LedgerError> {
    Ok(match config.backend {
        LedgerBackend::Gateway => {
            Arc::new(GatewayConnector::new(GatewaySettings::from_config(config)?))
        }
        LedgerBackend::Memory => Arc::new(MemoryLedger::new(&config.memory_identities)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_are_submitted() {
        assert_eq!(Operation::CreateAsset.kind(), TransactionKind::Submit);
        assert_eq!(Operation::UpdateAsset.kind(), TransactionKind::Submit);
        assert_eq!(Operation::DeleteAsset.kind(), TransactionKind::Submit);
    }

    #[test]
    fn test_reads_are_evaluated() {
        assert_eq!(Operation::ReadAsset.kind(), TransactionKind::Evaluate);
        assert_eq!(Operation::GetAllAssets.kind(), TransactionKind::Evaluate);
        assert_eq!(Operation::GetMyAssets.kind(), TransactionKind::Evaluate);
    }

    #[test]
    fn test_gateway_backend_needs_url() {
        let mut config = crate::config::Config::load_from("does-not-exist/config")
            .unwrap()
            .ledger;
        assert_eq!(config.backend, LedgerBackend::Gateway);
        assert!(build_connector(&config).is_err());

        config.gateway_url = Some("https://localhost:8443".to_string());
        assert!(build_connector(&config).is_ok());

        config.gateway_url = None;
        config.backend = LedgerBackend::Memory;
        assert!(build_connector(&config).is_ok());
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::GetMyAssets.to_string(), "GetMyAssets");
        assert_eq!(Operation::CreateAsset.name(), "CreateAsset");
    }
}
