//! Scoped ledger sessions
//!
//! A `Session` owns one contract connection for the duration of a request.
//! Dropping it hands the connection back to the `SessionPool`, which either
//! parks it for the next request of the same role or disconnects it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Connector, Contract, LedgerError, Operation, TransactionKind};

type IdleMap = HashMap<String, Vec<Box<dyn Contract>>>;

/// Per-role connection provisioner
pub struct SessionPool {
    connector: Arc<dyn Connector>,
    max_idle_per_role: usize,
    idle: Mutex<IdleMap>,
}

impl SessionPool {
    /// `max_idle_per_role == 0` disables reuse: every session connects fresh
    /// and disconnects on release.
    pub fn new(connector: Arc<dyn Connector>, max_idle_per_role: usize) -> Self {
        Self {
            connector,
            max_idle_per_role,
            idle: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire a session authenticated as `role`
    pub async fn acquire(self: &Arc<Self>, role: &str) -> Result<Session, LedgerError> {
        let contract = match self.take_idle(role) {
            Some(contract) => contract,
            None => self.connector.connect(role).await?,
        };

        Ok(Session {
            role: role.to_string(),
            contract: Some(contract),
            reusable: true,
            pool: Arc::clone(self),
        })
    }

    /// Number of parked connections for `role`
    #[cfg(test)]
    pub fn idle_count(&self, role: &str) -> usize {
        self.lock_idle().get(role).map_or(0, Vec::len)
    }

    fn take_idle(&self, role: &str) -> Option<Box<dyn Contract>> {
        if self.max_idle_per_role == 0 {
            return None;
        }
        self.lock_idle().get_mut(role).and_then(Vec::pop)
    }

    fn release(&self, role: String, mut contract: Box<dyn Contract>, reusable: bool) {
        if reusable && self.max_idle_per_role > 0 {
            let mut idle = self.lock_idle();
            let slot = idle.entry(role).or_default();
            if slot.len() < self.max_idle_per_role {
                slot.push(contract);
                return;
            }
        }
        contract.disconnect();
    }

    fn lock_idle(&self) -> MutexGuard<'_, IdleMap> {
        // A panic while holding the lock leaves the map itself intact
        self.idle
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// A contract handle bound to one request
pub struct Session {
    role: String,
    contract: Option<Box<dyn Contract>>,
    reusable: bool,
    pool: Arc<SessionPool>,
}

impl Session {
    /// Run `operation`, submitting or evaluating according to its kind
    pub async fn invoke(
        &mut self,
        operation: Operation,
        args: &[String],
    ) -> Result<Vec<u8>, LedgerError> {
        let contract = self
            .contract
            .as_ref()
            .ok_or_else(|| LedgerError::Connection("session already released".to_string()))?;

        let result = match operation.kind() {
            TransactionKind::Submit => contract.submit(operation.name(), args).await,
            TransactionKind::Evaluate => contract.evaluate(operation.name(), args).await,
        };

        if let Err(ref err) = result {
            if err.is_connection_failure() {
                self.reusable = false;
            }
        }
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(contract) = self.contract.take() {
            self.pool
                .release(std::mem::take(&mut self.role), contract, self.reusable);
        }
    }
}
