//! Recording ledger double for unit tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Connector, Contract, LedgerError, TransactionKind};

/// One contract call as seen by the double
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub role: String,
    pub kind: TransactionKind,
    pub function: String,
    pub args: Vec<String>,
}

type Responses = HashMap<String, Result<Vec<u8>, LedgerError>>;

/// Connector that records every call and answers with scripted results.
/// Functions without a scripted result return an empty payload.
#[derive(Default)]
pub struct RecordingConnector {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responses: Responses,
    missing_roles: HashSet<String>,
    connects: AtomicUsize,
    disconnects: Arc<AtomicUsize>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, function: &str, result: Result<Vec<u8>, LedgerError>) -> Self {
        self.responses.insert(function.to_string(), result);
        self
    }

    pub fn respond_json(self, function: &str, payload: &serde_json::Value) -> Self {
        self.respond(function, Ok(payload.to_string().into_bytes()))
    }

    pub fn without_identity(mut self, role: &str) -> Self {
        self.missing_roles.insert(role.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn connect(&self, role: &str) -> Result<Box<dyn Contract>, LedgerError> {
        if self.missing_roles.contains(role) {
            return Err(LedgerError::IdentityNotFound {
                role: role.to_string(),
            });
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingContract {
            role: role.to_string(),
            calls: Arc::clone(&self.calls),
            responses: self.responses.clone(),
            disconnects: Arc::clone(&self.disconnects),
            connected: true,
        }))
    }
}

struct RecordingContract {
    role: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responses: Responses,
    disconnects: Arc<AtomicUsize>,
    connected: bool,
}

impl RecordingContract {
    fn record(
        &self,
        kind: TransactionKind,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, LedgerError> {
        self.calls.lock().unwrap().push(RecordedCall {
            role: self.role.clone(),
            kind,
            function: function.to_string(),
            args: args.to_vec(),
        });
        self.responses
            .get(function)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl Contract for RecordingContract {
    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.record(TransactionKind::Submit, function, args)
    }

    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.record(TransactionKind::Evaluate, function, args)
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }
}
