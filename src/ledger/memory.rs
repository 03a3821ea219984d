//! In-process development ledger
//!
//! Applies the asset contract's rules to a process-local map so the API can be
//! run without a network. Submits commit to the shared map; evaluates run
//! against a scratch copy and never persist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use super::{Connector, Contract, LedgerError};

type Store = BTreeMap<String, StoredAsset>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct StoredAsset {
    #[serde(rename = "ID")]
    id: String,
    owner: String,
    value: i64,
    #[serde(rename = "createdBy")]
    created_by: String,
}

pub struct MemoryLedger {
    identities: HashSet<String>,
    store: Arc<Mutex<Store>>,
}

impl MemoryLedger {
    /// Every identity's role attribute and client id is its own name
    pub fn new(identities: &[String]) -> Self {
        Self {
            identities: identities.iter().cloned().collect(),
            store: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

#[async_trait]
impl Connector for MemoryLedger {
    async fn connect(&self, role: &str) -> Result<Box<dyn Contract>, LedgerError> {
        if !self.identities.contains(role) {
            return Err(LedgerError::IdentityNotFound {
                role: role.to_string(),
            });
        }
        Ok(Box::new(MemoryContract {
            client_id: role.to_string(),
            store: Some(Arc::clone(&self.store)),
        }))
    }
}

struct MemoryContract {
    client_id: String,
    store: Option<Arc<Mutex<Store>>>,
}

impl MemoryContract {
    fn execute(&self, function: &str, args: &[String], commit: bool) -> Result<Vec<u8>, LedgerError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| LedgerError::Connection("memory ledger session is closed".to_string()))?;
        let mut shared = store.lock().unwrap_or_else(PoisonError::into_inner);

        let result = if commit {
            self.apply(&mut shared, function, args)
        } else {
            let mut scratch = shared.clone();
            drop(shared);
            self.apply(&mut scratch, function, args)
        };
        result.map_err(LedgerError::from_remote_message)
    }

    fn role(&self) -> &str {
        &self.client_id
    }

    fn apply(&self, store: &mut Store, function: &str, args: &[String]) -> Result<Vec<u8>, String> {
        match function {
            "CreateAsset" => {
                let [id, owner, value] = expect_args::<3>(args)?;
                let value = parse_int(value, 2)?;
                self.require_role("admin", "only admin can create assets")?;
                if store.contains_key(id) {
                    return Err(format!("the asset {id} already exists"));
                }
                store.insert(
                    id.clone(),
                    StoredAsset {
                        id: id.clone(),
                        owner: owner.clone(),
                        value,
                        created_by: self.client_id.clone(),
                    },
                );
                Ok(Vec::new())
            }
            "ReadAsset" => {
                let [id] = expect_args::<1>(args)?;
                let asset = store
                    .get(id)
                    .ok_or_else(|| format!("the asset {id} does not exist"))?;
                if self.role() == "user" && asset.owner != self.client_id {
                    return Err("access denied: you can only view your own assets".to_string());
                }
                to_payload(asset)
            }
            "UpdateAsset" => {
                let [id, value] = expect_args::<2>(args)?;
                let value = parse_int(value, 1)?;
                self.require_role("admin", "only admin can update assets")?;
                let asset = store
                    .get_mut(id)
                    .ok_or_else(|| format!("the asset {id} does not exist"))?;
                asset.value = value;
                Ok(Vec::new())
            }
            "DeleteAsset" => {
                let [id] = expect_args::<1>(args)?;
                self.require_role("admin", "only admin can delete assets")?;
                store
                    .remove(id)
                    .map(|_| Vec::new())
                    .ok_or_else(|| format!("the asset {id} does not exist"))
            }
            "GetAllAssets" => {
                expect_args::<0>(args)?;
                self.require_role("auditor", "only auditors can view all assets")?;
                list_payload(&store.values().collect::<Vec<_>>())
            }
            "GetMyAssets" => {
                expect_args::<0>(args)?;
                let mine: Vec<_> = store
                    .values()
                    .filter(|asset| asset.owner == self.client_id)
                    .collect();
                list_payload(&mine)
            }
            other => Err(format!("Function {other} not found in contract SmartContract")),
        }
    }

    fn require_role(&self, role: &str, message: &str) -> Result<(), String> {
        if self.role() == role {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }
}

#[async_trait]
impl Contract for MemoryContract {
    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.execute(function, args, true)
    }

    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.execute(function, args, false)
    }

    fn disconnect(&mut self) {
        self.store = None;
    }
}

fn expect_args<const N: usize>(args: &[String]) -> Result<&[String; N], String> {
    args.try_into().map_err(|_| {
        format!(
            "Incorrect number of params. Expected {N}, received {}",
            args.len()
        )
    })
}

fn parse_int(raw: &str, position: usize) -> Result<i64, String> {
    raw.trim().parse().map_err(|_| {
        format!("Error managing parameter param{position}. Conversion error. Cannot convert passed value {raw} to int")
    })
}

/// An empty asset list is serialized as `null`, like a nil slice
fn list_payload(assets: &[&StoredAsset]) -> Result<Vec<u8>, String> {
    if assets.is_empty() {
        to_payload(&Option::<()>::None)
    } else {
        to_payload(assets)
    }
}

fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, String> {
    serde_json::to_vec(value).map_err(|e| format!("failed to serialize asset: {e}"))
}
