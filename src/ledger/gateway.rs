//! HTTP ledger gateway backend
//!
//! Talks to a REST gateway that fronts the peer network; the peers themselves
//! only speak gRPC. Each connect reads the connection profile, looks the role
//! up in the wallet, builds a mutually-authenticated client trusting the
//! organization peer's TLS root and resolves the channel/contract pair before
//! handing out a contract.

use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use super::profile::{ConnectionProfile, Peer};
use super::wallet::{FileSystemWallet, Identity};
use super::{Connector, Contract, LedgerError, TransactionKind};
use crate::config::LedgerConfig;

/// Header carrying the caller's MSP id alongside the client certificate
const MSP_ID_HEADER: &str = "X-Msp-Id";

/// The only identity type the wallet format defines
const X509_IDENTITY: &str = "X.509";

/// Connection settings for the gateway backend
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub connection_profile: PathBuf,
    pub wallet_path: PathBuf,
    pub channel: String,
    pub contract: String,
    /// Base URL of the REST gateway, without a trailing slash
    pub gateway_url: String,
    pub discovery_enabled: bool,
    pub as_localhost: bool,
    pub request_timeout: Option<Duration>,
}

impl GatewaySettings {
    /// Settings for the gateway backend. `ledger.gateway_url` is required.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let gateway_url = config
            .gateway_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                LedgerError::Connection(
                    "ledger.gateway_url must be set for the gateway backend".to_string(),
                )
            })?;
        reqwest::Url::parse(gateway_url)
            .map_err(|e| LedgerError::connection(&format!("invalid gateway url {gateway_url}"), e))?;

        Ok(Self {
            connection_profile: PathBuf::from(&config.connection_profile),
            wallet_path: PathBuf::from(&config.wallet_path),
            channel: config.channel.clone(),
            contract: config.contract.clone(),
            gateway_url: gateway_url.to_string(),
            discovery_enabled: config.discovery_enabled,
            as_localhost: config.as_localhost,
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

pub struct GatewayConnector {
    settings: GatewaySettings,
    wallet: FileSystemWallet,
}

impl GatewayConnector {
    pub fn new(settings: GatewaySettings) -> Self {
        let wallet = FileSystemWallet::new(settings.wallet_path.clone());
        Self { settings, wallet }
    }

    async fn build_client(&self, identity: &Identity, peer: &Peer) -> Result<reqwest::Client, LedgerError> {
        let mut builder = reqwest::Client::builder();

        if let Some(pem) = peer.tls_root_pem().await? {
            let root = reqwest::Certificate::from_pem(pem.as_bytes())
                .map_err(|e| LedgerError::connection("invalid peer TLS root", e))?;
            builder = builder.add_root_certificate(root);
        }

        let client_pem = format!(
            "{}\n{}",
            identity.credentials.certificate.trim_end(),
            identity.credentials.private_key.trim_end()
        );
        let client_identity = reqwest::Identity::from_pem(client_pem.as_bytes())
            .map_err(|e| LedgerError::connection("invalid wallet credentials", e))?;
        builder = builder.identity(client_identity);

        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| LedgerError::connection("failed to build gateway client", e))
    }
}

#[async_trait]
impl Connector for GatewayConnector {
    async fn connect(&self, role: &str) -> Result<Box<dyn Contract>, LedgerError> {
        let profile = ConnectionProfile::load(&self.settings.connection_profile).await?;

        let identity = self
            .wallet
            .get(role)
            .await?
            .ok_or_else(|| LedgerError::IdentityNotFound {
                role: role.to_string(),
            })?;
        if identity.kind != X509_IDENTITY {
            return Err(LedgerError::Connection(format!(
                "unsupported identity type {} for {role}",
                identity.kind
            )));
        }

        let (peer_name, peer) = profile.peer_for_msp(&identity.msp_id).ok_or_else(|| {
            LedgerError::Connection("connection profile does not define any peers".to_string())
        })?;

        let client = self.build_client(&identity, peer).await?;

        let contract_url = format!(
            "{}/channels/{}/contracts/{}",
            self.settings.gateway_url, self.settings.channel, self.settings.contract
        );

        let response = client
            .get(&contract_url)
            .header(MSP_ID_HEADER, &identity.msp_id)
            .send()
            .await
            .map_err(|e| LedgerError::connection("failed to connect to gateway", e))?;

        if !response.status().is_success() {
            return Err(LedgerError::Connection(format!(
                "failed to resolve contract {} on channel {}: {}",
                self.settings.contract,
                self.settings.channel,
                response.status()
            )));
        }

        Ok(Box::new(GatewayContract {
            client: Some(client),
            contract_url,
            msp_id: identity.msp_id,
            peer: peer_name.to_string(),
            discovery: self.settings.discovery_enabled,
            as_localhost: self.settings.as_localhost,
        }))
    }
}

struct GatewayContract {
    client: Option<reqwest::Client>,
    contract_url: String,
    msp_id: String,
    peer: String,
    discovery: bool,
    as_localhost: bool,
}

impl GatewayContract {
    async fn call(
        &self,
        kind: TransactionKind,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, LedgerError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LedgerError::Connection("gateway connection is closed".to_string()))?;

        let response = client
            .post(format!("{}/{}", self.contract_url, kind.as_str()))
            .header(MSP_ID_HEADER, &self.msp_id)
            .json(&json!({
                "function": function,
                "args": args,
                "peer": self.peer,
                "discovery": {
                    "enabled": self.discovery,
                    "asLocalhost": self.as_localhost,
                },
            }))
            .send()
            .await
            .map_err(|e| LedgerError::connection(&format!("{kind} {function} failed"), e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| LedgerError::connection(&format!("{kind} {function} response"), e))?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(LedgerError::from_remote_message(remote_message(
                &body,
                status,
            )))
        }
    }
}

#[async_trait]
impl Contract for GatewayContract {
    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.call(TransactionKind::Submit, function, args).await
    }

    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.call(TransactionKind::Evaluate, function, args).await
    }

    fn disconnect(&mut self) {
        // Dropping the client closes its pooled connections
        self.client = None;
    }
}

/// Extract the failure text from a gateway error body
fn remote_message(body: &[u8], status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        {
            return message.to_string();
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        format!("ledger gateway returned {status}")
    } else {
        text
    }
}
