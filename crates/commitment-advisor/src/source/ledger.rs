//! On-chain Ledger Client
//!
//! Wallet history from Etherscan-compatible explorers (Etherscan for ETH,
//! Snowtrace for AVAX), ERC-20 balances from Moralis, and community vaults
//! from the vault indexer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::LedgerDataSource;
use crate::error::{AdvisorError, Result};
use crate::model::{Chain, TokenBalance, VaultRecord, VaultStatus, WalletTransaction, to_decimal};

const DEFAULT_ETHERSCAN_URL: &str = "https://api.etherscan.io/api";
const DEFAULT_SNOWTRACE_URL: &str = "https://api.snowtrace.io/api";
const DEFAULT_MORALIS_URL: &str = "https://deep-index.moralis.io/api/v2.2";
const DEFAULT_INDEXER_URL: &str = "https://fund-ur-memory-indexer-production.up.railway.app";

const NATIVE_DECIMALS: u32 = 18;
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Ledger client configuration
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub etherscan_url: String,
    pub snowtrace_url: String,

    /// Shared by both explorers
    pub explorer_api_key: Option<String>,

    pub moralis_url: String,

    /// Token balances are skipped without a key
    pub moralis_api_key: Option<String>,

    pub indexer_url: String,
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            etherscan_url: DEFAULT_ETHERSCAN_URL.into(),
            snowtrace_url: DEFAULT_SNOWTRACE_URL.into(),
            explorer_api_key: None,
            moralis_url: DEFAULT_MORALIS_URL.into(),
            moralis_api_key: None,
            indexer_url: DEFAULT_INDEXER_URL.into(),
            timeout_secs: 15,
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            etherscan_url: non_empty("ETHERSCAN_BASE_URL").unwrap_or(defaults.etherscan_url),
            snowtrace_url: non_empty("SNOWTRACE_BASE_URL").unwrap_or(defaults.snowtrace_url),
            explorer_api_key: non_empty("ETHERSCAN_API_KEY"),
            moralis_url: non_empty("MORALIS_BASE_URL").unwrap_or(defaults.moralis_url),
            moralis_api_key: non_empty("MORALIS_API_KEY"),
            indexer_url: non_empty("VAULT_INDEXER_URL").unwrap_or(defaults.indexer_url),
            timeout_secs: non_empty("LEDGER_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    fn explorer_url(&self, chain: Chain) -> &str {
        match chain {
            Chain::Eth => &self.etherscan_url,
            Chain::Avax => &self.snowtrace_url,
        }
    }
}

/// HTTP-backed ledger source
pub struct HttpLedgerClient {
    http: Client,
    config: LedgerConfig,
}

impl HttpLedgerClient {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LedgerConfig::from_env())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::LedgerUnavailable(format!("{what} returned {status}")));
        }
        Ok(response.json().await?)
    }

    /// Native (`txlist`) or token (`tokentx`) transfers on one chain
    async fn explorer_transfers(
        &self,
        chain: Chain,
        action: &str,
        address: &str,
    ) -> Result<Vec<WalletTransaction>> {
        let mut query = vec![
            ("module", "account".to_string()),
            ("action", action.to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(key) = &self.config.explorer_api_key {
            query.push(("apikey", key.clone()));
        }

        let request = self.http.get(self.config.explorer_url(chain)).query(&query);
        let response: ExplorerResponse = self.get_json(request, action).await?;

        // "0" with an empty result just means no transfers
        if response.status != "1" {
            tracing::debug!(%chain, action, message = %response.message, "explorer returned no transfers");
            return Ok(Vec::new());
        }

        let rows: Vec<ExplorerTx> = serde_json::from_value(response.result)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_transaction(chain, action == "tokentx"))
            .collect())
    }

    async fn chain_balances(&self, chain: Chain, address: &str, key: &str) -> Result<Vec<TokenBalance>> {
        let moralis_chain = match chain {
            Chain::Eth => "eth",
            Chain::Avax => "avalanche",
        };
        let request = self
            .http
            .get(format!("{}/{address}/erc20", self.config.moralis_url))
            .query(&[("chain", moralis_chain)])
            .header("X-API-Key", key);
        let rows: Vec<MoralisBalance> = self.get_json(request, "erc20 balances").await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let balance = scale_units(&row.balance, row.decimals)?;
                Some(TokenBalance {
                    chain,
                    token_address: row.token_address,
                    token_symbol: row.symbol.unwrap_or_else(|| "UNKNOWN".into()),
                    token_name: row.name,
                    balance,
                    usd_value: row.usd_value.map(to_decimal),
                })
            })
            .collect())
    }
}

#[async_trait]
impl LedgerDataSource for HttpLedgerClient {
    async fn get_transactions(&self, address: &str) -> Result<Vec<WalletTransaction>> {
        let mut all = Vec::new();
        let mut failures = 0;

        for chain in Chain::ALL {
            for action in ["txlist", "tokentx"] {
                match self.explorer_transfers(chain, action, address).await {
                    Ok(mut txs) => all.append(&mut txs),
                    Err(e) => {
                        failures += 1;
                        tracing::warn!(%chain, action, error = %e, "explorer request failed");
                    }
                }
            }
        }

        if all.is_empty() && failures == Chain::ALL.len() * 2 {
            return Err(AdvisorError::LedgerUnavailable(
                "all block explorers failed".into(),
            ));
        }

        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        tracing::info!(address, count = all.len(), "fetched wallet transactions");
        Ok(all)
    }

    async fn get_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>> {
        let Some(key) = self.config.moralis_api_key.as_deref() else {
            tracing::debug!("no Moralis key configured, skipping token balances");
            return Ok(Vec::new());
        };

        let mut balances = Vec::new();
        for chain in Chain::ALL {
            match self.chain_balances(chain, address, key).await {
                Ok(mut rows) => balances.append(&mut rows),
                Err(e) => tracing::warn!(%chain, error = %e, "token balances unavailable"),
            }
        }
        Ok(balances)
    }

    async fn get_recent_vaults(&self, limit: usize) -> Result<Vec<VaultRecord>> {
        let request = self
            .http
            .get(format!("{}/vaults", self.config.indexer_url))
            .query(&[("limit", limit.to_string())]);
        let response: VaultsResponse = self.get_json(request, "vault indexer").await?;

        let mut vaults: Vec<VaultRecord> = response
            .vaults
            .into_iter()
            .filter_map(IndexerVault::into_record)
            .collect();
        vaults.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        vaults.truncate(limit);
        Ok(vaults)
    }

    fn name(&self) -> &str {
        "HttpLedger"
    }
}

/// Integer base units to whole tokens
fn scale_units(raw: &str, decimals: u32) -> Option<Decimal> {
    let raw = raw.trim();
    if let Ok(units) = raw.parse::<i128>() {
        if let Ok(value) = Decimal::try_from_i128_with_scale(units, decimals) {
            return Some(value.normalize());
        }
    }
    let units: f64 = raw.parse().ok()?;
    let divisor = 10_f64.powi(i32::try_from(decimals).ok()?);
    Some(to_decimal(units / divisor))
}

fn unix_seconds(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerTx {
    hash: String,
    time_stamp: String,
    from: String,
    #[serde(default)]
    to: String,
    value: String,
    #[serde(default)]
    is_error: Option<String>,
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    token_symbol: Option<String>,
    #[serde(default)]
    token_decimal: Option<String>,
}

impl ExplorerTx {
    fn into_transaction(self, chain: Chain, is_token: bool) -> Option<WalletTransaction> {
        let timestamp = unix_seconds(&self.time_stamp)?;
        let decimals = if is_token {
            self.token_decimal.as_deref()?.parse().ok()?
        } else {
            NATIVE_DECIMALS
        };
        let amount = scale_units(&self.value, decimals)?;

        let (token_address, token_symbol) = if is_token {
            (self.contract_address, self.token_symbol)
        } else {
            (None, Some(chain.as_str().to_string()))
        };

        Some(WalletTransaction {
            hash: self.hash,
            chain,
            timestamp,
            from: self.from,
            to: self.to,
            amount,
            token_address,
            token_symbol,
            is_error: self.is_error.as_deref() == Some("1"),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MoralisBalance {
    token_address: String,
    symbol: Option<String>,
    name: Option<String>,
    decimals: u32,
    balance: String,
    #[serde(default)]
    usd_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VaultsResponse {
    #[serde(default)]
    vaults: Vec<IndexerVault>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexerVault {
    id: String,
    owner: String,
    #[serde(default)]
    token: String,
    amount: String,
    unlock_time: String,
    created_at: String,
    status: i64,
    #[serde(default)]
    emergency_withdrawn_at: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    insight: Option<IndexerInsight>,
}

#[derive(Debug, Deserialize)]
struct IndexerInsight {
    insight: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightPayload {
    token_symbol: Option<String>,
}

impl IndexerVault {
    fn token_symbol(&self) -> String {
        self.insight
            .as_ref()
            .and_then(|i| serde_json::from_str::<InsightPayload>(&i.insight).ok())
            .and_then(|p| p.token_symbol)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                if !self.token.is_empty() && !self.token.eq_ignore_ascii_case(ZERO_ADDRESS) {
                    tracing::debug!(token = %self.token, "vault token has no insight symbol");
                }
                "AVAX".to_string()
            })
    }

    fn into_record(self) -> Option<VaultRecord> {
        let created_at = unix_seconds(&self.created_at)?;
        let token_symbol = self.token_symbol();
        // Unparseable unlock times count as the default 30-day lock
        let unlock_time = unix_seconds(&self.unlock_time)
            .unwrap_or_else(|| created_at + chrono::Duration::days(30));

        Some(VaultRecord {
            amount: scale_units(&self.amount, NATIVE_DECIMALS).unwrap_or_default(),
            status: VaultStatus::from_code(self.status),
            emergency_withdrawn_at: self.emergency_withdrawn_at.as_deref().and_then(unix_seconds),
            message: self.message.filter(|m| !m.trim().is_empty()),
            id: self.id,
            owner: self.owner,
            created_at,
            unlock_time,
            token_symbol,
        })
    }
}
