//! CoinGecko Market Data
//!
//! Snapshots, price history and market overview from the CoinGecko REST API,
//! sentiment from the alternative.me Fear & Greed index.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::MarketDataSource;
use crate::error::{AdvisorError, Result};
use crate::model::{MarketOverview, MarketSnapshot, PricePoint, SentimentSnapshot, sentiment_label};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_FEAR_GREED_URL: &str = "https://api.alternative.me/fng/";

/// Symbols resolved without a `/coins/list` round trip
const COMMON_TOKEN_IDS: [(&str, &str); 20] = [
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("usdt", "tether"),
    ("usdc", "usd-coin"),
    ("bnb", "binancecoin"),
    ("sol", "solana"),
    ("ada", "cardano"),
    ("avax", "avalanche-2"),
    ("dot", "polkadot"),
    ("atom", "cosmos"),
    ("etc", "ethereum-classic"),
    ("matic", "matic-network"),
    ("link", "chainlink"),
    ("uni", "uniswap"),
    ("ltc", "litecoin"),
    ("bch", "bitcoin-cash"),
    ("xrp", "ripple"),
    ("doge", "dogecoin"),
    ("shib", "shiba-inu"),
    ("trx", "tron"),
];

/// CoinGecko client configuration
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub fear_greed_url: String,

    /// Demo API key, sent as `x_cg_demo_api_key`
    pub api_key: Option<String>,

    pub timeout_secs: u64,

    /// Upper bound on memoized symbol to id resolutions
    pub token_cache_capacity: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            fear_greed_url: DEFAULT_FEAR_GREED_URL.into(),
            api_key: None,
            timeout_secs: 15,
            token_cache_capacity: 1_000,
        }
    }
}

impl MarketDataConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("COINGECKO_BASE_URL").unwrap_or(defaults.base_url),
            fear_greed_url: std::env::var("FEAR_GREED_URL").unwrap_or(defaults.fear_greed_url),
            api_key: std::env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_secs: std::env::var("MARKET_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            token_cache_capacity: std::env::var("TOKEN_ID_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_cache_capacity),
        }
    }
}

/// Market data backed by CoinGecko and alternative.me
pub struct CoinGeckoClient {
    http: Client,
    config: MarketDataConfig,
    token_ids: Cache<String, String>,
}

impl CoinGeckoClient {
    pub fn new(config: MarketDataConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Build with a pre-configured HTTP client (custom TLS, tests)
    pub fn with_client(http: Client, config: MarketDataConfig) -> Self {
        let token_ids = Cache::builder()
            .max_capacity(config.token_cache_capacity)
            .build();
        Self { http, config, token_ids }
    }

    pub fn from_env() -> Result<Self> {
        Self::new(MarketDataConfig::from_env())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let mut request = self.http.get(url).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("x_cg_demo_api_key", key)]);
        }

        tracing::debug!(url, "market data request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Source(format!("{url} returned {status}")));
        }
        Ok(response.json().await?)
    }

    /// Map a ticker symbol to a CoinGecko coin id.
    ///
    /// Tries the common-token table, the memo cache, then `/coins/list`
    /// (exact symbol, exact name, partial name or id).
    pub async fn resolve_token_id(&self, symbol: &str) -> Result<String> {
        let key = symbol.trim().to_lowercase();
        if let Some((_, id)) = COMMON_TOKEN_IDS.iter().find(|(s, _)| *s == key) {
            return Ok((*id).to_string());
        }
        if let Some(id) = self.token_ids.get(&key).await {
            return Ok(id);
        }

        let url = format!("{}/coins/list", self.config.base_url);
        let coins: Vec<CoinListEntry> = self.get_json(&url, &[]).await?;

        let found = coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(&key))
            .or_else(|| coins.iter().find(|c| c.name.eq_ignore_ascii_case(&key)))
            .or_else(|| {
                coins.iter().find(|c| {
                    c.name.to_lowercase().contains(&key) || c.id.to_lowercase().contains(&key)
                })
            })
            .ok_or_else(|| AdvisorError::UnsupportedAsset(symbol.to_uppercase()))?;

        tracing::debug!(symbol, id = %found.id, "resolved token id");
        self.token_ids.insert(key, found.id.clone()).await;
        Ok(found.id.clone())
    }

    async fn fetch_series(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>> {
        let id = self.resolve_token_id(symbol).await?;
        let url = format!("{}/coins/{id}/market_chart", self.config.base_url);
        let chart: MarketChartResponse = self
            .get_json(
                &url,
                &[("vs_currency", "usd".to_string()), ("days", days.to_string())],
            )
            .await?;

        #[allow(clippy::cast_possible_truncation)]
        let series = chart
            .prices
            .into_iter()
            .filter(|[_, price]| price.is_finite() && *price > 0.0)
            .map(|[ts, price]| PricePoint::new(ts as i64, price))
            .collect();
        Ok(series)
    }

    async fn fetch_sentiment(&self) -> Result<SentimentSnapshot> {
        let response: FearGreedResponse = self.get_json(&self.config.fear_greed_url, &[]).await?;
        let entry = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AdvisorError::Source("Fear & Greed index returned no data".into()))?;

        let value = entry
            .value
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(|| AdvisorError::Parse(format!("Fear & Greed value '{}'", entry.value)))?;
        let timestamp = entry
            .timestamp
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now);

        Ok(SentimentSnapshot {
            value,
            classification: entry.value_classification,
            timestamp,
        })
    }

    async fn fetch_major_prices(&self) -> Result<HashMap<String, SimplePrice>> {
        let url = format!("{}/simple/price", self.config.base_url);
        self.get_json(
            &url,
            &[
                ("ids", "bitcoin,ethereum,solana".to_string()),
                ("vs_currencies", "usd".to_string()),
                ("include_24hr_change", "true".to_string()),
            ],
        )
        .await
    }

    async fn fetch_market_cap_change(&self) -> Result<f64> {
        let url = format!("{}/global", self.config.base_url);
        let global: GlobalResponse = self.get_json(&url, &[]).await?;
        Ok(global.data.market_cap_change_percentage_24h_usd.unwrap_or(0.0))
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn get_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let id = self.resolve_token_id(symbol).await?;
        let url = format!("{}/coins/{id}", self.config.base_url);
        let coin: CoinResponse = self
            .get_json(
                &url,
                &[
                    ("localization", "false".to_string()),
                    ("tickers", "false".to_string()),
                    ("community_data", "false".to_string()),
                    ("developer_data", "false".to_string()),
                ],
            )
            .await?;

        let data = coin
            .market_data
            .ok_or_else(|| AdvisorError::PriceUnavailable(symbol.to_uppercase()))?;
        let price = usd(&data.current_price)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| AdvisorError::PriceUnavailable(symbol.to_uppercase()))?;

        let mut snapshot = MarketSnapshot::new(coin.symbol, price);
        snapshot.name = Some(coin.name);
        snapshot.price_change_24h = data.price_change_percentage_24h.unwrap_or_default();
        snapshot.price_change_7d = data.price_change_percentage_7d.unwrap_or_default();
        snapshot.price_change_30d = data.price_change_percentage_30d.unwrap_or_default();
        snapshot.market_cap = usd(&data.market_cap).unwrap_or_default();
        snapshot.volume_24h = usd(&data.total_volume).unwrap_or_default();
        snapshot.ath_change_percentage = usd(&data.ath_change_percentage).unwrap_or_default();

        tracing::debug!(symbol = %snapshot.symbol, price = %snapshot.current_price, "fetched snapshot");
        Ok(snapshot)
    }

    async fn get_historical_series(&self, symbol: &str, days: u32) -> Result<Option<Vec<PricePoint>>> {
        match self.fetch_series(symbol, days).await {
            Ok(series) if series.is_empty() => Ok(None),
            Ok(series) => Ok(Some(series)),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "price history unavailable");
                Ok(None)
            }
        }
    }

    async fn get_sentiment(&self) -> Result<Option<SentimentSnapshot>> {
        match self.fetch_sentiment().await {
            Ok(sentiment) => Ok(Some(sentiment)),
            Err(e) => {
                tracing::warn!(error = %e, "Fear & Greed index unavailable");
                Ok(None)
            }
        }
    }

    async fn get_market_overview(&self) -> Result<Option<MarketOverview>> {
        let Some(sentiment) = self.get_sentiment().await? else {
            return Ok(None);
        };

        let prices = self.fetch_major_prices().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "major prices unavailable");
            HashMap::new()
        });
        let market_cap_change_24h = self.fetch_market_cap_change().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "global market data unavailable");
            0.0
        });

        let quote = |id: &str| {
            prices
                .get(id)
                .map_or((Decimal::ZERO, 0.0), |p| (p.usd.unwrap_or_default(), p.usd_24h_change.unwrap_or(0.0)))
        };
        let (btc_price, btc_change_24h) = quote("bitcoin");
        let (eth_price, eth_change_24h) = quote("ethereum");
        let (sol_price, sol_change_24h) = quote("solana");

        Ok(Some(MarketOverview {
            fear_greed_index: sentiment.value,
            sentiment_label: sentiment_label(sentiment.value).to_string(),
            market_cap_change_24h,
            btc_price,
            btc_change_24h,
            eth_price,
            eth_change_24h,
            sol_price,
            sol_change_24h,
            timestamp: Utc::now(),
        }))
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

fn usd(values: &HashMap<String, Option<Decimal>>) -> Option<Decimal> {
    values.get("usd").copied().flatten()
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    symbol: String,
    name: String,
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoinMarketData {
    current_price: HashMap<String, Option<Decimal>>,
    market_cap: HashMap<String, Option<Decimal>>,
    total_volume: HashMap<String, Option<Decimal>>,
    ath_change_percentage: HashMap<String, Option<Decimal>>,
    price_change_percentage_24h: Option<Decimal>,
    price_change_percentage_7d: Option<Decimal>,
    price_change_percentage_30d: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    data: Vec<FearGreedEntry>,
}

#[derive(Debug, Deserialize)]
struct FearGreedEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    market_cap_change_percentage_24h_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<Decimal>,
    usd_24h_change: Option<f64>,
}
