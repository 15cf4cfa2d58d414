//! Mock Data Sources
//!
//! Deterministic in-memory providers for tests and offline demos.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{LedgerDataSource, MarketDataSource};
use crate::error::{AdvisorError, Result};
use crate::model::{
    MarketOverview, MarketSnapshot, PricePoint, SentimentSnapshot, TokenBalance, VaultRecord,
    WalletTransaction, sentiment_label, to_f64,
};

const DAY_MS: i64 = 86_400_000;

/// Longer series requests are truncated to ten years of daily points
const MAX_SERIES_DAYS: u32 = 3650;

/// Mock market data with static prices
pub struct MockMarketData {
    sentiment: Option<u8>,
    with_history: bool,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketData {
    /// Neutral sentiment, synthetic history available
    pub const fn new() -> Self {
        Self {
            sentiment: Some(50),
            with_history: true,
        }
    }

    #[must_use]
    pub const fn with_sentiment(mut self, value: Option<u8>) -> Self {
        self.sentiment = value;
        self
    }

    #[must_use]
    pub const fn without_history(mut self) -> Self {
        self.with_history = false;
        self
    }

    /// (price, name, 24h change, 30d change, market cap, ATH change)
    fn base(symbol: &str) -> Option<(Decimal, &'static str, Decimal, Decimal, Decimal, Decimal)> {
        match symbol.to_uppercase().as_str() {
            "BTC" => Some((dec!(97500), "Bitcoin", dec!(2.5), dec!(8.0), dec!(1_930_000_000_000), dec!(-10.5))),
            "ETH" => Some((dec!(3450), "Ethereum", dec!(1.8), dec!(-12.0), dec!(415_000_000_000), dec!(-29.0))),
            "SOL" => Some((dec!(195), "Solana", dec!(4.2), dec!(22.0), dec!(93_000_000_000), dec!(-25.0))),
            "AVAX" => Some((dec!(42), "Avalanche", dec!(5.5), dec!(-24.0), dec!(17_000_000_000), dec!(-71.0))),
            "ADA" => Some((dec!(0.95), "Cardano", dec!(-1.2), dec!(3.0), dec!(33_000_000_000), dec!(-69.0))),
            "DOT" => Some((dec!(7.20), "Polkadot", dec!(0.8), dec!(-5.0), dec!(11_000_000_000), dec!(-87.0))),
            "LINK" => Some((dec!(24.50), "Chainlink", dec!(3.1), dec!(15.0), dec!(15_000_000_000), dec!(-54.0))),
            "MATIC" => Some((dec!(0.52), "Polygon", dec!(-0.5), dec!(-18.0), dec!(5_000_000_000), dec!(-82.0))),
            "DOGE" => Some((dec!(0.38), "Dogecoin", dec!(12.0), dec!(55.0), dec!(56_000_000_000), dec!(-48.0))),
            "USDC" => Some((dec!(1), "USD Coin", dec!(0), dec!(0), dec!(42_000_000_000), dec!(-0.5))),
            _ => None,
        }
    }

    /// Drifting, gently oscillating daily series ending at the current price
    fn synthetic_series(price: f64, days: u32) -> Vec<PricePoint> {
        let now = Utc::now().timestamp_millis();
        let n = i64::from(days);
        (0..=n)
            .map(|i| {
                let progress = i as f64 / n.max(1) as f64;
                let wave = ((i % 7) as f64 - 3.0) / 100.0;
                let factor = if i == n { 1.0 } else { 0.8 + 0.2 * progress + wave };
                PricePoint::new(now - (n - i) * DAY_MS, price * factor)
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataSource for MockMarketData {
    async fn get_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let (price, name, change_24h, change_30d, market_cap, ath) = Self::base(symbol)
            .ok_or_else(|| AdvisorError::UnsupportedAsset(symbol.to_string()))?;

        let mut snapshot = MarketSnapshot::new(symbol, price);
        snapshot.name = Some(name.to_string());
        snapshot.price_change_24h = change_24h;
        snapshot.price_change_7d = change_24h * dec!(2);
        snapshot.price_change_30d = change_30d;
        snapshot.market_cap = market_cap;
        snapshot.volume_24h = market_cap / dec!(40);
        snapshot.ath_change_percentage = ath;
        Ok(snapshot)
    }

    async fn get_historical_series(&self, symbol: &str, days: u32) -> Result<Option<Vec<PricePoint>>> {
        if !self.with_history {
            return Ok(None);
        }
        let days = days.min(MAX_SERIES_DAYS);
        Ok(Self::base(symbol).map(|(price, ..)| Self::synthetic_series(to_f64(price), days)))
    }

    async fn get_sentiment(&self) -> Result<Option<SentimentSnapshot>> {
        Ok(self
            .sentiment
            .map(|value| SentimentSnapshot::new(value, sentiment_label(value))))
    }

    async fn get_market_overview(&self) -> Result<Option<MarketOverview>> {
        let Some(value) = self.sentiment else {
            return Ok(None);
        };
        Ok(Some(MarketOverview {
            fear_greed_index: value,
            sentiment_label: sentiment_label(value).to_string(),
            market_cap_change_24h: 1.4,
            btc_price: dec!(97500),
            btc_change_24h: 2.5,
            eth_price: dec!(3450),
            eth_change_24h: 1.8,
            sol_price: dec!(195),
            sol_change_24h: 4.2,
            timestamp: Utc::now(),
        }))
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

/// In-memory ledger
#[derive(Default)]
pub struct MockLedger {
    transactions: Vec<WalletTransaction>,
    balances: Vec<TokenBalance>,
    vaults: Vec<VaultRecord>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transactions(mut self, transactions: Vec<WalletTransaction>) -> Self {
        self.transactions = transactions;
        self
    }

    #[must_use]
    pub fn with_balances(mut self, balances: Vec<TokenBalance>) -> Self {
        self.balances = balances;
        self
    }

    #[must_use]
    pub fn with_vaults(mut self, vaults: Vec<VaultRecord>) -> Self {
        self.vaults = vaults;
        self
    }
}

#[async_trait]
impl LedgerDataSource for MockLedger {
    async fn get_transactions(&self, address: &str) -> Result<Vec<WalletTransaction>> {
        let mut transactions: Vec<WalletTransaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.from.eq_ignore_ascii_case(address) || tx.to.eq_ignore_ascii_case(address))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }

    async fn get_token_balances(&self, _address: &str) -> Result<Vec<TokenBalance>> {
        Ok(self.balances.clone())
    }

    async fn get_recent_vaults(&self, limit: usize) -> Result<Vec<VaultRecord>> {
        let mut vaults = self.vaults.clone();
        vaults.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        vaults.truncate(limit);
        Ok(vaults)
    }

    fn name(&self) -> &str {
        "MockLedger"
    }
}

/// Vault fixture shared by tests across the crate
#[cfg(test)]
pub(crate) fn vault(id: &str, status: crate::model::VaultStatus, lock_days: i64, amount: Decimal) -> VaultRecord {
    use chrono::Duration;

    let created_at = Utc::now() - Duration::days(3);
    VaultRecord {
        id: id.to_string(),
        owner: "0xowner".to_string(),
        status,
        created_at,
        unlock_time: created_at + Duration::days(lock_days),
        emergency_withdrawn_at: None,
        amount,
        token_symbol: "AVAX".to_string(),
        message: None,
    }
}
