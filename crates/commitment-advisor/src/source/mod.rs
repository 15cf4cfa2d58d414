//! Data Sources
//!
//! Abstractions over market data and on-chain ledger providers, with HTTP
//! implementations and in-memory mocks.

mod coingecko;
mod ledger;
mod mock;

pub use coingecko::{CoinGeckoClient, MarketDataConfig};
pub use ledger::{HttpLedgerClient, LedgerConfig};
pub use mock::{MockLedger, MockMarketData};

#[cfg(test)]
pub(crate) use mock::vault;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    MarketOverview, MarketSnapshot, PricePoint, SentimentSnapshot, TokenBalance, VaultRecord,
    WalletTransaction,
};

/// Market data provider (Strategy pattern)
///
/// Optional inputs come back as `Ok(None)` when the provider has nothing
/// usable; `Err` is reserved for failures the caller must see.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Current snapshot for a symbol
    async fn get_snapshot(&self, symbol: &str) -> Result<MarketSnapshot>;

    /// Daily price series covering the last `days` days, oldest first
    async fn get_historical_series(&self, symbol: &str, days: u32) -> Result<Option<Vec<PricePoint>>>;

    /// Latest Fear & Greed reading
    async fn get_sentiment(&self) -> Result<Option<SentimentSnapshot>>;

    /// Market-wide context: sentiment plus the majors
    async fn get_market_overview(&self) -> Result<Option<MarketOverview>>;

    /// Provider name
    fn name(&self) -> &str;
}

/// On-chain history and community vault provider
#[async_trait]
pub trait LedgerDataSource: Send + Sync {
    /// Successful transfers touching `address`, newest first
    async fn get_transactions(&self, address: &str) -> Result<Vec<WalletTransaction>>;

    async fn get_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>>;

    /// Most recent vaults, newest first
    async fn get_recent_vaults(&self, limit: usize) -> Result<Vec<VaultRecord>>;

    fn name(&self) -> &str;
}
