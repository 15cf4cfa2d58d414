//! Advisor Service
//!
//! Fetches market and ledger inputs, runs the engine and behavioral
//! analyses, and packages results with the inputs they used.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::behavior::{analyze_vaults, analyze_wallet};
use crate::engine::{MarketContext, analyze_price_band_commitment, score_duration_commitment};
use crate::error::{AdvisorError, Result};
use crate::model::{CommitmentRequest, MarketOverview, MarketSnapshot, PricePoint, SentimentSnapshot};
use crate::report::{CommitmentReport, DurationReport, MarketReport, PriceBandReport, VaultsReport, WalletReport};
use crate::source::{LedgerDataSource, MarketDataSource};

/// Days of history fetched for price band analysis
const PRICE_BAND_HISTORY_DAYS: u32 = 365;

/// Vault requests are capped at this many records
pub const MAX_VAULT_LIMIT: usize = 100;
pub const DEFAULT_VAULT_LIMIT: usize = 10;

pub struct Advisor {
    market: Arc<dyn MarketDataSource>,
    ledger: Option<Arc<dyn LedgerDataSource>>,
}

impl Advisor {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market, ledger: None }
    }

    #[must_use]
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerDataSource>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn market_source(&self) -> &str {
        self.market.name()
    }

    pub fn ledger_source(&self) -> Option<&str> {
        self.ledger.as_deref().map(|ledger| ledger.name())
    }

    fn ledger(&self) -> Result<&dyn LedgerDataSource> {
        self.ledger
            .as_deref()
            .ok_or_else(|| AdvisorError::LedgerUnavailable("no ledger source configured".into()))
    }

    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let snapshot = self.market.get_snapshot(symbol).await?;
        if snapshot.current_price <= rust_decimal::Decimal::ZERO {
            return Err(AdvisorError::PriceUnavailable(symbol.to_string()));
        }
        Ok(snapshot)
    }

    async fn series(&self, symbol: &str, days: u32) -> Option<Vec<PricePoint>> {
        match self.market.get_historical_series(symbol, days).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol, error = %e, "historical series unavailable");
                None
            }
        }
    }

    async fn sentiment(&self) -> Option<SentimentSnapshot> {
        match self.market.get_sentiment().await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!(error = %e, "sentiment unavailable");
                None
            }
        }
    }

    async fn overview(&self) -> Option<MarketOverview> {
        match self.market.get_market_overview().await {
            Ok(overview) => overview,
            Err(e) => {
                warn!(error = %e, "market overview unavailable");
                None
            }
        }
    }

    /// Score a commitment against live market data.
    ///
    /// Missing history or sentiment lowers confidence; a missing price or
    /// an invalid request is an error.
    pub async fn analyze_commitment(&self, request: &CommitmentRequest) -> Result<CommitmentReport> {
        request.validate()?;

        let symbol = request.token_symbol();
        let snapshot = self.snapshot(symbol).await?;
        if request.amount().checked_mul(snapshot.current_price).is_none() {
            return Err(AdvisorError::Validation(format!(
                "Amount {} {symbol} is too large to value at the current price",
                request.amount()
            )));
        }
        let sentiment = self.sentiment().await;

        let history_days = match request {
            CommitmentRequest::Duration(c) => duration_history_days(c.duration_days),
            CommitmentRequest::PriceBand(_) => PRICE_BAND_HISTORY_DAYS,
        };
        let series = self.series(symbol, history_days).await;
        debug!(
            symbol,
            history_days,
            points = series.as_ref().map_or(0, Vec::len),
            "fetched commitment inputs"
        );

        let ctx = MarketContext::new(&snapshot)
            .with_series(series.as_deref())
            .with_sentiment(sentiment.as_ref())
            .as_of(Utc::now());

        let report = match request {
            CommitmentRequest::Duration(c) => {
                let analysis = score_duration_commitment(&ctx, c.amount, c.duration_days);
                CommitmentReport::Duration(DurationReport {
                    request: c.clone(),
                    snapshot: snapshot.clone(),
                    sentiment: sentiment.clone(),
                    analysis,
                })
            }
            CommitmentRequest::PriceBand(c) => {
                let analysis = analyze_price_band_commitment(&ctx, c.amount, c.up_target, c.down_target)?;
                CommitmentReport::PriceBand(PriceBandReport {
                    request: c.clone(),
                    snapshot: snapshot.clone(),
                    sentiment: sentiment.clone(),
                    analysis,
                })
            }
        };
        Ok(report)
    }

    /// Behavioral analysis of a wallet's on-chain history.
    pub async fn analyze_wallet(&self, address: &str) -> Result<WalletReport> {
        if !is_wallet_address(address) {
            return Err(AdvisorError::Validation(format!(
                "Invalid wallet address: {address} (expected 0x followed by 40 hex characters)"
            )));
        }
        let ledger = self.ledger()?;

        let transactions = ledger.get_transactions(address).await?;
        let balances = match ledger.get_token_balances(address).await {
            Ok(balances) => balances,
            Err(e) => {
                warn!(address, error = %e, "token balances unavailable");
                Vec::new()
            }
        };
        let overview = self.overview().await;

        let analysis = analyze_wallet(address, &transactions, &balances, overview.as_ref());
        Ok(WalletReport { analysis, overview })
    }

    /// Statistics over the most recent community vaults.
    pub async fn analyze_vaults(&self, limit: usize) -> Result<VaultsReport> {
        let limit = limit.clamp(1, MAX_VAULT_LIMIT);
        let vaults = self.ledger()?.get_recent_vaults(limit).await?;
        let overview = self.overview().await;

        let analysis = analyze_vaults(&vaults, overview.as_ref(), Utc::now());
        Ok(VaultsReport { analysis, overview })
    }

    pub async fn market_overview(&self) -> Result<MarketReport> {
        self.overview()
            .await
            .map(|overview| MarketReport { overview })
            .ok_or_else(|| AdvisorError::Source(format!("{} returned no market overview", self.market.name())))
    }
}

/// At least a year of history, more for longer locks
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn duration_history_days(duration_days: f64) -> u32 {
    duration_days.ceil().clamp(365.0, f64::from(u32::MAX)) as u32
}

/// `0x` followed by 40 hex digits
pub fn is_wallet_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
