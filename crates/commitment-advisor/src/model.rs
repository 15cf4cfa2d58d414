//! Domain Models
//!
//! Market inputs and commitment requests shared by the engine, the data
//! sources and the tools. Money is `rust_decimal::Decimal`; statistical
//! heuristics stay in `f64`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Point-in-time market data for one token.
///
/// Every numeric field other than the price defaults to zero when the
/// provider omits it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Ticker symbol, upper-case
    pub symbol: String,

    /// Display name reported by the provider
    #[serde(default)]
    pub name: Option<String>,

    /// Current price in USD
    pub current_price: Decimal,

    #[serde(default)]
    pub price_change_24h: Decimal,

    #[serde(default)]
    pub price_change_7d: Decimal,

    /// 30-day price change, percent
    #[serde(default)]
    pub price_change_30d: Decimal,

    #[serde(default)]
    pub market_cap: Decimal,

    #[serde(default)]
    pub volume_24h: Decimal,

    /// Distance from the all-time high, percent (negative below ATH)
    #[serde(default)]
    pub ath_change_percentage: Decimal,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>, current_price: Decimal) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            name: None,
            current_price,
            price_change_24h: Decimal::ZERO,
            price_change_7d: Decimal::ZERO,
            price_change_30d: Decimal::ZERO,
            market_cap: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            ath_change_percentage: Decimal::ZERO,
        }
    }

    /// Dollar value of `amount` tokens at the current price, saturating
    pub fn value_of(&self, amount: Decimal) -> Decimal {
        amount.saturating_mul(self.current_price)
    }
}

/// One sample of a historical price series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Milliseconds since the unix epoch
    pub timestamp_ms: i64,
    pub price_usd: f64,
}

impl PricePoint {
    pub const fn new(timestamp_ms: i64, price_usd: f64) -> Self {
        Self { timestamp_ms, price_usd }
    }
}

/// Fear & Greed index reading (0 = extreme fear, 100 = extreme greed).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub value: u8,
    pub classification: String,
    pub timestamp: DateTime<Utc>,
}

impl SentimentSnapshot {
    pub fn new(value: u8, classification: impl Into<String>) -> Self {
        Self {
            value: value.min(100),
            classification: classification.into(),
            timestamp: Utc::now(),
        }
    }

    pub const fn band(&self) -> SentimentBand {
        SentimentBand::from_value(self.value)
    }
}

/// Five-way sentiment banding used by the scorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentBand {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentBand {
    pub const fn from_value(value: u8) -> Self {
        match value {
            0..=25 => Self::ExtremeFear,
            26..=45 => Self::Fear,
            46..=55 => Self::Neutral,
            56..=75 => Self::Greed,
            _ => Self::ExtremeGreed,
        }
    }
}

/// Lock `amount` of a token for a fixed number of days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationCommitment {
    pub amount: Decimal,
    pub token_symbol: String,
    pub duration_days: f64,
}

/// Lock `amount` of a token until the price leaves `[down_target, up_target]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBandCommitment {
    pub amount: Decimal,
    pub token_symbol: String,
    pub up_target: Decimal,
    pub down_target: Decimal,
}

/// A commitment the user is considering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitmentRequest {
    Duration(DurationCommitment),
    PriceBand(PriceBandCommitment),
}

impl CommitmentRequest {
    pub fn duration(amount: Decimal, token_symbol: impl Into<String>, duration_days: f64) -> Self {
        Self::Duration(DurationCommitment {
            amount,
            token_symbol: token_symbol.into().to_uppercase(),
            duration_days,
        })
    }

    pub fn price_band(
        amount: Decimal,
        token_symbol: impl Into<String>,
        up_target: Decimal,
        down_target: Decimal,
    ) -> Self {
        Self::PriceBand(PriceBandCommitment {
            amount,
            token_symbol: token_symbol.into().to_uppercase(),
            up_target,
            down_target,
        })
    }

    pub fn token_symbol(&self) -> &str {
        match self {
            Self::Duration(c) => &c.token_symbol,
            Self::PriceBand(c) => &c.token_symbol,
        }
    }

    pub const fn amount(&self) -> Decimal {
        match self {
            Self::Duration(c) => c.amount,
            Self::PriceBand(c) => c.amount,
        }
    }

    /// Shape checks that do not need market data.
    ///
    /// Target ordering against the live price is checked by the price band
    /// analysis once the price is known.
    pub fn validate(&self) -> Result<()> {
        if self.amount() <= Decimal::ZERO {
            return Err(AdvisorError::Validation("Amount must be positive".into()));
        }
        if self.token_symbol().trim().is_empty() {
            return Err(AdvisorError::Validation("Token symbol is required".into()));
        }
        match self {
            Self::Duration(c) if !(c.duration_days.is_finite() && c.duration_days > 0.0) => Err(
                AdvisorError::Validation("Duration must be a positive number of days".into()),
            ),
            Self::PriceBand(c) if c.up_target <= Decimal::ZERO || c.down_target <= Decimal::ZERO => {
                Err(AdvisorError::Validation("Price targets must be positive".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Broad market context: sentiment plus the majors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub fear_greed_index: u8,
    pub sentiment_label: String,

    /// Total market cap change over 24h, percent
    pub market_cap_change_24h: f64,

    pub btc_price: Decimal,
    pub btc_change_24h: f64,
    pub eth_price: Decimal,
    pub eth_change_24h: f64,
    pub sol_price: Decimal,
    pub sol_change_24h: f64,

    pub timestamp: DateTime<Utc>,
}

impl MarketOverview {
    pub fn volatility_label(&self) -> &'static str {
        let change = self.market_cap_change_24h.abs();
        if change > 10.0 {
            "extreme"
        } else if change > 5.0 {
            "high"
        } else if change > 2.0 {
            "moderate"
        } else {
            "low"
        }
    }
}

/// Human label for a Fear & Greed value
pub const fn sentiment_label(value: u8) -> &'static str {
    match value {
        75.. => "extreme greed",
        60..=74 => "greed",
        40..=59 => "neutral",
        25..=39 => "fear",
        _ => "extreme fear",
    }
}

// ============================================================================
// Ledger Records
// ============================================================================

/// Chains the ledger source reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
    Eth,
    Avax,
}

impl Chain {
    pub const ALL: [Self; 2] = [Self::Eth, Self::Avax];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eth => "ETH",
            Self::Avax => "AVAX",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A native or token transfer touching the analyzed wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub hash: String,
    pub chain: Chain,
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub to: String,

    /// Transfer size in whole tokens
    pub amount: Decimal,

    /// `None` for native transfers
    #[serde(default)]
    pub token_address: Option<String>,

    #[serde(default)]
    pub token_symbol: Option<String>,

    #[serde(default)]
    pub is_error: bool,
}

impl WalletTransaction {
    /// Grouping key: chain plus token contract, `NATIVE` for the chain coin
    pub fn token_key(&self) -> String {
        format!(
            "{}_{}",
            self.chain,
            self.token_address.as_deref().unwrap_or("NATIVE")
        )
    }

    pub fn is_outgoing_from(&self, address: &str) -> bool {
        self.from.eq_ignore_ascii_case(address)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub chain: Chain,
    pub token_address: String,
    pub token_symbol: String,
    #[serde(default)]
    pub token_name: Option<String>,

    /// Whole tokens
    pub balance: Decimal,

    #[serde(default)]
    pub usd_value: Option<Decimal>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultStatus {
    Active,
    Unlocked,
    Other,
}

impl VaultStatus {
    /// Indexer status codes: 1 active, 2 unlocked
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Active,
            2 => Self::Unlocked,
            _ => Self::Other,
        }
    }
}

/// A community commitment vault as reported by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    pub id: String,
    pub owner: String,
    pub status: VaultStatus,
    pub created_at: DateTime<Utc>,
    pub unlock_time: DateTime<Utc>,

    #[serde(default)]
    pub emergency_withdrawn_at: Option<DateTime<Utc>>,

    /// Whole tokens
    pub amount: Decimal,

    pub token_symbol: String,

    #[serde(default)]
    pub message: Option<String>,
}

impl VaultRecord {
    /// Lock length in days
    pub fn lock_days(&self) -> f64 {
        (self.unlock_time - self.created_at).num_seconds() as f64 / 86_400.0
    }
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

pub(crate) fn to_decimal(value: f64) -> Decimal {
    if value.is_finite() {
        Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sentiment_bands() {
        assert_eq!(SentimentBand::from_value(25), SentimentBand::ExtremeFear);
        assert_eq!(SentimentBand::from_value(26), SentimentBand::Fear);
        assert_eq!(SentimentBand::from_value(55), SentimentBand::Neutral);
        assert_eq!(SentimentBand::from_value(75), SentimentBand::Greed);
        assert_eq!(SentimentBand::from_value(76), SentimentBand::ExtremeGreed);
        assert_eq!(sentiment_label(75), "extreme greed");
        assert_eq!(sentiment_label(24), "extreme fear");
    }

    #[test]
    fn test_request_validation() {
        assert!(CommitmentRequest::duration(dec!(1), "eth", 30.0).validate().is_ok());
        assert!(CommitmentRequest::duration(dec!(0), "ETH", 30.0).validate().is_err());
        assert!(CommitmentRequest::duration(dec!(1), "ETH", 0.0).validate().is_err());
        assert!(
            CommitmentRequest::price_band(dec!(1), "ETH", dec!(3000), dec!(-1))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_request_normalizes_symbol() {
        let request = CommitmentRequest::duration(dec!(2), "avax", 90.0);
        assert_eq!(request.token_symbol(), "AVAX");
        assert_eq!(request.amount(), dec!(2));
    }

    #[test]
    fn test_snapshot_defaults_from_json() {
        let snapshot: MarketSnapshot =
            serde_json::from_str(r#"{"symbol":"ETH","current_price":"2500"}"#).unwrap();
        assert_eq!(snapshot.market_cap, Decimal::ZERO);
        assert_eq!(snapshot.value_of(dec!(3)), dec!(7500));
    }
}
