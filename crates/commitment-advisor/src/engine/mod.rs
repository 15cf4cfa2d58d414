//! Commitment Engine
//!
//! Pure, synchronous analysis of token lock commitments. Every function
//! here works on already-fetched market data and never fails for missing
//! optional inputs; it lowers confidence instead.
//!
//! ```text
//! CommitmentRequest
//!   ├─ Duration ──► scorer ──► stats, prediction, expected_return
//!   └─ PriceBand ─► price_band ──► price_target ──► stats
//! ```

pub mod expected_return;
pub mod prediction;
pub mod price_band;
pub mod price_target;
pub mod scorer;
pub mod stats;

pub use expected_return::{ExpectedReturn, calculate_expected_return};
pub use prediction::{PricePrediction, generate_predictions};
pub use price_band::{PriceBandAnalysis, ScenarioReturns, TimeToTargets, analyze_price_band_commitment};
pub use price_target::{Direction, PriceTargetAnalysis, analyze_price_target};
pub use scorer::{
    DurationCommitmentAnalysis, RecommendationTier, RiskTier, ScoreResult, score_duration_commitment,
};
pub use stats::SeriesStats;

use chrono::{DateTime, Utc};

use crate::model::{MarketSnapshot, PricePoint, SentimentSnapshot};

/// Market inputs for one analysis.
#[derive(Clone, Copy, Debug)]
pub struct MarketContext<'a> {
    pub snapshot: &'a MarketSnapshot,
    pub series: Option<&'a [PricePoint]>,
    pub sentiment: Option<&'a SentimentSnapshot>,

    /// Anchor for prediction target dates
    pub as_of: DateTime<Utc>,
}

impl<'a> MarketContext<'a> {
    pub fn new(snapshot: &'a MarketSnapshot) -> Self {
        Self {
            snapshot,
            series: None,
            sentiment: None,
            as_of: Utc::now(),
        }
    }

    #[must_use]
    pub const fn with_series(mut self, series: Option<&'a [PricePoint]>) -> Self {
        self.series = series;
        self
    }

    #[must_use]
    pub const fn with_sentiment(mut self, sentiment: Option<&'a SentimentSnapshot>) -> Self {
        self.sentiment = sentiment;
        self
    }

    #[must_use]
    pub const fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    /// Series statistics, when the series has at least two points
    pub fn stats(&self) -> Option<SeriesStats> {
        SeriesStats::from_history(self.series)
    }

    pub fn sentiment_value(&self) -> Option<u8> {
        self.sentiment.map(|s| s.value)
    }
}
