//! Duration Commitment Scorer
//!
//! Additive rule table over duration, position size, momentum, sentiment,
//! history and market structure. Starts at 75, clamps to `[0, 100]`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::MarketContext;
use super::expected_return::{ExpectedReturn, calculate_expected_return};
use super::prediction::{PricePrediction, generate_predictions};
use super::stats::SeriesStats;
use crate::model::to_f64;

const BASE_SCORE: i32 = 75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationTier {
    HighlyRecommended,
    Recommended,
    /// Reserved tier; the score bands map straight from CAUTION to RECOMMENDED
    Neutral,
    Caution,
    NotRecommended,
}

impl RecommendationTier {
    pub const fn from_score(score: u8) -> Self {
        match score {
            85.. => Self::HighlyRecommended,
            70..=84 => Self::Recommended,
            50..=69 => Self::Caution,
            _ => Self::NotRecommended,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "HIGHLY_RECOMMENDED",
            Self::Recommended => "RECOMMENDED",
            Self::Neutral => "NEUTRAL",
            Self::Caution => "CAUTION",
            Self::NotRecommended => "NOT_RECOMMENDED",
        }
    }
}

impl std::fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Extreme => "EXTREME",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score plus the reasoning that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Within `[0, 100]`
    pub score: u8,
    pub recommendation: RecommendationTier,
    pub risk_level: RiskTier,
    pub analysis_factors: Vec<String>,
    pub behavioral_insights: Vec<String>,
    pub market_conditions: Vec<String>,
    pub fear_greed_insights: Vec<String>,
    pub optimization_suggestions: Vec<String>,
}

/// Full result of the duration path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationCommitmentAnalysis {
    #[serde(flatten)]
    pub score: ScoreResult,
    pub expected_return: ExpectedReturn,
    pub predictions: Vec<PricePrediction>,

    /// Present when a usable price history was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SeriesStats>,
}

#[derive(Default)]
struct Notes {
    factors: Vec<String>,
    behavioral: Vec<String>,
    market: Vec<String>,
    fear_greed: Vec<String>,
    optimizations: Vec<String>,
}

/// Score locking `amount` tokens for `duration_days` and project its return.
pub fn score_duration_commitment(
    ctx: &MarketContext<'_>,
    amount: Decimal,
    duration_days: f64,
) -> DurationCommitmentAnalysis {
    let snapshot = ctx.snapshot;
    let stats = ctx.stats();
    let sentiment = ctx.sentiment_value();
    let total_value = snapshot.value_of(amount);
    let change_30d = snapshot.price_change_30d;

    let mut score = BASE_SCORE;
    let mut notes = Notes::default();

    if duration_days < 30.0 {
        score -= 15;
        notes.factors.push(format!(
            "Short duration ({duration_days:.0} days) may not capture meaningful price movements"
        ));
        notes
            .behavioral
            .push("Short-term commitments often lead to emotional decision making".to_string());
    } else if duration_days > 365.0 {
        score -= 10;
        notes
            .factors
            .push(format!("Very long duration ({duration_days:.0} days) increases uncertainty"));
        notes
            .behavioral
            .push("Long-term commitments require strong conviction and patience".to_string());
    } else if (90.0..=180.0).contains(&duration_days) {
        score += 10;
        notes.factors.push(format!(
            "Optimal duration range ({duration_days:.0} days) for commitment strategies"
        ));
        notes
            .behavioral
            .push("Medium-term commitments balance opportunity and risk".to_string());
    }

    if total_value > dec!(10_000) {
        score -= 10;
        notes.factors.push(format!(
            "Large commitment value (${:.2}) increases risk exposure",
            total_value
        ));
        notes
            .behavioral
            .push("Large amounts increase emotional pressure during volatility".to_string());
    } else if total_value < dec!(100) {
        score -= 5;
        notes.factors.push(format!(
            "Small commitment value (${:.2}) may not justify lock-up",
            total_value
        ));
        notes
            .behavioral
            .push("Small commitments may not create a meaningful psychological barrier".to_string());
    }

    if change_30d < dec!(-20) {
        score += 10;
        notes.factors.push(format!(
            "Token down {:.1}% in 30 days - potential buying opportunity",
            change_30d.abs()
        ));
        notes
            .market
            .push("Asset trading significantly below recent highs".to_string());
    } else if change_30d > dec!(50) {
        score -= 10;
        notes.factors.push(format!(
            "Token up {change_30d:.1}% in 30 days - potential overheated market"
        ));
        notes
            .market
            .push("Asset trading significantly above recent averages".to_string());
    }

    match sentiment {
        Some(value) => score += apply_sentiment(value, &mut notes),
        None => notes
            .factors
            .push("Fear & Greed Index unavailable - using other market indicators".to_string()),
    }

    if let Some(stats) = &stats {
        if stats.volatility > 0.8 {
            score -= 20;
            notes.factors.push(format!(
                "High volatility ({:.1}%) increases commitment risk",
                stats.volatility * 100.0
            ));
            notes.market.push(
                "High volatility environment - consider shorter duration or smaller amount".to_string(),
            );
        } else if stats.volatility < 0.4 {
            score += 5;
            notes.factors.push(format!(
                "Low volatility ({:.1}%) supports stable commitment",
                stats.volatility * 100.0
            ));
            notes
                .market
                .push("Low volatility environment favorable for longer commitments".to_string());
        }
        if stats.max_drawdown > 0.5 {
            score -= 10;
            notes.factors.push(format!(
                "Large historical drawdown ({:.1}%) indicates downside risk",
                stats.max_drawdown * 100.0
            ));
            notes
                .market
                .push("Asset has experienced significant historical losses".to_string());
        }
    }

    if snapshot.market_cap > dec!(10_000_000_000) {
        score += 5;
        notes
            .factors
            .push("Large market cap provides stability".to_string());
    } else if snapshot.market_cap < dec!(100_000_000) {
        score -= 10;
        notes
            .factors
            .push("Small market cap increases volatility risk".to_string());
    }

    if snapshot.ath_change_percentage < dec!(-50) {
        score += 5;
        notes.factors.push(format!(
            "Trading {:.1}% below all-time high - value opportunity",
            snapshot.ath_change_percentage.abs()
        ));
    } else if snapshot.ath_change_percentage > dec!(-10) {
        score -= 5;
        notes
            .factors
            .push("Trading near all-time high - limited upside".to_string());
    }

    if duration_days >= 90.0 {
        notes.behavioral.push(
            "Longer commitments reduce the temptation to time the market".to_string(),
        );
        notes.behavioral.push(
            "Locked tokens enforce disciplined holding through volatility".to_string(),
        );
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = score.clamp(0, 100) as u8;

    suggest_optimizations(score, change_30d, total_value, sentiment, &mut notes);

    let volatility = stats.map_or(0.0, |s| s.volatility);
    let risk_level = risk_tier(to_f64(change_30d), volatility, snapshot.market_cap, sentiment);
    let recommendation = RecommendationTier::from_score(score);

    let predictions =
        generate_predictions(snapshot, stats.as_ref(), duration_days, ctx.sentiment, ctx.as_of);
    let expected_return =
        calculate_expected_return(amount, snapshot.current_price, &predictions, duration_days);

    tracing::info!(
        token = %snapshot.symbol,
        score,
        %recommendation,
        %risk_level,
        "scored duration commitment"
    );

    DurationCommitmentAnalysis {
        score: ScoreResult {
            score,
            recommendation,
            risk_level,
            analysis_factors: notes.factors,
            behavioral_insights: notes.behavioral,
            market_conditions: notes.market,
            fear_greed_insights: notes.fear_greed,
            optimization_suggestions: notes.optimizations,
        },
        expected_return,
        predictions,
        stats,
    }
}

fn apply_sentiment(value: u8, notes: &mut Notes) -> i32 {
    match value {
        0..=25 => {
            notes.factors.push(format!("Extreme Fear ({value}) - excellent buying opportunity"));
            notes
                .fear_greed
                .push("Market in extreme fear - historically a strong entry point".to_string());
            notes
                .fear_greed
                .push("Contrarian opportunity: others are fearful".to_string());
            notes
                .behavioral
                .push("Buying during extreme fear requires discipline".to_string());
            notes
                .behavioral
                .push("Locking during fear prevents panic selling".to_string());
            notes.market.push("Extreme fear market conditions".to_string());
            20
        }
        26..=45 => {
            notes.factors.push(format!("Fear ({value}) - good buying opportunity"));
            notes
                .fear_greed
                .push("Market fear suggests potential value opportunity".to_string());
            notes.market.push("Fearful market conditions".to_string());
            10
        }
        46..=55 => {
            notes.factors.push(format!("Neutral sentiment ({value})"));
            notes.fear_greed.push("Balanced market sentiment".to_string());
            notes.market.push("Neutral market conditions".to_string());
            0
        }
        56..=75 => {
            notes.factors.push(format!("Greed ({value}) - consider waiting"));
            notes.fear_greed.push("Market greed suggests caution".to_string());
            notes.market.push("Greedy market conditions".to_string());
            -10
        }
        _ => {
            notes
                .factors
                .push(format!("Extreme Greed ({value}) - high risk of correction"));
            notes
                .fear_greed
                .push("Extreme greed often precedes corrections".to_string());
            notes
                .fear_greed
                .push("Consider waiting for a better entry".to_string());
            notes.market.push("Extreme greed market conditions".to_string());
            notes
                .optimizations
                .push("Wait for market sentiment to improve before committing".to_string());
            notes
                .optimizations
                .push("Consider a shorter duration to test the waters".to_string());
            -20
        }
    }
}

fn suggest_optimizations(
    score: u8,
    change_30d: Decimal,
    total_value: Decimal,
    sentiment: Option<u8>,
    notes: &mut Notes,
) {
    let mut add = |suggestion: &str| notes.optimizations.push(suggestion.to_string());

    if score < 70 {
        add("Consider reducing the commitment amount");
        add("Shorten the lock duration to reduce risk");
    }
    if change_30d > dec!(30) {
        add("Consider waiting for a pullback before committing");
        add("Implement dollar-cost averaging instead of lump sum");
    }
    if total_value > dec!(5_000) {
        add("Add price-based unlock conditions for downside protection");
        add("Consider splitting the commitment into smaller amounts");
    }
    match sentiment {
        Some(value) if value > 75 => {
            add("Consider waiting for fear sentiment to return");
            add("Implement smaller, incremental commitments");
        }
        Some(value) if value < 25 => {
            add("Excellent timing - consider increasing commitment amount");
            add("Extend duration to capture full recovery cycle");
        }
        _ => {}
    }
}

fn risk_tier(change_30d: f64, volatility: f64, market_cap: Decimal, sentiment: Option<u8>) -> RiskTier {
    let sentiment_above = |threshold: u8| sentiment.is_some_and(|v| v > threshold);

    if change_30d > 50.0 || volatility > 0.8 || sentiment_above(75) {
        RiskTier::Extreme
    } else if change_30d > 20.0 || volatility > 0.6 || sentiment_above(60) {
        RiskTier::High
    } else if change_30d < -10.0
        && market_cap > dec!(1_000_000_000)
        && sentiment.is_some_and(|v| v < 30)
    {
        RiskTier::Low
    } else {
        RiskTier::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stats::tests::daily;
    use crate::model::{MarketSnapshot, SentimentSnapshot};
    use rust_decimal_macros::dec;

    fn eth(price: Decimal) -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::new("ETH", price);
        snapshot.market_cap = dec!(300_000_000_000);
        snapshot.ath_change_percentage = dec!(-30);
        snapshot
    }

    #[test]
    fn test_fearful_dip_is_highly_recommended() {
        let mut snapshot = MarketSnapshot::new("ETH", dec!(3000));
        snapshot.price_change_30d = dec!(-25);
        let fear = SentimentSnapshot::new(20, "Extreme Fear");
        let ctx = MarketContext::new(&snapshot).with_sentiment(Some(&fear));

        // 75 + 10 (duration) - 10 (value) + 10 (dip) + 20 (fear) - 10 (unknown cap) - 5 (ATH unknown)
        let analysis = score_duration_commitment(&ctx, dec!(10), 120.0);
        assert_eq!(analysis.score.score, 90);
        assert_eq!(analysis.score.recommendation, RecommendationTier::HighlyRecommended);
        // Market cap unknown, so LOW is not reached
        assert_eq!(analysis.score.risk_level, RiskTier::Moderate);
        assert!(
            analysis
                .score
                .optimization_suggestions
                .contains(&"Excellent timing - consider increasing commitment amount".to_string())
        );
    }

    #[test]
    fn test_score_clamped_to_hundred() {
        let mut snapshot = eth(dec!(2000));
        snapshot.price_change_30d = dec!(-25);
        snapshot.ath_change_percentage = dec!(-60);
        let fear = SentimentSnapshot::new(10, "Extreme Fear");
        let ctx = MarketContext::new(&snapshot).with_sentiment(Some(&fear));

        // 75 + 10 + 10 + 20 + 5 + 5 = 125
        let analysis = score_duration_commitment(&ctx, dec!(2), 120.0);
        assert_eq!(analysis.score.score, 100);
        assert_eq!(analysis.score.behavioral_insights.len(), 5);
        assert_eq!(analysis.score.fear_greed_insights.len(), 2);
    }

    #[test]
    fn test_low_risk_needs_large_cap_and_fear() {
        let mut snapshot = eth(dec!(3000));
        snapshot.price_change_30d = dec!(-25);
        let fear = SentimentSnapshot::new(20, "Extreme Fear");
        let ctx = MarketContext::new(&snapshot).with_sentiment(Some(&fear));

        let analysis = score_duration_commitment(&ctx, dec!(1), 120.0);
        assert_eq!(analysis.score.risk_level, RiskTier::Low);
    }

    #[test]
    fn test_neutral_baseline() {
        let snapshot = eth(dec!(2000));
        let neutral = SentimentSnapshot::new(50, "Neutral");
        let ctx = MarketContext::new(&snapshot).with_sentiment(Some(&neutral));

        // 75 + 5 (large cap); 60 days and $2000 trigger nothing else
        let analysis = score_duration_commitment(&ctx, dec!(1), 60.0);
        assert_eq!(analysis.score.score, 80);
        assert_eq!(analysis.score.recommendation, RecommendationTier::Recommended);
        assert_eq!(analysis.score.risk_level, RiskTier::Moderate);
        assert!(analysis.score.optimization_suggestions.is_empty());
    }

    #[test]
    fn test_extreme_greed_short_lock_is_not_recommended() {
        let mut snapshot = MarketSnapshot::new("DOGE", dec!(0.4));
        snapshot.price_change_30d = dec!(60);
        snapshot.ath_change_percentage = dec!(-5);
        let greed = SentimentSnapshot::new(90, "Extreme Greed");
        let ctx = MarketContext::new(&snapshot).with_sentiment(Some(&greed));

        // 75 - 15 - 5 (small value) - 10 - 20 - 10 (small cap) - 5 (near ATH)
        let analysis = score_duration_commitment(&ctx, dec!(100), 14.0);
        assert_eq!(analysis.score.score, 10);
        assert_eq!(analysis.score.recommendation, RecommendationTier::NotRecommended);
        assert_eq!(analysis.score.risk_level, RiskTier::Extreme);
        let opts = &analysis.score.optimization_suggestions;
        assert!(opts.contains(&"Wait for market sentiment to improve before committing".to_string()));
        assert!(opts.contains(&"Consider waiting for a pullback before committing".to_string()));
    }

    #[test]
    fn test_missing_sentiment_is_noted() {
        let snapshot = eth(dec!(2000));
        let ctx = MarketContext::new(&snapshot);
        let analysis = score_duration_commitment(&ctx, dec!(1), 60.0);
        assert!(
            analysis
                .score
                .analysis_factors
                .iter()
                .any(|f| f.contains("Fear & Greed Index unavailable"))
        );
        assert!(analysis.score.fear_greed_insights.is_empty());
    }

    #[test]
    fn test_no_history_predictions_pinned_low() {
        let snapshot = eth(dec!(2000));
        let empty: Vec<crate::model::PricePoint> = Vec::new();
        let ctx = MarketContext::new(&snapshot).with_series(Some(&empty));
        let analysis = score_duration_commitment(&ctx, dec!(1), 365.0);

        assert_eq!(analysis.predictions.len(), 5);
        for prediction in &analysis.predictions {
            assert!((prediction.confidence - 0.25).abs() < f64::EPSILON);
            assert!(
                prediction
                    .factors
                    .contains(&"Limited historical data available for prediction".to_string())
            );
        }
        assert!(analysis.stats.is_none());
    }

    #[test]
    fn test_volatile_history_raises_risk() {
        // Alternating +/-20% moves: far above 80% annualized
        let prices: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 120.0 }).collect();
        let series = daily(&prices);
        let snapshot = eth(dec!(100));
        let ctx = MarketContext::new(&snapshot).with_series(Some(&series));

        let analysis = score_duration_commitment(&ctx, dec!(10), 60.0);
        assert_eq!(analysis.score.risk_level, RiskTier::Extreme);
        assert!(analysis.score.analysis_factors.iter().any(|f| f.starts_with("High volatility")));
        assert!(analysis.stats.is_some());
    }

    #[test]
    fn test_expected_return_bounds_hold() {
        let snapshot = eth(dec!(2500));
        let ctx = MarketContext::new(&snapshot);
        let er = score_duration_commitment(&ctx, dec!(4), 180.0).expected_return;

        assert!(er.worst_case >= er.initial_investment * dec!(0.6));
        assert!(er.best_case <= er.initial_investment + er.expected_return * dec!(2));
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RecommendationTier::from_score(85), RecommendationTier::HighlyRecommended);
        assert_eq!(RecommendationTier::from_score(84), RecommendationTier::Recommended);
        assert_eq!(RecommendationTier::from_score(70), RecommendationTier::Recommended);
        assert_eq!(RecommendationTier::from_score(69), RecommendationTier::Caution);
        assert_eq!(RecommendationTier::from_score(50), RecommendationTier::Caution);
        assert_eq!(RecommendationTier::from_score(49), RecommendationTier::NotRecommended);
    }

    #[test]
    fn test_huge_amount_saturates_instead_of_overflowing() {
        let snapshot = eth(dec!(3000));
        let ctx = MarketContext::new(&snapshot);

        let analysis = score_duration_commitment(&ctx, dec!(100000000000000000000000000), 90.0);
        assert_eq!(analysis.expected_return.initial_investment, Decimal::MAX);
        assert!(analysis.score.score <= 100);
    }

    #[test]
    fn test_score_never_rises_with_sentiment() {
        // Unknown cap and ATH keep the score away from both clamps
        let snapshot = MarketSnapshot::new("ETH", dec!(2000));
        let score_at = |value: u8| {
            let sentiment = SentimentSnapshot::new(value, "");
            let ctx = MarketContext::new(&snapshot).with_sentiment(Some(&sentiment));
            score_duration_commitment(&ctx, dec!(1), 60.0).score.score
        };

        let scores: Vec<u8> = (10..=90).map(score_at).collect();
        assert!(scores.windows(2).all(|w| w[1] <= w[0]));
        let boundaries = [25, 26, 45, 46, 55, 56, 75, 76].map(score_at);
        assert_eq!(boundaries, [80, 70, 70, 60, 60, 50, 50, 40]);
    }

    #[test]
    fn test_score_within_bounds() {
        let prices: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 160.0 }).collect();
        let volatile = daily(&prices);

        for price in [dec!(0.01), dec!(100), dec!(3000)] {
            for change_30d in [dec!(-80), dec!(0), dec!(90)] {
                let mut snapshot = MarketSnapshot::new("ETH", price);
                snapshot.price_change_30d = change_30d;
                for value in [0, 30, 50, 70, 100] {
                    let sentiment = SentimentSnapshot::new(value, "");
                    for days in [1.0, 60.0, 120.0, 1000.0] {
                        for series in [None, Some(volatile.as_slice())] {
                            let ctx = MarketContext::new(&snapshot)
                                .with_sentiment(Some(&sentiment))
                                .with_series(series);
                            let score = score_duration_commitment(&ctx, dec!(1000), days).score.score;
                            assert!(score <= 100);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_inputs_same_analysis() {
        let prices: Vec<f64> = (0_u8..120).map(|i| 100.0 + f64::from(i % 9)).collect();
        let series = daily(&prices);
        let snapshot = eth(dec!(104));
        let fear = SentimentSnapshot::new(30, "Fear");
        let as_of = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let ctx = MarketContext::new(&snapshot)
            .with_series(Some(&series))
            .with_sentiment(Some(&fear))
            .as_of(as_of);

        assert_eq!(
            score_duration_commitment(&ctx, dec!(3), 200.0),
            score_duration_commitment(&ctx, dec!(3), 200.0)
        );
    }

    #[test]
    fn test_value_and_history_rules_fill_insights() {
        let prices: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 120.0 }).collect();
        let series = daily(&prices);
        let snapshot = eth(dec!(100));
        let ctx = MarketContext::new(&snapshot).with_series(Some(&series));

        // $20,000 locked in a choppy market
        let score = score_duration_commitment(&ctx, dec!(200), 60.0).score;
        assert!(
            score
                .behavioral_insights
                .contains(&"Large amounts increase emotional pressure during volatility".to_string())
        );
        assert!(score.market_conditions.iter().any(|c| c.starts_with("High volatility environment")));

        let small = score_duration_commitment(&ctx, dec!(0.5), 60.0).score;
        assert!(small.behavioral_insights.iter().any(|i| i.starts_with("Small commitments")));
    }
}

