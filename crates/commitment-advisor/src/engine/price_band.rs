//! Price Band Commitments
//!
//! A lock that releases when the price reaches either an upper or a lower
//! target. Both exits are timed with the price target analyzer and combined
//! into scenario returns and a point-based risk tier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MarketContext;
use super::price_target::{Direction, PriceTargetAnalysis, analyze_price_target};
use super::scorer::RiskTier;
use crate::error::{AdvisorError, Result};
use crate::model::to_f64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReturns {
    /// Percent return if the up target is hit
    pub up_scenario: f64,
    /// Percent return if the down target is hit
    pub down_scenario: f64,
    /// Probability-weighted return, as a fraction
    pub weighted_average: f64,
    pub best_case: f64,
    pub worst_case: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeToTargets {
    pub up_target: u32,
    pub down_target: u32,
    pub average_time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBandAnalysis {
    pub token_symbol: String,
    pub amount: Decimal,
    pub current_price: Decimal,
    pub up_target: Decimal,
    pub down_target: Decimal,
    pub up_analysis: PriceTargetAnalysis,
    pub down_analysis: PriceTargetAnalysis,
    pub overall_risk: RiskTier,
    pub expected_return: ScenarioReturns,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub time_to_reach_targets: TimeToTargets,
}

/// Analyze locking `amount` tokens until the price exits `[down_target, up_target]`.
///
/// Fails with [`AdvisorError::Validation`] unless
/// `up_target > current price > down_target`.
pub fn analyze_price_band_commitment(
    ctx: &MarketContext<'_>,
    amount: Decimal,
    up_target: Decimal,
    down_target: Decimal,
) -> Result<PriceBandAnalysis> {
    let snapshot = ctx.snapshot;
    let current = snapshot.current_price;

    if up_target <= current {
        return Err(AdvisorError::Validation(format!(
            "Up target (${up_target}) must be higher than current price (${current})"
        )));
    }
    if down_target >= current {
        return Err(AdvisorError::Validation(format!(
            "Down target (${down_target}) must be lower than current price (${current})"
        )));
    }

    let stats = ctx.stats();
    let current_f = to_f64(current);
    let change_30d = to_f64(snapshot.price_change_30d);

    let up = analyze_price_target(
        current_f,
        to_f64(up_target),
        Direction::Up,
        stats.as_ref(),
        ctx.sentiment,
        change_30d,
    );
    let down = analyze_price_target(
        current_f,
        to_f64(down_target),
        Direction::Down,
        stats.as_ref(),
        ctx.sentiment,
        change_30d,
    );

    let up_return = up.price_change_percent;
    let down_return = down.price_change_percent;
    let expected_return = ScenarioReturns {
        up_scenario: up_return,
        down_scenario: down_return,
        weighted_average: (up_return * up.probability + down_return * down.probability) / 100.0,
        best_case: up_return.max(down_return),
        worst_case: up_return.min(down_return),
    };

    let volatility = stats.map_or(0.0, |s| s.volatility);
    let sentiment = ctx.sentiment_value();
    let overall_risk = band_risk(&up, &down, volatility, sentiment);

    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    if up.probability > 0.7 {
        insights.push(format!(
            "High probability ({:.0}%) of reaching up target in {} days",
            up.probability * 100.0,
            up.expected_days
        ));
    } else if up.probability < 0.3 {
        insights.push(format!(
            "Low probability ({:.0}%) of reaching up target - consider adjusting target",
            up.probability * 100.0
        ));
        recommendations
            .push("Consider lowering the up target for higher probability of success".to_string());
    }

    if down.probability > 0.7 {
        insights.push(format!(
            "High probability ({:.0}%) of reaching down target in {} days",
            down.probability * 100.0,
            down.expected_days
        ));
    } else if down.probability < 0.3 {
        insights.push(format!(
            "Low probability ({:.0}%) of reaching down target - good downside protection",
            down.probability * 100.0
        ));
    }

    if up.expected_days > 365 {
        insights.push(format!(
            "Up target may take over a year to reach ({} days)",
            up.expected_days
        ));
        recommendations.push("Consider a shorter-term commitment or lower up target".to_string());
    }

    if down.expected_days < 30 {
        insights.push("Down target could be reached quickly - high risk of early exit".to_string());
        recommendations.push("Consider setting a lower down target for better protection".to_string());
    }

    match sentiment {
        Some(value) if value <= 25 => {
            insights.push("Extreme fear sentiment favors upward price movement".to_string());
            recommendations
                .push("Good timing for a commitment - fear often precedes recovery".to_string());
        }
        Some(value) if value >= 75 => {
            insights.push("Extreme greed sentiment increases correction risk".to_string());
            recommendations
                .push("Consider waiting for sentiment to cool before committing".to_string());
        }
        _ => {}
    }

    if up_return.abs() > 100.0 {
        insights.push("Large potential gains but also high volatility risk".to_string());
        recommendations.push("Consider implementing stop-loss mechanisms".to_string());
    }

    if down_return.abs() > 50.0 {
        insights.push("Significant downside risk - ensure this represents acceptable loss".to_string());
        recommendations.push("Consider reducing the commitment amount".to_string());
    }

    let time_to_reach_targets = TimeToTargets {
        up_target: up.expected_days,
        down_target: down.expected_days,
        average_time: f64::from(up.expected_days + down.expected_days) / 2.0,
    };

    tracing::info!(
        token = %snapshot.symbol,
        %overall_risk,
        weighted = expected_return.weighted_average,
        "analyzed price band commitment"
    );

    Ok(PriceBandAnalysis {
        token_symbol: snapshot.symbol.clone(),
        amount,
        current_price: current,
        up_target,
        down_target,
        up_analysis: up,
        down_analysis: down,
        overall_risk,
        expected_return,
        insights,
        recommendations,
        time_to_reach_targets,
    })
}

fn band_risk(
    up: &PriceTargetAnalysis,
    down: &PriceTargetAnalysis,
    volatility: f64,
    sentiment: Option<u8>,
) -> RiskTier {
    let up_risk = match up.expected_days {
        366.. => 2,
        181..=365 => 1,
        _ => 0,
    };
    let down_risk = match down.expected_days {
        0..=29 => 2,
        30..=89 => 1,
        _ => 0,
    };
    let volatility_risk = if volatility > 0.8 {
        2
    } else if volatility > 0.6 {
        1
    } else {
        0
    };
    let sentiment_risk = match sentiment {
        Some(v) if v > 75 => 2,
        Some(v) if v > 60 => 1,
        _ => 0,
    };

    match up_risk + down_risk + volatility_risk + sentiment_risk {
        6.. => RiskTier::Extreme,
        4..=5 => RiskTier::High,
        0..=1 => RiskTier::Low,
        _ => RiskTier::Moderate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stats::tests::daily;
    use crate::model::{MarketSnapshot, SentimentSnapshot};
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejects_inverted_band() {
        let snapshot = MarketSnapshot::new("ETH", dec!(2500));
        let ctx = MarketContext::new(&snapshot);

        let err = analyze_price_band_commitment(&ctx, dec!(1), dec!(2400), dec!(2000)).unwrap_err();
        assert!(matches!(err, AdvisorError::Validation(_)));
        assert!(err.to_string().contains("Up target"));

        let err = analyze_price_band_commitment(&ctx, dec!(1), dec!(3000), dec!(2500)).unwrap_err();
        assert!(err.to_string().contains("Down target"));
    }

    #[test]
    fn test_symmetric_band_without_history() {
        let snapshot = MarketSnapshot::new("ETH", dec!(2500));
        let ctx = MarketContext::new(&snapshot);

        let analysis =
            analyze_price_band_commitment(&ctx, dec!(3), dec!(3000), dec!(2000)).unwrap();
        let returns = &analysis.expected_return;
        assert!((returns.up_scenario - 20.0).abs() < 1e-9);
        assert!((returns.down_scenario + 20.0).abs() < 1e-9);
        // Both fallbacks sit at 0.5 probability
        assert!(returns.weighted_average.abs() < 1e-9);
        assert!((returns.best_case - 20.0).abs() < 1e-9);
        assert!((returns.worst_case + 20.0).abs() < 1e-9);

        assert_eq!(analysis.time_to_reach_targets.up_target, 120);
        assert_eq!(analysis.time_to_reach_targets.down_target, 60);
        assert!((analysis.time_to_reach_targets.average_time - 90.0).abs() < f64::EPSILON);
        // Down target within 90 days is the only risk point
        assert_eq!(analysis.overall_risk, RiskTier::Low);
    }

    #[test]
    fn test_weighted_average_uses_probabilities() {
        let mut snapshot = MarketSnapshot::new("SOL", dec!(100));
        snapshot.price_change_30d = dec!(30);
        let ctx = MarketContext::new(&snapshot);

        let analysis = analyze_price_band_commitment(&ctx, dec!(5), dec!(150), dec!(80)).unwrap();
        // (50 * 0.6 + -20 * 0.3) / 100
        assert!((analysis.expected_return.weighted_average - 0.24).abs() < 1e-9);
        assert!(analysis.up_analysis.probability > analysis.down_analysis.probability);
    }

    #[test]
    fn test_greedy_volatile_market_is_extreme() {
        let prices: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 125.0 }).collect();
        let series = daily(&prices);
        let snapshot = MarketSnapshot::new("PEPE", dec!(100));
        let greed = SentimentSnapshot::new(85, "Extreme Greed");
        let ctx = MarketContext::new(&snapshot)
            .with_series(Some(&series))
            .with_sentiment(Some(&greed));

        let analysis = analyze_price_band_commitment(&ctx, dec!(1), dec!(300), dec!(90)).unwrap();
        // volatility 2 + sentiment 2 + fast down target 2
        assert_eq!(analysis.overall_risk, RiskTier::Extreme);
        assert!(
            analysis
                .recommendations
                .contains(&"Consider implementing stop-loss mechanisms".to_string())
        );
        assert!(
            analysis
                .insights
                .contains(&"Down target could be reached quickly - high risk of early exit".to_string())
        );
    }

    #[test]
    fn test_deep_down_target_flags_downside() {
        let snapshot = MarketSnapshot::new("ETH", dec!(2000));
        let ctx = MarketContext::new(&snapshot);
        let analysis = analyze_price_band_commitment(&ctx, dec!(1), dec!(2200), dec!(500)).unwrap();
        assert!(
            analysis
                .recommendations
                .contains(&"Consider reducing the commitment amount".to_string())
        );
    }

    #[test]
    fn test_same_band_same_analysis() {
        let prices: Vec<f64> = (0_u8..90).map(|i| 200.0 + f64::from(i % 11) * 3.0).collect();
        let series = daily(&prices);
        let snapshot = MarketSnapshot::new("AVAX", dec!(215));
        let greed = SentimentSnapshot::new(68, "Greed");
        let ctx = MarketContext::new(&snapshot)
            .with_series(Some(&series))
            .with_sentiment(Some(&greed));

        let first = analyze_price_band_commitment(&ctx, dec!(12), dec!(260), dec!(180)).unwrap();
        let second = analyze_price_band_commitment(&ctx, dec!(12), dec!(260), dec!(180)).unwrap();
        assert_eq!(first, second);
    }
}

