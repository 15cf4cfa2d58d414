//! Price Target Timing
//!
//! Estimates how long a price move to a target takes and how likely it is,
//! from historical statistics when available and recent momentum otherwise.

use serde::{Deserialize, Serialize};

use super::stats::SeriesStats;
use crate::model::SentimentSnapshot;

const MIN_DAYS: f64 = 7.0;
const MAX_DAYS: f64 = 730.0;
const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Timing and likelihood estimate for one price target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceTargetAnalysis {
    pub direction: Direction,
    pub current_price: f64,
    pub target_price: f64,

    /// Signed distance to the target, percent of the current price
    pub price_change_percent: f64,

    /// Estimated days to reach the target, within `[7, 730]`
    pub expected_days: u32,

    /// Within `[0.1, 0.9]`
    pub probability: f64,

    /// Within `[0.1, 0.9]`
    pub confidence: f64,

    pub risk_factors: Vec<String>,
    pub market_conditions: Vec<String>,
}

/// Estimate time and probability for the price to reach `target_price`.
///
/// `stats` should only be present for a series of at least two points; when
/// absent the estimate falls back to the 30-day change.
pub fn analyze_price_target(
    current_price: f64,
    target_price: f64,
    direction: Direction,
    stats: Option<&SeriesStats>,
    sentiment: Option<&SentimentSnapshot>,
    price_change_30d: f64,
) -> PriceTargetAnalysis {
    let price_change_percent = if current_price > 0.0 {
        (target_price - current_price) / current_price * 100.0
    } else {
        0.0
    };

    let mut risk_factors = Vec::new();
    let mut market_conditions = Vec::new();

    let (mut days, mut probability, confidence) = match stats {
        Some(stats) => {
            let vol = stats.volatility;
            let annual = stats.average_annual_return;

            let mut days = match direction {
                Direction::Up if annual > 0.0 => {
                    (price_change_percent / (annual * 100.0)).abs() * DAYS_PER_YEAR
                }
                Direction::Up => DAYS_PER_YEAR,
                Direction::Down => {
                    let daily_move = vol / DAYS_PER_YEAR.sqrt() * 100.0;
                    if daily_move > 0.0 {
                        (price_change_percent / daily_move).abs()
                    } else {
                        MAX_DAYS
                    }
                }
            };

            if vol > 0.8 {
                days *= 0.7;
                risk_factors.push(format!(
                    "High volatility ({:.1}%) increases price movement speed",
                    vol * 100.0
                ));
            } else if vol < 0.4 {
                days *= 1.3;
                market_conditions.push(format!(
                    "Low volatility ({:.1}%) suggests stable price action",
                    vol * 100.0
                ));
            }

            let mut confidence: f64 = 0.4;
            if stats.points > 100 {
                confidence += 0.2;
            }
            confidence += if vol < 0.6 { 0.1 } else { -0.1 };

            let probability = match direction {
                Direction::Up if annual > 0.2 => (0.5 + (annual - 0.2) * 2.0).min(0.8),
                Direction::Up if annual < -0.2 => (0.5 + (annual + 0.2) * 2.0).max(0.2),
                Direction::Up => 0.5,
                Direction::Down if stats.max_drawdown > 0.5 => {
                    (0.5 + (stats.max_drawdown - 0.5) * 2.0).min(0.8)
                }
                Direction::Down => (0.5 - (0.5 - stats.max_drawdown) * 2.0).max(0.2),
            };

            (days, probability, confidence.clamp(0.1, 0.8))
        }
        None => {
            let (days, probability) = match direction {
                Direction::Up if price_change_30d > 20.0 => (90.0, 0.6),
                Direction::Up if price_change_30d < -20.0 => (180.0, 0.4),
                Direction::Up => (120.0, 0.5),
                Direction::Down if price_change_30d < -20.0 => (30.0, 0.7),
                Direction::Down if price_change_30d > 20.0 => (90.0, 0.3),
                Direction::Down => (60.0, 0.5),
            };
            risk_factors.push("Limited historical data available for analysis".to_string());
            (days, probability, 0.3)
        }
    };

    if let Some(sentiment) = sentiment {
        let value = sentiment.value;
        match direction {
            Direction::Up if value <= 25 => {
                days *= 0.8;
                probability = (probability + 0.2).min(0.9);
                market_conditions
                    .push("Extreme fear sentiment favors upward price movement".to_string());
            }
            Direction::Up if value >= 75 => {
                days *= 1.5;
                probability = (probability - 0.2).max(0.1);
                risk_factors.push("Extreme greed sentiment may limit upside potential".to_string());
            }
            Direction::Down if value >= 75 => {
                days *= 0.7;
                probability = (probability + 0.2).min(0.9);
                risk_factors.push("Extreme greed sentiment increases downside risk".to_string());
            }
            Direction::Down if value <= 25 => {
                days *= 1.3;
                probability = (probability - 0.2).max(0.1);
                market_conditions
                    .push("Extreme fear sentiment may limit further downside".to_string());
            }
            _ => {}
        }
    }

    let expected_days = if days.is_finite() {
        days.clamp(MIN_DAYS, MAX_DAYS).round()
    } else {
        MAX_DAYS
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let expected_days = expected_days as u32;

    tracing::debug!(
        ?direction,
        target_price,
        expected_days,
        probability,
        "analyzed price target"
    );

    PriceTargetAnalysis {
        direction,
        current_price,
        target_price,
        price_change_percent,
        expected_days,
        probability: probability.clamp(0.1, 0.9),
        confidence: confidence.clamp(0.1, 0.9),
        risk_factors,
        market_conditions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stats::tests::daily;

    fn stats(volatility: f64, max_drawdown: f64, average_annual_return: f64, points: usize) -> SeriesStats {
        SeriesStats { volatility, max_drawdown, average_annual_return, points }
    }

    #[test]
    fn test_fallback_up_with_strong_momentum() {
        let analysis = analyze_price_target(100.0, 150.0, Direction::Up, None, None, 25.0);
        assert_eq!(analysis.expected_days, 90);
        assert!((analysis.probability - 0.6).abs() < 1e-12);
        assert!((analysis.confidence - 0.3).abs() < 1e-12);
        assert_eq!(
            analysis.risk_factors,
            vec!["Limited historical data available for analysis".to_string()]
        );
    }

    #[test]
    fn test_fallback_down_after_selloff() {
        let analysis = analyze_price_target(100.0, 80.0, Direction::Down, None, None, -30.0);
        assert_eq!(analysis.expected_days, 30);
        assert!((analysis.probability - 0.7).abs() < 1e-12);
        assert!((analysis.price_change_percent + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_up_days_from_annual_return() {
        // 50% move at 50% a year, moderate volatility: one year
        let s = stats(0.5, 0.3, 0.5, 365);
        let analysis = analyze_price_target(100.0, 150.0, Direction::Up, Some(&s), None, 0.0);
        assert_eq!(analysis.expected_days, 365);
        // 0.5 + (0.5 - 0.2) * 2 capped at 0.8
        assert!((analysis.probability - 0.8).abs() < 1e-12);
        // 0.4 + 0.2 (long series) + 0.1 (vol < 0.6)
        assert!((analysis.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_up_without_positive_return_takes_a_year_then_slows() {
        // Low volatility stretches the default year by 1.3
        let s = stats(0.3, 0.2, -0.1, 50);
        let analysis = analyze_price_target(100.0, 110.0, Direction::Up, Some(&s), None, 0.0);
        assert_eq!(analysis.expected_days, 475);
        assert!((analysis.probability - 0.5).abs() < 1e-12);
        assert_eq!(analysis.market_conditions.len(), 1);
    }

    #[test]
    fn test_down_days_from_daily_move() {
        // vol = sqrt(365) * 0.05 gives a 5% daily move; 20% drop in 4 days, clamped to 7
        let s = stats(365_f64.sqrt() * 0.05, 0.6, 0.1, 200);
        let analysis = analyze_price_target(100.0, 80.0, Direction::Down, Some(&s), None, 0.0);
        assert_eq!(analysis.expected_days, 7);
        assert!((analysis.probability - 0.7).abs() < 1e-9);
        assert!(analysis.risk_factors[0].starts_with("High volatility"));
    }

    #[test]
    fn test_flat_series_down_target_is_far_away() {
        let series = daily(&[100.0; 30]);
        let s = SeriesStats::compute(&series);
        let analysis = analyze_price_target(100.0, 90.0, Direction::Down, Some(&s), None, 0.0);
        assert_eq!(analysis.expected_days, 730);
    }

    #[test]
    fn test_extreme_fear_speeds_up_target() {
        let fear = SentimentSnapshot::new(20, "Extreme Fear");
        let base = analyze_price_target(100.0, 150.0, Direction::Up, None, None, 0.0);
        let adjusted = analyze_price_target(100.0, 150.0, Direction::Up, None, Some(&fear), 0.0);
        assert_eq!(base.expected_days, 120);
        assert_eq!(adjusted.expected_days, 96);
        assert!((adjusted.probability - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_greed_speeds_down_target() {
        let greed = SentimentSnapshot::new(80, "Extreme Greed");
        let adjusted = analyze_price_target(100.0, 80.0, Direction::Down, None, Some(&greed), 0.0);
        assert_eq!(adjusted.expected_days, 42);
        assert!((adjusted.probability - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_outputs_stay_in_bounds() {
        let s = stats(2.0, 0.95, 2.0, 1000);
        let greed = SentimentSnapshot::new(99, "Extreme Greed");
        for direction in [Direction::Up, Direction::Down] {
            let target = if direction == Direction::Up { 10_000.0 } else { 1.0 };
            let a = analyze_price_target(100.0, target, direction, Some(&s), Some(&greed), 0.0);
            assert!((7..=730).contains(&a.expected_days));
            assert!((0.1..=0.9).contains(&a.probability));
            assert!((0.1..=0.9).contains(&a.confidence));
        }
    }
}
