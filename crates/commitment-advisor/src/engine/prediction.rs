//! Price Predictions
//!
//! Projects the token price at a ladder of checkpoints up to the commitment
//! duration. Drift comes from the historical annual return when a series is
//! available, otherwise from a flat 15% a year adjusted by momentum and size.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::stats::SeriesStats;
use crate::model::{MarketSnapshot, SentimentSnapshot, to_decimal, to_f64};

const CHECKPOINTS: [(f64, &str); 5] = [
    (7.0, "1 week"),
    (30.0, "1 month"),
    (90.0, "3 months"),
    (180.0, "6 months"),
    (365.0, "1 year"),
];

/// Annual drift assumed without price history
const BASELINE_ANNUAL_DRIFT: f64 = 0.15;

/// Projected price at one checkpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    pub horizon_days: f64,
    pub label: String,

    /// `as_of` plus the horizon
    pub target_date: DateTime<Utc>,

    pub predicted_price: Decimal,
    pub price_change: Decimal,
    pub price_change_percentage: f64,

    /// Within `[0.1, 0.8]`
    pub confidence: f64,

    pub factors: Vec<String>,
}

/// Checkpoints (days, label) that fit inside `duration_days`.
///
/// Durations beyond a year get one extra checkpoint at the exact duration.
pub fn prediction_horizons(duration_days: f64) -> Vec<(f64, String)> {
    let mut horizons: Vec<(f64, String)> = CHECKPOINTS
        .iter()
        .filter(|(days, _)| *days <= duration_days)
        .map(|(days, label)| (*days, (*label).to_string()))
        .collect();

    if duration_days > 365.0 {
        horizons.push((duration_days, format!("{:.0} months", (duration_days / 30.0).round())));
    }

    horizons
}

fn sentiment_multiplier(value: u8) -> (f64, &'static str) {
    match value {
        0..=25 => (1.2, "Extreme fear sentiment suggests strong recovery potential"),
        26..=45 => (1.1, "Fear sentiment indicates potential recovery"),
        75.. => (0.6, "Extreme greed suggests potential market correction"),
        60..=74 => (0.8, "Greed sentiment suggests potential pullback"),
        _ => (1.0, ""),
    }
}

/// Project prices for every checkpoint up to `duration_days`.
pub fn generate_predictions(
    snapshot: &MarketSnapshot,
    stats: Option<&SeriesStats>,
    duration_days: f64,
    sentiment: Option<&SentimentSnapshot>,
    as_of: DateTime<Utc>,
) -> Vec<PricePrediction> {
    let current = snapshot.current_price;

    prediction_horizons(duration_days)
        .into_iter()
        .map(|(horizon, label)| {
            let (growth, confidence, factors) = match stats {
                Some(stats) => historical_projection(stats, horizon, &label, sentiment),
                None => baseline_projection(snapshot, horizon),
            };

            let predicted_price = current
                .saturating_mul(to_decimal(1.0 + growth))
                .round_dp(8)
                .max(Decimal::ZERO);
            let price_change = predicted_price - current;
            let price_change_percentage = price_change
                .checked_div(current)
                .map_or(0.0, |ratio| to_f64(ratio.saturating_mul(dec!(100))));

            #[allow(clippy::cast_possible_truncation)]
            let target_date = Duration::try_milliseconds((horizon * 86_400_000.0) as i64)
                .and_then(|offset| as_of.checked_add_signed(offset))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);

            PricePrediction {
                horizon_days: horizon,
                label,
                target_date,
                predicted_price,
                price_change,
                price_change_percentage,
                confidence,
                factors,
            }
        })
        .collect()
}

fn historical_projection(
    stats: &SeriesStats,
    horizon: f64,
    label: &str,
    sentiment: Option<&SentimentSnapshot>,
) -> (f64, f64, Vec<String>) {
    let expected = stats.average_annual_return * horizon / 365.0;

    let mut factors = vec![
        format!("Historical volatility: {:.1}%", stats.volatility * 100.0),
        format!("Average annual return: {:.1}%", stats.average_annual_return * 100.0),
    ];

    let mut multiplier = 1.0;
    if let Some(sentiment) = sentiment {
        let (m, note) = sentiment_multiplier(sentiment.value);
        multiplier = m;
        if !note.is_empty() {
            factors.push(note.to_string());
        }
    }

    let growth = expected * multiplier;
    factors.push(format!("Expected return for {label}: {:.1}%", growth * 100.0));

    let mut confidence: f64 = 0.4;
    if horizon < 30.0 {
        confidence += 0.2;
    }
    confidence += if stats.volatility < 0.5 { 0.1 } else { -0.1 };
    confidence += if stats.points > 100 { 0.1 } else { -0.1 };
    if sentiment.is_some() {
        confidence += 0.1;
    }

    (growth, confidence.clamp(0.1, 0.8), factors)
}

fn baseline_projection(snapshot: &MarketSnapshot, horizon: f64) -> (f64, f64, Vec<String>) {
    let mut factors = vec!["Limited historical data available for prediction".to_string()];
    let mut multiplier = 1.0;

    if snapshot.price_change_30d > dec!(20) {
        multiplier = 0.7;
        factors.push("Recent strong gains suggest potential pullback".to_string());
    } else if snapshot.price_change_30d < dec!(-20) {
        multiplier = 1.1;
        factors.push("Recent losses suggest potential recovery".to_string());
    }

    if snapshot.market_cap > dec!(10_000_000_000) {
        multiplier *= 0.9;
        factors.push("Large market cap suggests slower growth".to_string());
    } else if snapshot.market_cap < dec!(100_000_000) {
        multiplier *= 1.2;
        factors.push("Small market cap suggests higher growth potential".to_string());
    }

    (horizon / 365.0 * BASELINE_ANNUAL_DRIFT * multiplier, 0.25, factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn as_of() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_horizons_filtered_by_duration() {
        let days: Vec<f64> = prediction_horizons(90.0).iter().map(|(d, _)| *d).collect();
        assert_eq!(days, vec![7.0, 30.0, 90.0]);
        assert!(prediction_horizons(5.0).is_empty());
    }

    #[test]
    fn test_long_duration_appends_exact_checkpoint() {
        let horizons = prediction_horizons(730.0);
        assert_eq!(horizons.len(), 6);
        assert_eq!(horizons[5], (730.0, "24 months".to_string()));
    }

    #[test]
    fn test_baseline_projection_for_large_cap() {
        let mut snapshot = MarketSnapshot::new("ETH", dec!(1000));
        snapshot.market_cap = dec!(300_000_000_000);

        let predictions = generate_predictions(&snapshot, None, 365.0, None, as_of());
        let year = predictions.last().unwrap();
        assert_eq!(year.label, "1 year");
        // 15% drift, 0.9 for a large cap
        assert_eq!(year.predicted_price, dec!(1135));
        assert_eq!(year.price_change, dec!(135));
        assert!((year.confidence - 0.25).abs() < f64::EPSILON);
        assert!(year.factors.iter().any(|f| f.contains("Large market cap")));
        assert_eq!(year.target_date, as_of() + Duration::days(365));
    }

    #[test]
    fn test_historical_projection_with_fear() {
        let snapshot = MarketSnapshot::new("BTC", dec!(100));
        let stats = SeriesStats {
            volatility: 0.4,
            max_drawdown: 0.2,
            average_annual_return: 0.365,
            points: 365,
        };
        let fear = SentimentSnapshot::new(20, "Extreme Fear");

        let predictions = generate_predictions(&snapshot, Some(&stats), 30.0, Some(&fear), as_of());
        assert_eq!(predictions.len(), 2);

        // 0.365 * 30 / 365 = 3%, times 1.2 = 3.6%
        let month = &predictions[1];
        assert_eq!(month.predicted_price, dec!(103.6));
        // 0.4 + 0.1 + 0.1 + 0.1
        assert!((month.confidence - 0.7).abs() < 1e-9);

        // The week checkpoint also gets the short-horizon boost, capped at 0.8
        assert!((predictions[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_prices_never_negative() {
        let snapshot = MarketSnapshot::new("XYZ", dec!(10));
        let stats = SeriesStats {
            volatility: 1.5,
            max_drawdown: 0.9,
            average_annual_return: -0.5,
            points: 400,
        };
        let predictions = generate_predictions(&snapshot, Some(&stats), 3650.0, None, as_of());
        assert!(predictions.iter().all(|p| p.predicted_price >= Decimal::ZERO));
    }

    #[test]
    fn test_target_date_saturates_past_calendar_end() {
        let snapshot = MarketSnapshot::new("ETH", dec!(2000));
        let predictions = generate_predictions(&snapshot, None, 365.0 * 300_000.0, None, as_of());

        assert_eq!(predictions.len(), 6);
        assert_eq!(predictions[5].target_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(predictions[4].target_date, as_of() + Duration::days(365));
    }
}
