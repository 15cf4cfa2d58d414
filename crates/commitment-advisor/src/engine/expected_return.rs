//! Expected Return
//!
//! Turns the prediction closest to the commitment duration into dollar
//! figures with a confidence-scaled best/worst case band.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::prediction::PricePrediction;
use crate::model::to_decimal;

/// Confidence assumed when no checkpoint fits inside the duration
const FLAT_CONFIDENCE: f64 = 0.25;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedReturn {
    /// Horizon of the prediction the figures derive from
    pub horizon_days: f64,

    pub initial_investment: Decimal,
    pub predicted_value: Decimal,
    pub expected_return: Decimal,
    pub expected_return_percent: Decimal,

    /// Never above the predicted value widened by the confidence range, nor
    /// above twice the expected gain
    pub best_case: Decimal,

    /// Never below 60% of the initial investment
    pub worst_case: Decimal,

    pub confidence: f64,
}

/// Dollar projection for holding `amount` tokens over `duration_days`.
///
/// Uses the first prediction within 7 days of the duration, else the last
/// one. Commitments shorter than the first checkpoint project a flat price.
pub fn calculate_expected_return(
    amount: Decimal,
    current_price: Decimal,
    predictions: &[PricePrediction],
    duration_days: f64,
) -> ExpectedReturn {
    let chosen = predictions
        .iter()
        .find(|p| (p.horizon_days - duration_days).abs() < 7.0)
        .or_else(|| predictions.last());

    let (horizon_days, predicted_price, confidence) = chosen.map_or(
        (duration_days, current_price, FLAT_CONFIDENCE),
        |p| (p.horizon_days, p.predicted_price, p.confidence),
    );

    let initial_investment = amount.saturating_mul(current_price);
    let predicted_value = amount.saturating_mul(predicted_price);
    let expected_return = predicted_value.saturating_sub(initial_investment);
    let expected_return_percent = expected_return
        .checked_div(initial_investment)
        .map_or(Decimal::ZERO, |ratio| ratio.saturating_mul(dec!(100)).round_dp(4));

    let range = to_decimal((1.0 - confidence) * 1.5);
    let best_case = predicted_value
        .saturating_mul(Decimal::ONE + range)
        .min(initial_investment.saturating_add(expected_return.saturating_mul(dec!(2))));
    let worst_case = predicted_value
        .saturating_mul(Decimal::ONE - range)
        .max(initial_investment * dec!(0.6));

    ExpectedReturn {
        horizon_days,
        initial_investment,
        predicted_value,
        expected_return,
        expected_return_percent,
        best_case,
        worst_case,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn prediction(horizon_days: f64, predicted_price: Decimal, confidence: f64) -> PricePrediction {
        PricePrediction {
            horizon_days,
            label: String::new(),
            target_date: Utc::now(),
            predicted_price,
            price_change: Decimal::ZERO,
            price_change_percentage: 0.0,
            confidence,
            factors: Vec::new(),
        }
    }

    #[test]
    fn test_picks_prediction_near_duration() {
        let predictions = vec![
            prediction(7.0, dec!(101), 0.5),
            prediction(30.0, dec!(105), 0.5),
            prediction(90.0, dec!(120), 0.5),
        ];
        let er = calculate_expected_return(dec!(10), dec!(100), &predictions, 33.0);
        assert!((er.horizon_days - 30.0).abs() < f64::EPSILON);
        assert_eq!(er.initial_investment, dec!(1000));
        assert_eq!(er.predicted_value, dec!(1050));
        assert_eq!(er.expected_return, dec!(50));
        assert_eq!(er.expected_return_percent, dec!(5));
    }

    #[test]
    fn test_falls_back_to_last_prediction() {
        let predictions = vec![prediction(7.0, dec!(101), 0.5), prediction(30.0, dec!(110), 0.5)];
        let er = calculate_expected_return(dec!(1), dec!(100), &predictions, 60.0);
        assert!((er.horizon_days - 30.0).abs() < f64::EPSILON);
        assert_eq!(er.predicted_value, dec!(110));
    }

    #[test]
    fn test_best_case_capped_at_double_gain() {
        // range = 0.75: 1100 * 1.75 = 1925, capped at 1000 + 2 * 100
        let predictions = vec![prediction(30.0, dec!(110), 0.5)];
        let er = calculate_expected_return(dec!(10), dec!(100), &predictions, 30.0);
        assert_eq!(er.best_case, dec!(1200));
        // 1100 * 0.25 = 275, floored at 600
        assert_eq!(er.worst_case, dec!(600));
    }

    #[test]
    fn test_losing_prediction_bounds() {
        let predictions = vec![prediction(90.0, dec!(80), 0.8)];
        let er = calculate_expected_return(dec!(10), dec!(100), &predictions, 90.0);
        assert_eq!(er.expected_return, dec!(-200));
        assert!(er.best_case <= er.initial_investment + er.expected_return * dec!(2));
        assert!(er.worst_case >= er.initial_investment * dec!(0.6));
        assert!(er.best_case <= er.predicted_value);
    }

    #[test]
    fn test_short_duration_projects_flat_price() {
        let er = calculate_expected_return(dec!(2), dec!(50), &[], 3.0);
        assert_eq!(er.predicted_value, dec!(100));
        assert_eq!(er.expected_return, Decimal::ZERO);
        // Low confidence widens the band past both caps
        assert_eq!(er.best_case, dec!(100));
        assert_eq!(er.worst_case, dec!(60));
    }
}
