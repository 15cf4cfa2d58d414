//! Price Series Statistics
//!
//! Annualized volatility, maximum drawdown and average annual return over a
//! chronologically ordered price series.

use serde::{Deserialize, Serialize};

use crate::model::PricePoint;

/// Trading days are calendar days in crypto
const DAYS_PER_YEAR: f64 = 365.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Returned by [`average_annual_return`] when the series cannot support an estimate
pub const DEFAULT_ANNUAL_RETURN: f64 = 0.1;

const MIN_ANNUAL_RETURN: f64 = -0.5;
const MAX_ANNUAL_RETURN: f64 = 2.0;

/// Annualized standard deviation of simple period returns.
///
/// Uses the population variance. Series shorter than two points, or with
/// fewer than two usable returns, have zero volatility.
pub fn volatility(series: &[PricePoint]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = series
        .windows(2)
        .filter(|w| w[0].price_usd > 0.0)
        .map(|w| (w[1].price_usd - w[0].price_usd) / w[0].price_usd)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * DAYS_PER_YEAR.sqrt()
}

/// Largest peak-to-trough decline as a fraction in `[0, 1]`.
pub fn max_drawdown(series: &[PricePoint]) -> f64 {
    let Some(first) = series.first() else {
        return 0.0;
    };
    if series.len() < 2 {
        return 0.0;
    }

    let mut peak = first.price_usd;
    let mut worst: f64 = 0.0;

    for point in series {
        if point.price_usd > peak {
            peak = point.price_usd;
        }
        if peak > 0.0 {
            worst = worst.max((peak - point.price_usd) / peak);
        }
    }

    worst.clamp(0.0, 1.0)
}

/// Endpoint return scaled to a year, clamped to `[-0.5, 2.0]`.
///
/// Falls back to [`DEFAULT_ANNUAL_RETURN`] for short series, zero-length time
/// spans, or a non-positive first price.
pub fn average_annual_return(series: &[PricePoint]) -> f64 {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return DEFAULT_ANNUAL_RETURN;
    };
    if series.len() < 2 || first.price_usd <= 0.0 {
        return DEFAULT_ANNUAL_RETURN;
    }

    let days = (last.timestamp_ms - first.timestamp_ms) as f64 / MS_PER_DAY;
    if days <= 0.0 {
        return DEFAULT_ANNUAL_RETURN;
    }

    let total_return = (last.price_usd - first.price_usd) / first.price_usd;
    (total_return * DAYS_PER_YEAR / days).clamp(MIN_ANNUAL_RETURN, MAX_ANNUAL_RETURN)
}

/// The three statistics computed together, plus the sample size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub volatility: f64,
    pub max_drawdown: f64,
    pub average_annual_return: f64,
    pub points: usize,
}

impl SeriesStats {
    pub fn compute(series: &[PricePoint]) -> Self {
        Self {
            volatility: volatility(series),
            max_drawdown: max_drawdown(series),
            average_annual_return: average_annual_return(series),
            points: series.len(),
        }
    }

    /// Statistics only count as history with at least two samples
    pub fn from_history(series: Option<&[PricePoint]>) -> Option<Self> {
        series.filter(|s| s.len() >= 2).map(Self::compute)
    }
}
