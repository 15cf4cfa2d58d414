//! Wallet Behavior Analysis
//!
//! Trading-pattern metrics derived from transfer history, rolled up into a
//! risk score, a risk tolerance and personalized recommendations.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::RiskTier;
use crate::model::{Chain, MarketOverview, TokenBalance, WalletTransaction};

const DAY_SECS: f64 = 86_400.0;
const DEFAULT_HOLD_DAYS: f64 = 30.0;
const DEFAULT_VOLATILITY_TOLERANCE: f64 = 50.0;

const VOLATILE_ETH_TOKENS: [&str; 5] = ["SHIB", "DOGE", "PEPE", "FLOKI", "MEME"];
const VOLATILE_AVAX_TOKENS: [&str; 4] = ["JOE", "TIME", "SPELL", "MIM"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSizes {
    pub average: Decimal,
    pub largest: Decimal,
    pub smallest: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradingMetrics {
    pub total_transactions: usize,

    /// Round trips: half the transfers of each token, rounded down
    pub total_trades: usize,

    pub average_hold_time_days: f64,
    pub trade_frequency_per_week: f64,

    /// Share of transfers in volatile tokens, 0-100
    pub volatility_tolerance: f64,

    /// 0-100
    pub diversification_score: f64,

    pub emotional_indicators: Vec<String>,
    pub trade_sizes: TradeSizes,
    pub eth_activity_percent: f64,
    pub avax_activity_percent: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
    Extreme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketSentiment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Upward,
    Downward,
    Sideways,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub sentiment: MarketSentiment,
    pub trend_direction: TrendDirection,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletAnalysis {
    pub address: String,

    /// 0-100, higher is riskier
    pub risk_score: f64,

    /// 50-95
    pub confidence_percentage: f64,

    pub risk_profile: RiskTier,
    pub risk_tolerance: RiskTolerance,
    pub market_analysis: MarketAnalysis,
    pub metrics: TradingMetrics,
    pub recommendations: Vec<String>,
}

/// Derive trading metrics for `address` from its transfers and balances.
///
/// Failed transactions are ignored.
pub fn analyze_trading_history(
    address: &str,
    transactions: &[WalletTransaction],
    balances: &[TokenBalance],
) -> TradingMetrics {
    let mut txs: Vec<&WalletTransaction> = transactions.iter().filter(|tx| !tx.is_error).collect();
    txs.sort_by_key(|tx| tx.timestamp);

    let mut by_token: HashMap<String, Vec<&WalletTransaction>> = HashMap::new();
    for tx in &txs {
        by_token.entry(tx.token_key()).or_default().push(tx);
    }

    let total_trades = by_token.values().map(|group| group.len() / 2).sum();

    let hold_times: Vec<f64> = by_token
        .values()
        .flat_map(|group| {
            group
                .chunks_exact(2)
                .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64 / DAY_SECS)
        })
        .collect();
    let average_hold_time_days = if hold_times.is_empty() {
        DEFAULT_HOLD_DAYS
    } else {
        hold_times.iter().sum::<f64>() / hold_times.len() as f64
    };

    let trade_frequency_per_week = match (txs.first(), txs.last()) {
        (Some(first), Some(last)) if txs.len() >= 2 => {
            let weeks = (last.timestamp - first.timestamp).num_seconds() as f64 / (DAY_SECS * 7.0);
            if weeks > 0.0 { txs.len() as f64 / weeks } else { 0.0 }
        }
        _ => 0.0,
    };

    let volatility_tolerance = if txs.is_empty() {
        DEFAULT_VOLATILITY_TOLERANCE
    } else {
        let volatile = txs.iter().filter(|tx| is_volatile(tx)).count();
        volatile as f64 / txs.len() as f64 * 100.0
    };

    let mut emotional_indicators = Vec::new();
    let sells: Vec<&WalletTransaction> =
        txs.iter().copied().filter(|tx| tx.is_outgoing_from(address)).collect();
    let buys: Vec<&WalletTransaction> =
        txs.iter().copied().filter(|tx| !tx.is_outgoing_from(address)).collect();
    if has_burst(&sells) {
        emotional_indicators.push("Detected panic selling during market downturns".to_string());
    }
    if has_burst(&buys) {
        emotional_indicators.push("FOMO buying patterns detected during price rallies".to_string());
    }

    let count_on = |chain: Chain| txs.iter().filter(|tx| tx.chain == chain).count();
    let share = |n: usize| if txs.is_empty() { 0.0 } else { n as f64 / txs.len() as f64 * 100.0 };

    TradingMetrics {
        total_transactions: txs.len(),
        total_trades,
        average_hold_time_days,
        trade_frequency_per_week,
        volatility_tolerance,
        diversification_score: diversification_score(balances, &by_token),
        emotional_indicators,
        trade_sizes: trade_sizes(&txs),
        eth_activity_percent: share(count_on(Chain::Eth)),
        avax_activity_percent: share(count_on(Chain::Avax)),
    }
}

fn is_volatile(tx: &WalletTransaction) -> bool {
    let Some(symbol) = tx.token_symbol.as_deref() else {
        return false;
    };
    let symbol = symbol.to_uppercase();
    match tx.chain {
        Chain::Eth => VOLATILE_ETH_TOKENS.contains(&symbol.as_str()),
        Chain::Avax => VOLATILE_AVAX_TOKENS.contains(&symbol.as_str()),
    }
}

/// Three same-direction transfers inside 24 hours
fn has_burst(txs: &[&WalletTransaction]) -> bool {
    txs.windows(3)
        .any(|w| (w[2].timestamp - w[0].timestamp).num_seconds() < 86_400)
}

fn diversification_score(
    balances: &[TokenBalance],
    by_token: &HashMap<String, Vec<&WalletTransaction>>,
) -> f64 {
    let mut eth: HashSet<String> = HashSet::new();
    let mut avax: HashSet<String> = HashSet::new();

    let mut add = |chain: Chain, token: String| match chain {
        Chain::Eth => eth.insert(token),
        Chain::Avax => avax.insert(token),
    };
    for balance in balances {
        add(balance.chain, balance.token_address.to_lowercase());
    }
    for group in by_token.values() {
        if let Some(tx) = group.first() {
            let token = tx.token_address.as_deref().unwrap_or("NATIVE").to_lowercase();
            add(tx.chain, token);
        }
    }

    let unique = eth.len() + avax.len();
    let chain_bonus = if !eth.is_empty() && !avax.is_empty() { 20.0 } else { 0.0 };
    let token_score = match unique {
        10.. => 70.0,
        7..=9 => 50.0,
        5..=6 => 30.0,
        3..=4 => 20.0,
        _ => 10.0,
    };

    f64::min(chain_bonus + token_score, 100.0)
}

fn trade_sizes(txs: &[&WalletTransaction]) -> TradeSizes {
    let sizes: Vec<Decimal> = txs
        .iter()
        .map(|tx| tx.amount)
        .filter(|a| *a > Decimal::ZERO)
        .collect();

    let (Some(largest), Some(smallest)) = (sizes.iter().max(), sizes.iter().min()) else {
        return TradeSizes::default();
    };

    TradeSizes {
        average: sizes.iter().sum::<Decimal>() / Decimal::from(sizes.len()),
        largest: *largest,
        smallest: *smallest,
    }
}

/// Full wallet assessment from trading metrics and market context.
pub fn analyze_wallet(
    address: &str,
    transactions: &[WalletTransaction],
    balances: &[TokenBalance],
    overview: Option<&MarketOverview>,
) -> WalletAnalysis {
    let metrics = analyze_trading_history(address, transactions, balances);
    let risk_score = risk_score(&metrics);
    let market_analysis = market_analysis(overview);

    let analysis = WalletAnalysis {
        address: address.to_string(),
        risk_score,
        confidence_percentage: confidence(&metrics),
        risk_profile: risk_profile(risk_score),
        risk_tolerance: risk_tolerance(&metrics, risk_score),
        recommendations: recommendations(&metrics, risk_score, market_analysis.sentiment),
        market_analysis,
        metrics,
    };

    tracing::info!(
        address,
        risk_score = analysis.risk_score,
        profile = %analysis.risk_profile,
        "analyzed wallet"
    );
    analysis
}

fn risk_score(m: &TradingMetrics) -> f64 {
    let score = (m.trade_frequency_per_week * 5.0).min(30.0)
        + ((30.0 - m.average_hold_time_days) * 2.0).max(0.0)
        + m.volatility_tolerance * 0.3
        + ((50.0 - m.diversification_score) * 0.5).max(0.0)
        + m.emotional_indicators.len() as f64 * 10.0;
    score.clamp(0.0, 100.0)
}

fn confidence(m: &TradingMetrics) -> f64 {
    let mut confidence = 70.0;
    confidence += if m.total_trades > 100 {
        15.0
    } else if m.total_trades > 50 {
        10.0
    } else {
        -10.0
    };
    if m.average_hold_time_days > 30.0 {
        confidence += 10.0;
    }
    if m.diversification_score > 70.0 {
        confidence += 5.0;
    }
    confidence -= m.emotional_indicators.len() as f64 * 5.0;
    f64::clamp(confidence, 50.0, 95.0)
}

fn risk_profile(score: f64) -> RiskTier {
    if score < 25.0 {
        RiskTier::Low
    } else if score < 50.0 {
        RiskTier::Moderate
    } else if score < 75.0 {
        RiskTier::High
    } else {
        RiskTier::Extreme
    }
}

fn risk_tolerance(m: &TradingMetrics, risk_score: f64) -> RiskTolerance {
    let score = m.trade_frequency_per_week * 10.0
        + m.volatility_tolerance * 0.5
        + ((30.0 - m.average_hold_time_days) * 2.0).max(0.0)
        + risk_score * 0.3;

    if score < 30.0 {
        RiskTolerance::Conservative
    } else if score < 60.0 {
        RiskTolerance::Moderate
    } else if score < 90.0 {
        RiskTolerance::Aggressive
    } else {
        RiskTolerance::Extreme
    }
}

fn market_analysis(overview: Option<&MarketOverview>) -> MarketAnalysis {
    let Some(overview) = overview else {
        return MarketAnalysis {
            sentiment: MarketSentiment::Neutral,
            trend_direction: TrendDirection::Sideways,
            recommendation: "Market data unavailable. Consider waiting for clearer market signals before making significant trading decisions.".to_string(),
        };
    };

    let change = overview.market_cap_change_24h;
    let (sentiment, trend_direction) = if overview.fear_greed_index >= 60 {
        let trend = if change > 0.0 { TrendDirection::Upward } else { TrendDirection::Sideways };
        (MarketSentiment::Bullish, trend)
    } else if overview.fear_greed_index <= 40 {
        let trend = if change < 0.0 { TrendDirection::Downward } else { TrendDirection::Sideways };
        (MarketSentiment::Bearish, trend)
    } else {
        let trend = if change.abs() < 2.0 {
            TrendDirection::Sideways
        } else if change > 0.0 {
            TrendDirection::Upward
        } else {
            TrendDirection::Downward
        };
        (MarketSentiment::Neutral, trend)
    };

    let recommendation = match sentiment {
        MarketSentiment::Bullish => "Market sentiment is bullish with positive momentum. Consider gradual position building while maintaining risk management protocols.",
        MarketSentiment::Bearish => "Market sentiment is bearish. Focus on capital preservation and consider defensive strategies. Look for oversold conditions for potential opportunities.",
        MarketSentiment::Neutral => "Market sentiment is neutral. This is a good time to review and rebalance your portfolio based on your risk tolerance and investment goals.",
    };

    MarketAnalysis {
        sentiment,
        trend_direction,
        recommendation: recommendation.to_string(),
    }
}

fn recommendations(m: &TradingMetrics, risk_score: f64, sentiment: MarketSentiment) -> Vec<String> {
    let mut out = Vec::new();
    let mut add = |text: &str| out.push(text.to_string());

    if risk_score > 70.0 {
        add("Your trading patterns indicate high risk. Consider implementing strict stop-losses and reducing position sizes.");
    } else if risk_score > 50.0 {
        add("Consider diversifying your portfolio and implementing basic risk management strategies.");
    } else {
        add("Your current risk profile is well-managed. Continue with your current strategies.");
    }

    if m.trade_frequency_per_week > 5.0 {
        add("High-frequency trading may lead to increased transaction costs and emotional decisions. Consider longer holding periods.");
    }
    if m.average_hold_time_days < 14.0 {
        add("Short holding periods often indicate emotional trading. Consider implementing a minimum 30-day holding rule.");
    }
    if m.diversification_score < 50.0 {
        add("Your portfolio appears concentrated. Consider spreading investments across different assets and sectors.");
    }

    match sentiment {
        MarketSentiment::Bearish => add("Consider defensive positions, dollar-cost averaging, and focus on capital preservation."),
        MarketSentiment::Bullish => add("While markets are bullish, maintain discipline and avoid FOMO-driven decisions."),
        MarketSentiment::Neutral => {}
    }

    if !m.emotional_indicators.is_empty() {
        add("Consider using commitment vaults to lock positions and prevent emotional decisions during market volatility.");
    }

    add("Consider implementing a systematic investment plan with regular rebalancing to reduce emotional decision-making.");
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal_macros::dec;

    pub(crate) const WALLET: &str = "0xAbC0000000000000000000000000000000000001";

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    pub(crate) fn transfer(
        chain: Chain,
        symbol: &str,
        token: Option<&str>,
        offset: Duration,
        outgoing: bool,
        amount: Decimal,
    ) -> WalletTransaction {
        let (from, to) = if outgoing { (WALLET, "0xother") } else { ("0xother", WALLET) };
        WalletTransaction {
            hash: format!("0x{}", offset.num_seconds()),
            chain,
            timestamp: start() + offset,
            from: from.to_lowercase(),
            to: to.to_lowercase(),
            amount,
            token_address: token.map(str::to_string),
            token_symbol: Some(symbol.to_string()),
            is_error: false,
        }
    }

    #[test]
    fn test_empty_history_defaults() {
        let metrics = analyze_trading_history(WALLET, &[], &[]);
        assert_eq!(metrics.total_trades, 0);
        assert!((metrics.average_hold_time_days - 30.0).abs() < f64::EPSILON);
        assert!(metrics.trade_frequency_per_week.abs() < f64::EPSILON);
        assert!((metrics.volatility_tolerance - 50.0).abs() < f64::EPSILON);
        assert!((metrics.diversification_score - 10.0).abs() < f64::EPSILON);
        assert_eq!(metrics.trade_sizes, TradeSizes::default());
    }

    #[test]
    fn test_round_trips_and_hold_time() {
        let txs = vec![
            transfer(Chain::Eth, "ETH", None, Duration::days(0), false, dec!(1)),
            transfer(Chain::Eth, "ETH", None, Duration::days(10), true, dec!(1)),
            transfer(Chain::Eth, "USDC", Some("0xusdc"), Duration::days(2), false, dec!(100)),
            transfer(Chain::Eth, "USDC", Some("0xusdc"), Duration::days(22), true, dec!(50)),
            transfer(Chain::Eth, "USDC", Some("0xusdc"), Duration::days(28), false, dec!(25)),
        ];
        let metrics = analyze_trading_history(WALLET, &txs, &[]);
        assert_eq!(metrics.total_transactions, 5);
        // ETH: 1 pair, USDC: 1 pair (third transfer unpaired)
        assert_eq!(metrics.total_trades, 2);
        // (10 + 20) / 2
        assert!((metrics.average_hold_time_days - 15.0).abs() < 1e-9);
        // 5 transfers over 4 weeks
        assert!((metrics.trade_frequency_per_week - 1.25).abs() < 1e-9);
        assert_eq!(metrics.trade_sizes.largest, dec!(100));
        assert_eq!(metrics.trade_sizes.smallest, dec!(1));
        assert!((metrics.eth_activity_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bursts_flag_emotional_trading() {
        let txs: Vec<WalletTransaction> = (0..3)
            .map(|i| transfer(Chain::Avax, "JOE", Some("0xjoe"), Duration::hours(i * 2), true, dec!(10)))
            .collect();
        let metrics = analyze_trading_history(WALLET, &txs, &[]);
        assert_eq!(
            metrics.emotional_indicators,
            vec!["Detected panic selling during market downturns".to_string()]
        );
        assert!((metrics.volatility_tolerance - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_transactions_ignored() {
        let mut failed = transfer(Chain::Eth, "ETH", None, Duration::days(1), true, dec!(1));
        failed.is_error = true;
        let metrics = analyze_trading_history(WALLET, &[failed], &[]);
        assert_eq!(metrics.total_transactions, 0);
    }

    #[test]
    fn test_cross_chain_diversification() {
        let balances: Vec<TokenBalance> = ["0xa", "0xb", "0xc", "0xd"]
            .iter()
            .map(|addr| TokenBalance {
                chain: Chain::Eth,
                token_address: (*addr).to_string(),
                token_symbol: "TKN".to_string(),
                token_name: None,
                balance: dec!(1),
                usd_value: None,
            })
            .collect();
        let txs = vec![transfer(Chain::Avax, "AVAX", None, Duration::days(0), false, dec!(3))];

        let metrics = analyze_trading_history(WALLET, &txs, &balances);
        // 5 unique tokens (30) across both chains (20)
        assert!((metrics.diversification_score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quiet_holder_is_low_risk() {
        let txs = vec![
            transfer(Chain::Eth, "ETH", None, Duration::days(0), false, dec!(5)),
            transfer(Chain::Eth, "ETH", None, Duration::days(200), true, dec!(5)),
        ];
        let analysis = analyze_wallet(WALLET, &txs, &[], None);
        // freq 2/28.6 weeks * 5 + 0 + 0 + (50 - 10) * 0.5 = 20.35
        assert!(analysis.risk_score < 25.0);
        assert_eq!(analysis.risk_profile, RiskTier::Low);
        assert_eq!(analysis.risk_tolerance, RiskTolerance::Conservative);
        // 70 - 10 (few trades) + 10 (long holds)
        assert!((analysis.confidence_percentage - 70.0).abs() < f64::EPSILON);
        assert_eq!(analysis.market_analysis.sentiment, MarketSentiment::Neutral);
        assert!(analysis.recommendations.last().unwrap().contains("systematic investment plan"));
    }

    #[test]
    fn test_market_analysis_bands() {
        let overview = |index: u8, change: f64| MarketOverview {
            fear_greed_index: index,
            sentiment_label: String::new(),
            market_cap_change_24h: change,
            btc_price: Decimal::ZERO,
            btc_change_24h: 0.0,
            eth_price: Decimal::ZERO,
            eth_change_24h: 0.0,
            sol_price: Decimal::ZERO,
            sol_change_24h: 0.0,
            timestamp: Utc::now(),
        };

        let bull = market_analysis(Some(&overview(70, 3.0)));
        assert_eq!((bull.sentiment, bull.trend_direction), (MarketSentiment::Bullish, TrendDirection::Upward));

        let bear = market_analysis(Some(&overview(30, 1.0)));
        assert_eq!((bear.sentiment, bear.trend_direction), (MarketSentiment::Bearish, TrendDirection::Sideways));

        let neutral = market_analysis(Some(&overview(50, -4.0)));
        assert_eq!(neutral.trend_direction, TrendDirection::Downward);
    }
}
