//! Report Rendering
//!
//! Analysis results paired with the market inputs they were computed
//! from, rendered as Markdown for chat clients.

use std::fmt::Write;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::behavior::{MarketSentiment, RiskTolerance, TrendDirection, VaultsAnalysis, WalletAnalysis};
use crate::engine::{DurationCommitmentAnalysis, PriceBandAnalysis, PriceTargetAnalysis, RecommendationTier, RiskTier};
use crate::model::{
    DurationCommitment, MarketOverview, MarketSnapshot, PriceBandCommitment, SentimentSnapshot, to_f64,
};

/// Duration commitment analysis with its inputs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DurationReport {
    pub request: DurationCommitment,
    pub snapshot: MarketSnapshot,
    pub sentiment: Option<SentimentSnapshot>,
    pub analysis: DurationCommitmentAnalysis,
}

/// Price band commitment analysis with its inputs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceBandReport {
    pub request: PriceBandCommitment,
    pub snapshot: MarketSnapshot,
    pub sentiment: Option<SentimentSnapshot>,
    pub analysis: PriceBandAnalysis,
}

/// A result that can be shown to a user
pub trait Report: Serialize {
    /// Markdown body
    fn render(&self) -> String;

    /// One-line summary for logs and agent thoughts
    fn thought(&self) -> String;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitmentReport {
    Duration(DurationReport),
    PriceBand(PriceBandReport),
}

impl Report for CommitmentReport {
    fn render(&self) -> String {
        match self {
            Self::Duration(r) => r.render(),
            Self::PriceBand(r) => r.render(),
        }
    }

    fn thought(&self) -> String {
        match self {
            Self::Duration(r) => format!(
                "Scored locking {} {} for {} days at {}/100 ({})",
                r.request.amount,
                r.request.token_symbol,
                days(r.request.duration_days),
                r.analysis.score.score,
                r.analysis.score.recommendation,
            ),
            Self::PriceBand(r) => format!(
                "Analyzed {} band ${} / ${}: {} risk, weighted return {}%",
                r.request.token_symbol,
                r.request.up_target,
                r.request.down_target,
                r.analysis.overall_risk,
                signed(r.analysis.expected_return.weighted_average),
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletReport {
    pub analysis: WalletAnalysis,
    pub overview: Option<MarketOverview>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultsReport {
    pub analysis: VaultsAnalysis,
    pub overview: Option<MarketOverview>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketReport {
    pub overview: MarketOverview,
}

// ============================================================================
// Formatting helpers
// ============================================================================

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

fn days(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn bullets(items: &[String]) -> String {
    items.iter().map(|i| format!("• {i}")).collect::<Vec<_>>().join("\n")
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(n, i)| format!("{}. {i}", n + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn millions(value: Decimal) -> String {
    format!("{:.2}", value / Decimal::from(1_000_000))
}

fn fear_greed_line(sentiment: Option<&SentimentSnapshot>) -> String {
    sentiment.map_or_else(String::new, |s| {
        let face = match s.value {
            0..=25 => "😱",
            26..=45 => "😨",
            46..=55 => "😐",
            56..=75 => "😏",
            _ => "🤪",
        };
        format!("**Fear & Greed Index:** {} ({}) {face}\n\n", s.value, s.classification)
    })
}

const fn risk_marker(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::Low => "🟢",
        RiskTier::Moderate => "🟡",
        RiskTier::High => "🟠",
        RiskTier::Extreme => "🔴",
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars
        .next()
        .map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

// ============================================================================
// Commitments
// ============================================================================

impl DurationReport {
    pub fn render(&self) -> String {
        let score = &self.analysis.score;
        let er = &self.analysis.expected_return;
        let snap = &self.snapshot;

        let (marker, verdict) = match score.recommendation {
            RecommendationTier::HighlyRecommended => ("🌟", "This is an excellent commitment strategy"),
            RecommendationTier::Recommended | RecommendationTier::Neutral => ("✅", "This is a solid commitment"),
            RecommendationTier::Caution => ("⚠️", "I recommend reconsidering this commitment"),
            RecommendationTier::NotRecommended => ("❌", "I strongly advise against this commitment"),
        };

        let scenario_pct = |value: Decimal| {
            if er.initial_investment.is_zero() {
                signed(0.0)
            } else {
                signed(to_f64((value - er.initial_investment) / er.initial_investment * Decimal::ONE_HUNDRED))
            }
        };

        let mut s = String::new();
        let _ = writeln!(s, "{marker} **Commitment Analysis**\n");
        let _ = writeln!(
            s,
            "**Proposal:** Lock {} {} for {} days",
            self.request.amount,
            self.request.token_symbol,
            days(self.request.duration_days)
        );
        let _ = writeln!(
            s,
            "**Current Price:** ${:.2} ({}% 24h)",
            snap.current_price,
            signed(to_f64(snap.price_change_24h))
        );
        let _ = writeln!(s, "**Total Value:** ${:.2}", snap.value_of(self.request.amount));
        let _ = writeln!(s, "**Commitment Score:** {}/100\n", score.score);
        s.push_str(&fear_greed_line(self.sentiment.as_ref()));

        s.push_str("**Market Context:**\n");
        let _ = writeln!(s, "• 7-day change: {}%", signed(to_f64(snap.price_change_7d)));
        let _ = writeln!(s, "• 30-day change: {}%", signed(to_f64(snap.price_change_30d)));
        let _ = writeln!(s, "• Market Cap: ${}M", millions(snap.market_cap));
        let _ = writeln!(s, "• 24h Volume: ${}M\n", millions(snap.volume_24h));

        s.push_str("**📈 Expected Return Analysis:**\n");
        let _ = writeln!(s, "• **Initial Investment:** ${:.2}", er.initial_investment);
        let _ = writeln!(s, "• **Predicted Value:** ${:.2}", er.predicted_value);
        let _ = writeln!(
            s,
            "• **Expected Return:** ${:.2} ({}%)",
            er.expected_return,
            signed(to_f64(er.expected_return_percent))
        );
        let _ = writeln!(s, "• **Best Case:** ${:.2} ({}%)", er.best_case, scenario_pct(er.best_case));
        let _ = writeln!(s, "• **Worst Case:** ${:.2} ({}%)", er.worst_case, scenario_pct(er.worst_case));
        let _ = writeln!(s, "• **Confidence:** {:.2}%\n", er.confidence * 100.0);

        s.push_str("**📊 Price Predictions:**\n");
        for p in &self.analysis.predictions {
            let marker = if p.confidence >= 0.7 {
                "🟢"
            } else if p.confidence >= 0.5 {
                "🟡"
            } else {
                "🔴"
            };
            let _ = writeln!(
                s,
                "• {} ({}): ${:.2} ({}%) {marker}",
                p.label,
                p.target_date.format("%b %-d, %Y"),
                p.predicted_price,
                signed(p.price_change_percentage)
            );
        }

        let _ = writeln!(s, "\n**Analysis:**\n{}\n", bullets(&score.analysis_factors));
        let _ = writeln!(s, "**Risk Level:** {} {}\n", score.risk_level, risk_marker(score.risk_level));
        let _ = writeln!(s, "**Behavioral Insights:**\n{}\n", bullets(&score.behavioral_insights));
        let _ = writeln!(s, "**Market Conditions:**\n{}\n", bullets(&score.market_conditions));

        s.push_str("**Fear & Greed Insights:**\n");
        if score.fear_greed_insights.is_empty() {
            s.push_str("• Market sentiment data unavailable\n\n");
        } else {
            let _ = writeln!(s, "{}\n", numbered(&score.fear_greed_insights));
        }

        let _ = writeln!(s, "**Recommendation:** {verdict}\n");
        let _ = write!(s, "**Suggested Optimizations:**\n{}", numbered(&score.optimization_suggestions));
        s
    }
}

fn target_section(s: &mut String, title: &str, target: Decimal, scenario: f64, a: &PriceTargetAnalysis) {
    let join_or = |items: &[String], fallback: &str| {
        if items.is_empty() { fallback.to_string() } else { items.join(", ") }
    };
    let _ = writeln!(s, "**{title}:**");
    let _ = writeln!(s, "• **Target Price:** ${target:.2} ({}%)", signed(scenario));
    let _ = writeln!(s, "• **Expected Time:** {} days", a.expected_days);
    let _ = writeln!(s, "• **Probability:** {:.2}%", a.probability * 100.0);
    let _ = writeln!(s, "• **Confidence:** {:.2}%", a.confidence * 100.0);
    let _ = writeln!(s, "• **Risk Factors:** {}", join_or(&a.risk_factors, "None identified"));
    let _ = writeln!(s, "• **Market Conditions:** {}\n", join_or(&a.market_conditions, "Neutral"));
}

impl PriceBandReport {
    pub fn render(&self) -> String {
        let a = &self.analysis;
        let er = &a.expected_return;
        let t = &a.time_to_reach_targets;

        let mut s = String::new();
        s.push_str("🎯 **Price-Based Commitment Analysis**\n\n");
        let _ = writeln!(
            s,
            "**Proposal:** Lock {} {} until price reaches ${:.2} or ${:.2}",
            a.amount, a.token_symbol, a.up_target, a.down_target
        );
        let _ = writeln!(s, "**Current Price:** ${:.2}", a.current_price);
        let _ = writeln!(s, "**Total Value:** ${:.2}\n", a.amount * a.current_price);
        s.push_str(&fear_greed_line(self.sentiment.as_ref()));

        target_section(&mut s, "📈 Up Target Analysis", a.up_target, er.up_scenario, &a.up_analysis);
        target_section(&mut s, "📉 Down Target Analysis", a.down_target, er.down_scenario, &a.down_analysis);

        s.push_str("**⏱️ Time Analysis:**\n");
        let _ = writeln!(s, "• **Time to Up Target:** {} days", t.up_target);
        let _ = writeln!(s, "• **Time to Down Target:** {} days", t.down_target);
        let _ = writeln!(s, "• **Average Expected Duration:** {} days\n", days(t.average_time));

        s.push_str("**💰 Expected Returns:**\n");
        let _ = writeln!(s, "• **Up Scenario:** {}%", signed(er.up_scenario));
        let _ = writeln!(s, "• **Down Scenario:** {}%", signed(er.down_scenario));
        let _ = writeln!(s, "• **Weighted Average:** {}%", signed(er.weighted_average));
        let _ = writeln!(s, "• **Best Case:** {}%", signed(er.best_case));
        let _ = writeln!(s, "• **Worst Case:** {}%\n", signed(er.worst_case));

        let _ = writeln!(s, "**Risk Level:** {} {}\n", a.overall_risk, risk_marker(a.overall_risk));
        let _ = writeln!(s, "**🔍 Key Insights:**\n{}\n", numbered(&a.insights));
        let _ = writeln!(s, "**💡 Recommendations:**\n{}\n", numbered(&a.recommendations));

        let _ = write!(
            s,
            "**Summary:**\nThis price-based commitment strategy has a {:.2}% chance of reaching the up target in {} days \
             and a {:.2}% chance of reaching the down target in {} days. The overall risk level is {}, \
             with a weighted average expected return of {}%.",
            a.up_analysis.probability * 100.0,
            a.up_analysis.expected_days,
            a.down_analysis.probability * 100.0,
            a.down_analysis.expected_days,
            a.overall_risk.as_str().to_lowercase(),
            signed(er.weighted_average),
        );
        s
    }
}

// ============================================================================
// Market, wallet and vaults
// ============================================================================

impl Report for MarketReport {
    fn render(&self) -> String {
        let o = &self.overview;
        let mut s = market_conditions_block(o);

        let mut context = Vec::new();
        match o.sentiment_label.as_str() {
            "extreme fear" => context.push("Extreme fear often marks market bottoms - good time for commitment strategies"),
            "extreme greed" => context.push("Extreme greed suggests potential market top - consider waiting"),
            _ => {}
        }
        match o.volatility_label() {
            "extreme" => context.push("High volatility - focus on risk management and shorter commitments"),
            "low" => context.push("Low volatility - good environment for longer-term commitments"),
            _ => {}
        }
        if !context.is_empty() {
            s.push_str("\n\n**Behavioral Context:**\n");
            s.push_str(&context.iter().map(|c| format!("• {c}")).collect::<Vec<_>>().join("\n"));
        }
        s
    }

    fn thought(&self) -> String {
        format!(
            "Market sentiment is {} (Fear & Greed {}), volatility {}",
            self.overview.sentiment_label,
            self.overview.fear_greed_index,
            self.overview.volatility_label()
        )
    }
}

fn market_conditions_block(o: &MarketOverview) -> String {
    format!(
        "📊 **Real-Time Market Conditions**\n\n\
         **Prices:** BTC ${:.2} ({}%), ETH ${:.2} ({}%), SOL ${:.2} ({}%)\n\
         **Sentiment:** {} (Fear & Greed: {})\n\
         **Volatility:** {} (24h Market Change: {}%)",
        o.btc_price,
        signed(o.btc_change_24h),
        o.eth_price,
        signed(o.eth_change_24h),
        o.sol_price,
        signed(o.sol_change_24h),
        capitalize(&o.sentiment_label),
        o.fear_greed_index,
        capitalize(o.volatility_label()),
        signed(o.market_cap_change_24h),
    )
}

impl Report for WalletReport {
    fn render(&self) -> String {
        let a = &self.analysis;
        let m = &a.metrics;

        let sentiment = match a.market_analysis.sentiment {
            MarketSentiment::Bullish => "🐂 BULLISH",
            MarketSentiment::Bearish => "🐻 BEARISH",
            MarketSentiment::Neutral => "➡️ NEUTRAL",
        };
        let trend = match a.market_analysis.trend_direction {
            TrendDirection::Upward => "📈 UPWARD",
            TrendDirection::Downward => "📉 DOWNWARD",
            TrendDirection::Sideways => "➡️ SIDEWAYS",
        };
        let tolerance = match a.risk_tolerance {
            RiskTolerance::Conservative => "🛡️ CONSERVATIVE",
            RiskTolerance::Moderate => "⚖️ MODERATE",
            RiskTolerance::Aggressive => "🚀 AGGRESSIVE",
            RiskTolerance::Extreme => "💥 EXTREME",
        };
        let hold_style = match m.average_hold_time_days {
            h if h < 1.0 => "Very short-term trading",
            h if h < 7.0 => "Short-term trading",
            h if h < 30.0 => "Medium-term trading",
            _ => "Long-term trading",
        };
        let frequency_style = match m.trade_frequency_per_week {
            f if f > 50.0 => "Very high frequency",
            f if f > 20.0 => "High frequency",
            f if f > 5.0 => "Moderate frequency",
            _ => "Low frequency",
        };

        let mut s = String::new();
        s.push_str("# 📊 **Wallet Trading Analysis Report**\n\n");
        let _ = writeln!(s, "**Wallet:** `{}`\n", a.address);
        s.push_str("## 🎯 **Risk Assessment**\n");
        let _ = writeln!(s, "**Risk Score:** {:.1}/100", a.risk_score);
        let _ = writeln!(s, "**Confidence Level:** {:.1}%", a.confidence_percentage);
        let _ = writeln!(s, "**Risk Profile:** {} {} RISK", risk_marker(a.risk_profile), a.risk_profile);
        let _ = writeln!(s, "**Risk Tolerance:** {tolerance}\n");

        s.push_str("## 📈 **Current Market Analysis**\n");
        let _ = writeln!(s, "**Sentiment:** {sentiment}");
        let _ = writeln!(s, "**Trend Direction:** {trend}");
        let _ = writeln!(s, "**Recommendation:** {}\n", a.market_analysis.recommendation);

        s.push_str("## 🔍 **Your Trading Factors**\n");
        let _ = writeln!(s, "• **Transactions Analyzed:** {} ({} round trips)", m.total_transactions, m.total_trades);
        let _ = writeln!(s, "• **Average Hold Time:** {:.1} days ({hold_style})", m.average_hold_time_days);
        let _ = writeln!(s, "• **Trade Frequency:** {:.1} trades/week ({frequency_style})", m.trade_frequency_per_week);
        let _ = writeln!(s, "• **Volatility Tolerance:** {:.1}/100", m.volatility_tolerance);
        let _ = writeln!(s, "• **Diversification Score:** {:.1}/100", m.diversification_score);
        let _ = writeln!(s, "• **ETH Chain Activity:** {:.1}%", m.eth_activity_percent);
        let _ = writeln!(s, "• **AVAX Chain Activity:** {:.1}%\n", m.avax_activity_percent);

        s.push_str("**Emotional Trading Indicators:**\n");
        if m.emotional_indicators.is_empty() {
            s.push_str("• None detected\n\n");
        } else {
            let _ = writeln!(s, "{}\n", bullets(&m.emotional_indicators));
        }

        let _ = writeln!(s, "## 💡 **Personalized Recommendations**\n{}\n", a.recommendations.join("\n\n"));
        s.push_str(
            "## 🎯 **Next Steps**\n\
             1. **Review your risk management strategy** - Consider implementing the recommendations above\n\
             2. **Set up commitment vaults** - Lock positions to prevent emotional trading\n\
             3. **Monitor your progress** - Track improvements in your trading patterns\n\
             4. **Regular rebalancing** - Maintain your target risk profile",
        );

        if let Some(overview) = &self.overview {
            s.push_str("\n\n");
            s.push_str(&market_conditions_block(overview));
        }
        s
    }

    fn thought(&self) -> String {
        format!(
            "Wallet risk score {:.1}/100 ({} risk, {:?} tolerance) from {} transactions",
            self.analysis.risk_score,
            self.analysis.risk_profile,
            self.analysis.risk_tolerance,
            self.analysis.metrics.total_transactions
        )
    }
}

impl Report for VaultsReport {
    fn render(&self) -> String {
        let a = &self.analysis;
        let unit = a.value_unit();
        let rate_marker = if a.success_rate > 80.0 {
            "🟢"
        } else if a.success_rate > 60.0 {
            "🟡"
        } else {
            "🔴"
        };
        let health = if a.success_rate > 80.0 {
            "excellent"
        } else if a.success_rate > 60.0 {
            "good"
        } else {
            "room for improvement"
        };

        let mut s = String::new();
        s.push_str("# 🏦 **Community Vaults Analysis Report**\n\n");
        s.push_str("## 📊 **Overview Statistics**\n");
        let _ = writeln!(s, "**Total Vaults Analyzed:** {}", a.total_vaults);
        let _ = writeln!(s, "**Active Vaults:** {}", a.active_vaults);
        let _ = writeln!(s, "**Successfully Completed:** {}", a.completed_vaults);
        let _ = writeln!(s, "**Emergency Withdrawals:** {}", a.emergency_withdrawn_vaults);
        let _ = writeln!(s, "**Success Rate:** {rate_marker} {:.1}%\n", a.success_rate);

        s.push_str("## 💰 **Value Metrics**\n");
        let _ = writeln!(s, "**Total Value Locked:** {:.4} {unit}", a.total_value_locked);
        let _ = writeln!(s, "**Average Vault Amount:** {:.4} {unit}", a.average_amount);
        let _ = writeln!(s, "**Average Lock Duration:** {:.1} days\n", a.average_lock_duration_days);

        s.push_str("## ⏰ **Time Distribution**\n");
        let _ = writeln!(s, "• **Short-term (< 30 days):** {} vaults", a.time_distribution.short_term);
        let _ = writeln!(s, "• **Medium-term (30-90 days):** {} vaults", a.time_distribution.medium_term);
        let _ = writeln!(s, "• **Long-term (> 90 days):** {} vaults\n", a.time_distribution.long_term);

        let _ = writeln!(s, "## 🔍 **Common Patterns**\n{}\n", bullets(&a.common_patterns));
        let _ = writeln!(s, "## ⚠️ **Risk Insights**\n{}\n", bullets(&a.risk_insights));
        let _ = writeln!(s, "## 🧠 **Behavioral Insights**\n{}\n", bullets(&a.behavioral_insights));
        let _ = writeln!(s, "## 📈 **Market Insights**\n{}\n", bullets(&a.market_insights));
        let _ = writeln!(s, "## 💡 **Recommendations**\n{}\n", a.recommendations.join("\n\n"));
        let _ = write!(
            s,
            "## 🎯 **Community Health Score**\nBased on the analysis, the community shows {health} \
             commitment to behavioral improvement through vault locking mechanisms."
        );

        if let Some(index) = a.fear_greed_index {
            let (marker, mood) = match index {
                61.. => ("🐂", "Greed"),
                0..=39 => ("🐻", "Fear"),
                _ => ("➡️", "Neutral"),
            };
            let _ = write!(s, "\n\n**Current Market Context:** {marker} Fear & Greed Index: {index} ({mood})");
        }
        s
    }

    fn thought(&self) -> String {
        format!(
            "Analyzed {} vaults with {:.1}% success rate and {:.2} total value locked",
            self.analysis.total_vaults, self.analysis.success_rate, self.analysis.total_value_locked
        )
    }
}
