//! Community Vault Analysis
//!
//! Aggregate statistics and narrative insights over recent commitment
//! vaults reported by the indexer.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{MarketOverview, VaultRecord, VaultStatus, to_f64};

/// Lock lengths outside this range are treated as bad data
const MIN_LOCK_DAYS: f64 = 0.042;
const MAX_LOCK_DAYS: f64 = 3650.0;
const FALLBACK_LOCK_DAYS: f64 = 30.0;
const TOP_TOKENS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLockTotal {
    pub token: String,
    pub count: usize,
    pub total_value: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDistribution {
    /// Under 30 days
    pub short_term: usize,
    /// 30 to 90 days inclusive
    pub medium_term: usize,
    /// Over 90 days
    pub long_term: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VaultsAnalysis {
    pub total_vaults: usize,
    pub active_vaults: usize,

    /// Unlocked at term without an emergency withdrawal
    pub completed_vaults: usize,

    pub emergency_withdrawn_vaults: usize,
    pub average_lock_duration_days: f64,
    pub average_amount: Decimal,
    pub total_value_locked: Decimal,

    /// Active plus completed over total, percent
    pub success_rate: f64,

    pub common_patterns: Vec<String>,
    pub risk_insights: Vec<String>,
    pub behavioral_insights: Vec<String>,
    pub market_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub top_tokens: Vec<TokenLockTotal>,
    pub time_distribution: TimeDistribution,

    /// Fear & Greed reading at analysis time, if known
    pub fear_greed_index: Option<u8>,
}

impl VaultsAnalysis {
    /// Token label for value totals: the single locked token, or "tokens"
    pub fn value_unit(&self) -> &str {
        match self.top_tokens.as_slice() {
            [only] => &only.token,
            [] => "AVAX",
            _ => "tokens",
        }
    }
}

fn sanitized_lock_days(vault: &VaultRecord) -> f64 {
    let days = vault.lock_days();
    if (MIN_LOCK_DAYS..=MAX_LOCK_DAYS).contains(&days) {
        days
    } else {
        FALLBACK_LOCK_DAYS
    }
}

/// Summarize `vaults` against the current market.
pub fn analyze_vaults(
    vaults: &[VaultRecord],
    overview: Option<&MarketOverview>,
    now: DateTime<Utc>,
) -> VaultsAnalysis {
    let total_vaults = vaults.len();
    let active_vaults = vaults.iter().filter(|v| v.status == VaultStatus::Active).count();
    let completed_vaults = vaults
        .iter()
        .filter(|v| v.status == VaultStatus::Unlocked && v.emergency_withdrawn_at.is_none())
        .count();
    let emergency_withdrawn_vaults = vaults.iter().filter(|v| v.emergency_withdrawn_at.is_some()).count();

    let lock_days: Vec<f64> = vaults.iter().map(sanitized_lock_days).collect();
    let average_lock_duration_days = if lock_days.is_empty() {
        FALLBACK_LOCK_DAYS
    } else {
        lock_days.iter().sum::<f64>() / lock_days.len() as f64
    };

    let total_value_locked: Decimal = vaults.iter().map(|v| v.amount).sum();
    let average_amount = if total_vaults == 0 {
        Decimal::ZERO
    } else {
        total_value_locked / Decimal::from(total_vaults)
    };

    let success_rate = if total_vaults == 0 {
        0.0
    } else {
        (completed_vaults + active_vaults) as f64 / total_vaults as f64 * 100.0
    };

    let time_distribution = TimeDistribution {
        short_term: lock_days.iter().filter(|d| **d < 30.0).count(),
        medium_term: lock_days.iter().filter(|d| (30.0..=90.0).contains(*d)).count(),
        long_term: lock_days.iter().filter(|d| **d > 90.0).count(),
    };

    let top_tokens = top_tokens(vaults);

    let mut analysis = VaultsAnalysis {
        total_vaults,
        active_vaults,
        completed_vaults,
        emergency_withdrawn_vaults,
        average_lock_duration_days,
        average_amount,
        total_value_locked,
        success_rate,
        common_patterns: common_patterns(vaults, time_distribution, &top_tokens, average_amount),
        risk_insights: risk_insights(success_rate, emergency_withdrawn_vaults, active_vaults),
        behavioral_insights: behavioral_insights(vaults, average_lock_duration_days, time_distribution),
        market_insights: market_insights(vaults, overview, now),
        recommendations: Vec::new(),
        top_tokens,
        time_distribution,
        fear_greed_index: overview.map(|o| o.fear_greed_index),
    };
    analysis.recommendations = recommendations(&analysis);

    tracing::info!(
        total = analysis.total_vaults,
        success_rate = analysis.success_rate,
        "analyzed community vaults"
    );
    analysis
}

fn top_tokens(vaults: &[VaultRecord]) -> Vec<TokenLockTotal> {
    let mut totals: Vec<TokenLockTotal> = Vec::new();
    for vault in vaults {
        match totals.iter_mut().find(|t| t.token == vault.token_symbol) {
            Some(total) => {
                total.count += 1;
                total.total_value += vault.amount;
            }
            None => totals.push(TokenLockTotal {
                token: vault.token_symbol.clone(),
                count: 1,
                total_value: vault.amount,
            }),
        }
    }
    // stable: ties keep first-seen order
    totals.sort_by(|a, b| b.count.cmp(&a.count));
    totals.truncate(TOP_TOKENS);
    totals
}

fn common_patterns(
    vaults: &[VaultRecord],
    dist: TimeDistribution,
    top_tokens: &[TokenLockTotal],
    average_amount: Decimal,
) -> Vec<String> {
    let mut patterns = Vec::new();

    let TimeDistribution { short_term: s, medium_term: m, long_term: l } = dist;
    if s > m && s > l {
        patterns.push("Short-term commitments (under 30 days) are most popular among users".to_string());
    } else if m > s && m > l {
        patterns.push("Medium-term commitments (30-90 days) are the preferred choice".to_string());
    } else if l > s && l > m {
        patterns.push("Long-term commitments (over 90 days) are most common".to_string());
    }

    if let Some(top) = top_tokens.first() {
        patterns.push(format!("{} is the most locked asset with {} vaults", top.token, top.count));

        let find = |symbol: &str| top_tokens.iter().find(|t| t.token == symbol);
        match (find("ETH"), find("AVAX")) {
            (Some(eth), Some(avax)) => {
                let both = (eth.count + avax.count) as f64;
                let eth_pct = (eth.count as f64 / both * 100.0).round();
                let avax_pct = (avax.count as f64 / both * 100.0).round();
                patterns.push(format!("Cross-chain distribution: {eth_pct}% ETH, {avax_pct}% AVAX"));
            }
            (Some(_), None) => patterns.push("Users prefer Ethereum network for vault commitments".to_string()),
            (None, Some(_)) => patterns.push("Users prefer Avalanche network for vault commitments".to_string()),
            (None, None) => {}
        }
    }

    if !vaults.is_empty() {
        if average_amount < Decimal::ONE {
            patterns.push("Users prefer small amounts for testing commitment mechanisms".to_string());
        } else if average_amount > Decimal::TEN {
            patterns.push("Users are confident with larger amounts in their commitments".to_string());
        }
    }

    patterns
}

fn risk_insights(success_rate: f64, emergency: usize, active: usize) -> Vec<String> {
    let mut insights = Vec::new();
    if success_rate > 80.0 {
        insights.push("High success rate indicates strong community commitment to behavioral improvement".to_string());
    } else if success_rate < 50.0 {
        insights.push("Low success rate suggests users may need better risk management strategies".to_string());
    }
    if emergency > 0 {
        insights.push(format!(
            "{emergency} emergency withdrawals detected - users value capital preservation over penalties"
        ));
    }
    if active > 0 {
        insights.push(format!("{active} active vaults show ongoing commitment to behavioral improvement"));
    }
    insights
}

fn behavioral_insights(vaults: &[VaultRecord], average_days: f64, dist: TimeDistribution) -> Vec<String> {
    let mut insights = Vec::new();
    if average_days < 30.0 {
        insights.push("Short average lock duration suggests users prefer flexibility over long-term commitments".to_string());
    } else if average_days > 90.0 {
        insights.push("Long average lock duration indicates strong long-term behavioral improvement goals".to_string());
    }
    if dist.short_term > 0 {
        insights.push("Short-term vaults suggest users are testing the commitment mechanism".to_string());
    }
    if dist.long_term > 0 {
        insights.push("Long-term vaults indicate serious behavioral improvement intentions".to_string());
    }
    let documented = vaults
        .iter()
        .any(|v| v.message.as_deref().is_some_and(|m| !m.trim().is_empty()));
    if documented {
        insights.push("Users are actively documenting their commitment reasons and goals".to_string());
    }
    insights
}

fn market_insights(vaults: &[VaultRecord], overview: Option<&MarketOverview>, now: DateTime<Utc>) -> Vec<String> {
    let Some(overview) = overview else {
        return vec!["Market data unavailable for correlation analysis".to_string()];
    };

    let recent = vaults.iter().any(|v| now - v.created_at < Duration::days(7));
    if !recent {
        return Vec::new();
    }
    if overview.fear_greed_index < 30 {
        vec!["Recent vaults created during fear periods - users seeking behavioral control in volatile markets".to_string()]
    } else if overview.fear_greed_index > 70 {
        vec!["Recent vaults created during greed periods - users protecting gains through commitment mechanisms".to_string()]
    } else {
        Vec::new()
    }
}

fn recommendations(analysis: &VaultsAnalysis) -> Vec<String> {
    let mut out = Vec::new();
    if analysis.success_rate < 70.0 {
        out.push("Improve Success Rate: Consider implementing better onboarding and education about commitment benefits");
    }
    if analysis.emergency_withdrawn_vaults > 0 {
        out.push("Emergency Withdrawal Management: Review penalty structures to balance commitment with flexibility");
    }
    if analysis.time_distribution.short_term > analysis.time_distribution.long_term {
        out.push("Encourage Long-term Commitments: Provide incentives for longer lock periods");
    }
    if to_f64(analysis.average_amount) < 0.1 {
        out.push("Increase Commitment Amounts: Users may benefit from larger commitments for better behavioral impact");
    }
    if analysis.fear_greed_index.is_some_and(|index| index < 40) {
        out.push("Fear Market Opportunity: Consider promoting vault creation during fear periods for better long-term outcomes");
    }
    out.push("Community Education: Share success stories and behavioral improvement metrics");
    out.into_iter().map(str::to_string).collect()
}
