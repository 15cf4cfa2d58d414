//! Behavioral Analysis
//!
//! Wallet trading patterns and community vault statistics.

pub mod vaults;
pub mod wallet;

pub use vaults::{TimeDistribution, TokenLockTotal, VaultsAnalysis, analyze_vaults};
pub use wallet::{
    MarketAnalysis, MarketSentiment, RiskTolerance, TradeSizes, TradingMetrics, TrendDirection,
    WalletAnalysis, analyze_trading_history, analyze_wallet,
};
