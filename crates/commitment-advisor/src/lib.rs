//! # commitment-advisor
//!
//! Advisor for token lock commitments: should a user lock their tokens for
//! a fixed time, or until the price leaves a band?
//!
//! ## Commitment kinds
//!
//! ```text
//! Duration:   lock 2 ETH for 6 months
//!             └─► score 0-100, risk tier, price ladder, expected return
//!
//! Price band: lock 2 ETH until $4000 or $2500
//!             ├─► up target:   expected days, probability, confidence
//!             ├─► down target: expected days, probability, confidence
//!             └─► scenario returns, overall risk
//! ```
//!
//! Scores lean contrarian: fear and dips favor locking, greed and
//! rallies count against it.
//!
//! Alongside the engine the crate analyzes wallet trading behavior and
//! community vault statistics, and exposes everything as
//! `agent_core::Tool`s.

pub mod advisor;
pub mod behavior;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod source;
pub mod svckit;

pub use advisor::Advisor;
pub use error::{AdvisorError, Result};
pub use model::{CommitmentRequest, MarketOverview, MarketSnapshot, PricePoint, SentimentSnapshot};
pub use parser::{MessageIntent, MessageParser};
pub use report::Report;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        CommitmentAnalysisTool, MarketContextTool, VaultsAnalysisTool, WalletAnalysisTool, register_tools,
        route_message,
    };
}
