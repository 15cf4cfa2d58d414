//! Error Types for the Commitment Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Malformed request: bad price band ordering, non-positive amount, etc.
    #[error("{0}")]
    Validation(String),

    #[error("Asset not supported: {0}")]
    UnsupportedAsset(String),

    #[error("Price unavailable for {0}")]
    PriceUnavailable(String),

    /// Upstream data provider responded with an error or unusable payload
    #[error("Data source error: {0}")]
    Source(String),

    #[error("Ledger data unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Errors caused by the caller's input rather than by a data source
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnsupportedAsset(_))
    }
}
