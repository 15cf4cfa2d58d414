//! Message Parsing
//!
//! Turns free-text requests ("lock 3 ETH for 6 months", "lock 2 AVAX until
//! the price goes up to $50 or down to $20") into typed intents.

use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::error::{AdvisorError, Result};
use crate::model::CommitmentRequest;

/// Token symbols recognized in free text
pub const SUPPORTED_TOKENS: [&str; 20] = [
    "ETH", "BTC", "USDC", "SOL", "AVAX", "ADA", "DOT", "MATIC", "LINK", "UNI", "LTC", "BCH", "XRP",
    "DOGE", "SHIB", "TRX", "ATOM", "ETC", "BNB", "USDT",
];

const NUMBER: &str = r"(\d+(?:\.\d+)?)";
const PRICE: &str = r"\$?(\d+(?:\.\d+)?)";

/// What a message is asking for.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageIntent {
    Commitment(CommitmentRequest),
    WalletAnalysis { address: Option<String> },
    VaultsAnalysis,
    General,
}

/// Compiled patterns for message classification.
pub struct MessageParser {
    price_band: Vec<Regex>,
    amount_token: Regex,
    duration: Regex,
    wallet: Vec<Regex>,
    vaults: Vec<Regex>,
    address: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| AdvisorError::Parse(format!("Invalid regex pattern '{pattern}': {e}")))
}

impl MessageParser {
    pub fn new() -> Result<Self> {
        let tokens = SUPPORTED_TOKENS.join("|");
        let lock = format!(r"(?i)lock\s+{NUMBER}\s*({tokens})\b\s+");

        let price_band = [
            format!(
                r"{lock}until\s+(?:either\s+)?(?:the\s+)?price\s+(?:goes\s+)?(?:up\s+)?to\s+{PRICE}\s+or\s+(?:the\s+)?(?:price\s+)?(?:goes\s+)?(?:down\s+)?to\s+{PRICE}"
            ),
            format!(r"{lock}until\s+(?:the\s+)?price\s+(?:reaches|hits)\s+{PRICE}\s+or\s+{PRICE}"),
            format!(r"{lock}(?:until|till)\s+{PRICE}\s+or\s+{PRICE}"),
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>>>()?;

        let wallet = [
            r"(?i)analy[sz]e\s+(?:my\s+)?wallet",
            r"(?i)wallet\s+(?:review|analysis|risk)",
            r"(?i)risk\s+assessment",
            r"(?i)trading\s+(?:history|behavior|behaviour|patterns?)",
            r"(?i)portfolio\s+analysis",
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>>>()?;

        let vaults = [
            r"(?i)analy[sz]e\s+(?:the\s+)?(?:community\s+)?vaults?",
            r"(?i)vaults?\s+(?:insights|analysis|patterns|stats|statistics)",
            r"(?i)commitment\s+patterns",
            r"(?i)community\s+(?:vaults|commitments|insights)",
            r"(?i)locking\s+(?:trends|patterns|behavior|behaviour)",
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            price_band,
            amount_token: compile(&format!(r"(?i)\b{NUMBER}\s*({tokens})\b"))?,
            duration: compile(r"(?i)\b(\d+)\s*(days?|weeks?|months?|years?)\b")?,
            wallet,
            vaults,
            address: compile(r"0x[a-fA-F0-9]{40}")?,
        })
    }

    /// Classify a message. Price bands win over durations, which win over
    /// wallet and vault requests.
    pub fn classify(&self, text: &str) -> MessageIntent {
        if let Some(request) = self.parse_price_band(text) {
            return MessageIntent::Commitment(request);
        }
        if let Some(request) = self.parse_duration(text) {
            return MessageIntent::Commitment(request);
        }
        if self.wallet.iter().any(|re| re.is_match(text)) {
            return MessageIntent::WalletAnalysis {
                address: self.wallet_address(text),
            };
        }
        if self.vaults.iter().any(|re| re.is_match(text)) {
            return MessageIntent::VaultsAnalysis;
        }
        MessageIntent::General
    }

    /// The first price band phrasing that matches, targets in written order
    pub fn parse_price_band(&self, text: &str) -> Option<CommitmentRequest> {
        let caps = self.price_band.iter().find_map(|re| re.captures(text))?;
        let amount = decimal_at(&caps, 1)?;
        let token = caps.get(2)?.as_str();
        let up = decimal_at(&caps, 3)?;
        let down = decimal_at(&caps, 4)?;
        Some(CommitmentRequest::price_band(amount, token, up, down))
    }

    /// "<amount> <TOKEN>" plus "<n> <unit>" anywhere in the message
    pub fn parse_duration(&self, text: &str) -> Option<CommitmentRequest> {
        let token_caps = self.amount_token.captures(text)?;
        let duration_caps = self.duration.captures(text)?;

        let amount = decimal_at(&token_caps, 1)?;
        let token = token_caps.get(2)?.as_str();
        let count: f64 = duration_caps.get(1)?.as_str().parse().ok()?;
        let unit = duration_caps.get(2)?.as_str().to_lowercase();

        let days = if unit.starts_with("week") {
            count * 7.0
        } else if unit.starts_with("month") {
            count * 30.0
        } else if unit.starts_with("year") {
            count * 365.0
        } else {
            count
        };

        Some(CommitmentRequest::duration(amount, token, days))
    }

    pub fn wallet_address(&self, text: &str) -> Option<String> {
        self.address.find(text).map(|m| m.as_str().to_string())
    }
}

fn decimal_at(caps: &Captures<'_>, index: usize) -> Option<Decimal> {
    caps.get(index)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parser() -> MessageParser {
        MessageParser::new().unwrap()
    }

    #[test]
    fn test_duration_units() {
        let p = parser();
        assert_eq!(
            p.classify("I want to lock 3 ETH for 6 months"),
            MessageIntent::Commitment(CommitmentRequest::duration(dec!(3), "ETH", 180.0))
        );
        assert_eq!(
            p.parse_duration("commit 0.5 btc for 2 weeks"),
            Some(CommitmentRequest::duration(dec!(0.5), "BTC", 14.0))
        );
        assert_eq!(
            p.parse_duration("lock 100 avax for 1 year"),
            Some(CommitmentRequest::duration(dec!(100), "AVAX", 365.0))
        );
        assert_eq!(
            p.parse_duration("Lock 10 SOL for 45 days"),
            Some(CommitmentRequest::duration(dec!(10), "SOL", 45.0))
        );
    }

    #[test]
    fn test_price_band_phrasings() {
        let p = parser();
        let expected = CommitmentRequest::price_band(dec!(3), "ETH", dec!(3000), dec!(2000));

        for text in [
            "lock 3 ETH until either the price goes up to $3000 or goes down to $2000",
            "lock 3 ETH until price goes up to 3000 or down to 2000",
            "Lock 3 eth until price reaches $3000 or $2000",
            "lock 3 ETH till $3000 or $2000",
        ] {
            assert_eq!(p.classify(text), MessageIntent::Commitment(expected.clone()), "{text}");
        }
    }

    #[test]
    fn test_price_band_keeps_written_order() {
        let p = parser();
        let request = p.parse_price_band("lock 1 BTC until 50000 or 90000").unwrap();
        assert_eq!(
            request,
            CommitmentRequest::price_band(dec!(1), "BTC", dec!(50000), dec!(90000))
        );
    }

    #[test]
    fn test_wallet_and_vault_intents() {
        let p = parser();
        assert_eq!(
            p.classify("Please analyze my wallet 0x1234567890abcdef1234567890ABCDEF12345678"),
            MessageIntent::WalletAnalysis {
                address: Some("0x1234567890abcdef1234567890ABCDEF12345678".to_string())
            }
        );
        assert_eq!(
            p.classify("give me a risk assessment"),
            MessageIntent::WalletAnalysis { address: None }
        );
        assert_eq!(p.classify("show community vaults"), MessageIntent::VaultsAnalysis);
        assert_eq!(p.classify("what are the locking trends?"), MessageIntent::VaultsAnalysis);
    }

    #[test]
    fn test_unrecognized_is_general() {
        let p = parser();
        assert_eq!(p.classify("hello there"), MessageIntent::General);
        // Unknown token and no duration
        assert_eq!(p.classify("lock 5 FOO for 3 months"), MessageIntent::General);
        assert_eq!(p.classify("lock 5 ETH"), MessageIntent::General);
    }
}
