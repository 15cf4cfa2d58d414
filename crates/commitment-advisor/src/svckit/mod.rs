//! Service Kit - Agent Tools
//!
//! `agent_core::Tool` implementations over the [`Advisor`], plus routing of
//! free-text messages to the tool that answers them.

mod commitment;
mod market;
mod vaults;
mod wallet;

pub use commitment::CommitmentAnalysisTool;
pub use market::MarketContextTool;
pub use vaults::VaultsAnalysisTool;
pub use wallet::WalletAnalysisTool;

use std::str::FromStr;
use std::sync::Arc;

use agent_core::{AgentError, Result as CoreResult, ToolCall, ToolRegistry, ToolResult};
use rust_decimal::Decimal;

use crate::advisor::Advisor;
use crate::parser::{MessageIntent, MessageParser};
use crate::report::Report;

/// Register every advisor tool
pub fn register_tools(registry: &mut ToolRegistry, advisor: &Arc<Advisor>, parser: &Arc<MessageParser>) {
    registry.register(CommitmentAnalysisTool::new(Arc::clone(advisor), Arc::clone(parser)));
    registry.register(WalletAnalysisTool::new(Arc::clone(advisor)));
    registry.register(VaultsAnalysisTool::new(Arc::clone(advisor)));
    registry.register(MarketContextTool::new(Arc::clone(advisor)));
}

/// Map a free-text message to the tool call that answers it.
///
/// Anything that is not a commitment, wallet or vault request gets the
/// market context.
pub fn route_message(parser: &MessageParser, text: &str) -> ToolCall {
    match parser.classify(text) {
        MessageIntent::Commitment(_) => {
            ToolCall::new(CommitmentAnalysisTool::NAME).with_arg("message", text)
        }
        MessageIntent::WalletAnalysis { address } => {
            let call = ToolCall::new(WalletAnalysisTool::NAME);
            match address {
                Some(address) => call.with_arg("address", address),
                None => call,
            }
        }
        MessageIntent::VaultsAnalysis => ToolCall::new(VaultsAnalysisTool::NAME),
        MessageIntent::General => ToolCall::new(MarketContextTool::NAME),
    }
}

/// Exact decimal argument from a JSON number or numeric string
pub(crate) fn decimal_arg(call: &ToolCall, key: &str) -> Option<Decimal> {
    let text = call.get_number_text(key)?;
    let text = text.trim_start_matches('$');
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Turn an advisor outcome into a tool result.
///
/// Caller mistakes become failed results; data source problems are
/// execution errors.
pub(crate) fn respond<R: Report>(tool: &str, outcome: crate::Result<R>) -> CoreResult<ToolResult> {
    match outcome {
        Ok(report) => Ok(ToolResult::success(tool, report.render())
            .with_thought(report.thought())
            .with_data(serde_json::to_value(&report)?)),
        Err(e) if e.is_validation() => Ok(ToolResult::failure(tool, e.to_string())),
        Err(e) => {
            tracing::warn!(tool, error = %e, "tool execution failed");
            Err(AgentError::ToolExecution(e.to_string()))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::{MockLedger, MockMarketData};
    use serde_json::json;

    pub(crate) fn registry(ledger: Option<MockLedger>) -> ToolRegistry {
        let mut advisor = Advisor::new(Arc::new(MockMarketData::new()));
        if let Some(ledger) = ledger {
            advisor = advisor.with_ledger(Arc::new(ledger));
        }
        let parser = Arc::new(MessageParser::new().unwrap());
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, &Arc::new(advisor), &parser);
        registry
    }

    #[test]
    fn test_register_tools() {
        let registry = registry(None);
        assert_eq!(
            registry.names(),
            vec!["analyze_commitment", "analyze_vaults", "analyze_wallet", "market_context"]
        );
    }

    #[test]
    fn test_route_message() {
        let parser = MessageParser::new().unwrap();

        let call = route_message(&parser, "Should I lock 2 ETH for 6 months?");
        assert_eq!(call.name, "analyze_commitment");
        assert_eq!(call.get_str("message"), Some("Should I lock 2 ETH for 6 months?"));

        let call = route_message(
            &parser,
            "analyze my wallet 0x1234567890abcdef1234567890abcdef12345678",
        );
        assert_eq!(call.name, "analyze_wallet");
        assert_eq!(call.get_str("address"), Some("0x1234567890abcdef1234567890abcdef12345678"));

        let call = route_message(&parser, "analyze my wallet");
        assert!(call.arguments.is_empty());

        assert_eq!(route_message(&parser, "show me community vaults").name, "analyze_vaults");
        assert_eq!(route_message(&parser, "gm").name, "market_context");
    }

    #[test]
    fn test_decimal_arg() {
        let call = ToolCall::new("t")
            .with_arg("a", json!(1.5))
            .with_arg("b", json!("$3000"))
            .with_arg("c", json!("1e3"))
            .with_arg("d", json!("lots"));
        assert_eq!(decimal_arg(&call, "a"), Some(Decimal::new(15, 1)));
        assert_eq!(decimal_arg(&call, "b"), Some(Decimal::from(3000)));
        assert_eq!(decimal_arg(&call, "c"), Some(Decimal::from(1000)));
        assert_eq!(decimal_arg(&call, "d"), None);
        assert_eq!(decimal_arg(&call, "missing"), None);
    }
}
