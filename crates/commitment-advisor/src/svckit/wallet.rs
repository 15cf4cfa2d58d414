//! Wallet Analysis Tool

use std::sync::Arc;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use super::respond;
use crate::advisor::Advisor;

pub struct WalletAnalysisTool {
    advisor: Arc<Advisor>,
}

impl WalletAnalysisTool {
    pub const NAME: &'static str = "analyze_wallet";

    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self { advisor }
    }
}

#[async_trait]
impl Tool for WalletAnalysisTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Analyze a wallet's ETH and AVAX trading history for risk, emotional trading \
                          patterns and diversification."
                .into(),
            parameters: vec![ParameterSchema::optional(
                "address",
                "string",
                "Wallet address, 0x followed by 40 hex characters",
            )],
            category: Some("analysis".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(address) = call.get_str("address") else {
            return Ok(ToolResult::failure(
                Self::NAME,
                "Please provide a wallet address to analyze (0x followed by 40 hex characters).",
            ));
        };
        respond(Self::NAME, self.advisor.analyze_wallet(address).await)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::registry;
    use super::*;
    use crate::behavior::wallet::tests::{WALLET, transfer};
    use crate::model::Chain;
    use crate::source::MockLedger;
    use agent_core::AgentError;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_wallet_report() {
        let ledger = MockLedger::new().with_transactions(vec![
            transfer(Chain::Avax, "AVAX", None, Duration::days(0), false, dec!(10)),
            transfer(Chain::Avax, "AVAX", None, Duration::days(5), true, dec!(10)),
        ]);
        let call = ToolCall::new(WalletAnalysisTool::NAME).with_arg("address", WALLET);
        let result = registry(Some(ledger)).execute(&call).await.unwrap();

        assert!(result.success, "{}", result.output);
        assert!(result.output.starts_with("# 📊 **Wallet Trading Analysis Report**"));
        assert_eq!(result.data.unwrap()["analysis"]["metrics"]["total_transactions"], 2);
    }

    #[tokio::test]
    async fn test_address_problems() {
        let registry = registry(Some(MockLedger::new()));

        let result = registry.execute(&ToolCall::new(WalletAnalysisTool::NAME)).await.unwrap();
        assert!(!result.success);

        let call = ToolCall::new(WalletAnalysisTool::NAME).with_arg("address", "0xnope");
        let result = registry.execute(&call).await.unwrap();
        assert!(result.output.starts_with("Invalid wallet address"));
    }

    #[tokio::test]
    async fn test_missing_ledger_is_an_execution_error() {
        let call = ToolCall::new(WalletAnalysisTool::NAME).with_arg("address", WALLET);
        let err = registry(None).execute(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution(_)));
    }
}
