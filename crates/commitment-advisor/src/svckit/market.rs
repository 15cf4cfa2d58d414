//! Market Context Tool

use std::sync::Arc;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use super::respond;
use crate::advisor::Advisor;

pub struct MarketContextTool {
    advisor: Arc<Advisor>,
}

impl MarketContextTool {
    pub const NAME: &'static str = "market_context";

    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self { advisor }
    }
}

#[async_trait]
impl Tool for MarketContextTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Current market conditions: BTC, ETH and SOL prices, Fear & Greed sentiment and \
                          market-wide volatility."
                .into(),
            parameters: vec![],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        respond(Self::NAME, self.advisor.market_overview().await)
    }
}
