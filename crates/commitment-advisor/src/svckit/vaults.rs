//! Community Vaults Analysis Tool

use std::sync::Arc;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use super::respond;
use crate::advisor::{Advisor, DEFAULT_VAULT_LIMIT, MAX_VAULT_LIMIT};

pub struct VaultsAnalysisTool {
    advisor: Arc<Advisor>,
}

impl VaultsAnalysisTool {
    pub const NAME: &'static str = "analyze_vaults";

    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self { advisor }
    }
}

#[async_trait]
impl Tool for VaultsAnalysisTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Summarize recent community commitment vaults: success rate, lock durations, \
                          popular tokens and behavioral insights."
                .into(),
            parameters: vec![
                ParameterSchema::optional("limit", "number", "Number of recent vaults to analyze (max 100)")
                    .with_default(serde_json::json!(DEFAULT_VAULT_LIMIT)),
            ],
            category: Some("analysis".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let limit = call
            .get_u64("limit")
            .map_or(DEFAULT_VAULT_LIMIT, |l| usize::try_from(l).unwrap_or(MAX_VAULT_LIMIT));
        respond(Self::NAME, self.advisor.analyze_vaults(limit).await)
    }
}
