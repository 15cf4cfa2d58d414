//! Commitment Analysis Tool
//!
//! Scores a duration or price band lock, from free text or structured
//! arguments.

use std::sync::Arc;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use super::{decimal_arg, respond};
use crate::advisor::Advisor;
use crate::model::CommitmentRequest;
use crate::parser::{MessageIntent, MessageParser};

const NO_COMMITMENT: &str = "I couldn't find a commitment in that message. Try \"lock 2 ETH for 6 months\" \
     or \"lock 2 ETH until the price goes up to $4000 or down to $2500\".";

pub struct CommitmentAnalysisTool {
    advisor: Arc<Advisor>,
    parser: Arc<MessageParser>,
}

impl CommitmentAnalysisTool {
    pub const NAME: &'static str = "analyze_commitment";

    pub fn new(advisor: Arc<Advisor>, parser: Arc<MessageParser>) -> Self {
        Self { advisor, parser }
    }

    fn request(&self, call: &ToolCall) -> Result<CommitmentRequest, String> {
        if let Some(message) = call.get_str("message") {
            return match self.parser.classify(message) {
                MessageIntent::Commitment(request) => Ok(request),
                _ => Err(NO_COMMITMENT.to_string()),
            };
        }

        let token = call
            .get_str("token")
            .ok_or("Provide either a message or a token")?;
        let amount = decimal_arg(call, "amount").ok_or("amount must be a number")?;

        if let Some(days) = call.get_f64("duration_days") {
            return Ok(CommitmentRequest::duration(amount, token, days));
        }
        match (decimal_arg(call, "up_target"), decimal_arg(call, "down_target")) {
            (Some(up), Some(down)) => Ok(CommitmentRequest::price_band(amount, token, up, down)),
            _ => Err("Provide duration_days, or both up_target and down_target".to_string()),
        }
    }
}

#[async_trait]
impl Tool for CommitmentAnalysisTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Analyze a token lock commitment: a fixed duration, or a price band that unlocks when \
                          the price reaches an upper or lower target. Returns a score, risk level, \
                          price predictions and expected returns."
                .into(),
            parameters: vec![
                ParameterSchema::optional(
                    "message",
                    "string",
                    "Free-text proposal, e.g. 'lock 2 ETH for 6 months'",
                ),
                ParameterSchema::optional("token", "string", "Token symbol, e.g. 'ETH'"),
                ParameterSchema::optional("amount", "number", "Number of tokens to lock"),
                ParameterSchema::optional("duration_days", "number", "Lock duration in days"),
                ParameterSchema::optional("up_target", "number", "Upper unlock price in USD"),
                ParameterSchema::optional("down_target", "number", "Lower unlock price in USD"),
            ],
            category: Some("analysis".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let request = match self.request(call) {
            Ok(request) => request,
            Err(message) => return Ok(ToolResult::failure(Self::NAME, message)),
        };
        respond(Self::NAME, self.advisor.analyze_commitment(&request).await)
    }
}
