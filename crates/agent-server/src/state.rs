//! Application State

use std::sync::Arc;

use agent_core::ToolRegistry;
use commitment_advisor::tools::register_tools;
use commitment_advisor::{Advisor, MessageParser};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,

    /// Compiled message patterns for `/api/message`
    pub parser: Arc<MessageParser>,

    /// Tool registry with all advisor tools
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(advisor: Advisor) -> anyhow::Result<Self> {
        let advisor = Arc::new(advisor);
        let parser = Arc::new(MessageParser::new()?);

        let mut tools = ToolRegistry::new();
        register_tools(&mut tools, &advisor, &parser);

        Ok(Self {
            advisor,
            parser,
            tools: Arc::new(tools),
        })
    }
}
