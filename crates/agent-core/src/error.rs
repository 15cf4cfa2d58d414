//! Error Types

use thiserror::Error;

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments did not satisfy the tool's schema
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool could not complete for reasons outside the caller's input
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Errors caused by the caller rather than the tool
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::ToolNotFound(_) | Self::ToolValidation(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::ToolExecution(msg) => format!("Tool error: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = AgentError::ToolNotFound("price_oracle".into());
        assert!(err.is_client_error());
        assert_eq!(err.user_message(), "The tool 'price_oracle' is not available.");

        let err: AgentError = anyhow::anyhow!("boom").into();
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.user_message(), "An unexpected error occurred.");
    }
}
