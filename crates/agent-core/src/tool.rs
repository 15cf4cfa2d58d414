//! Tool System
//!
//! Tools are registered at runtime and invoked by name with JSON arguments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool invocation: a name plus JSON arguments
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Non-empty string argument, trimmed
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric argument; numeric strings are accepted too
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Raw textual form of a scalar argument, for exact decimal parsing
    pub fn get_number_text(&self, key: &str) -> Option<String> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (rendered text or error message)
    pub output: String,

    /// Short summary of what the tool concluded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            thought: None,
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            thought: None,
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_thought(mut self, thought: impl Into<String>) -> Self {
        self.thought = Some(thought.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

impl ParameterSchema {
    pub fn required(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    pub fn optional(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Tool definition schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        tracing::debug!(tool = %name, "registered tool");
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Validate and execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;

        let mut result = tool.execute(call).await?;
        if let Some(id) = &call.id {
            result.id = Some(id.clone());
        }
        tracing::debug!(tool = %call.name, success = result.success, "executed tool");
        Ok(result)
    }

    /// All tool schemas, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the text argument".into(),
                parameters: vec![ParameterSchema::required("text", "string", "Text to echo")],
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            match call.get_str("text") {
                Some(text) => Ok(ToolResult::success("echo", text).with_thought("echoed")),
                None => Ok(ToolResult::failure("echo", "Nothing to echo")),
            }
        }
    }

    struct NoopTool;

    #[async_trait]
    impl Tool for NoopTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "a_noop".into(),
                description: "Does nothing".into(),
                parameters: vec![],
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success("a_noop", ""))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(NoopTool);
        registry
    }

    #[test]
    fn test_registry_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("echo"));
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.names(), vec!["a_noop", "echo"]);
        assert_eq!(registry.schemas()[1].name, "echo");
    }

    #[tokio::test]
    async fn test_execute_validates_and_tags_id() {
        let registry = registry();

        let missing = registry.execute(&ToolCall::new("echo")).await;
        assert!(matches!(missing, Err(AgentError::ToolValidation(_))));

        let unknown = registry.execute(&ToolCall::new("nope")).await;
        assert!(matches!(unknown, Err(AgentError::ToolNotFound(_))));

        let mut call = ToolCall::new("echo").with_arg("text", "  hi  ");
        call.id = Some("call-1".into());
        let result = registry.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hi");
        assert_eq!(result.id.as_deref(), Some("call-1"));
        assert_eq!(result.thought.as_deref(), Some("echoed"));

        let blank = registry.execute(&ToolCall::new("echo").with_arg("text", " ")).await.unwrap();
        assert!(!blank.success);
    }

    #[test]
    fn test_typed_getters() {
        let call = ToolCall::new("t")
            .with_arg("amount", json!(2.5))
            .with_arg("limit", json!("12"))
            .with_arg("price", json!("3000.10"))
            .with_arg("flag", json!(true));

        assert_eq!(call.get_f64("amount"), Some(2.5));
        assert_eq!(call.get_u64("limit"), Some(12));
        assert_eq!(call.get_number_text("price").as_deref(), Some("3000.10"));
        assert_eq!(call.get_number_text("amount").as_deref(), Some("2.5"));
        assert_eq!(call.get_f64("flag"), None);
        assert_eq!(call.get_str("missing"), None);
    }

    #[test]
    fn test_result_serialization_skips_empty() {
        let value = serde_json::to_value(ToolResult::failure("echo", "bad")).unwrap();
        assert_eq!(value["success"], json!(false));
        assert!(value.get("data").is_none());
        assert!(value.get("thought").is_none());
    }
}
