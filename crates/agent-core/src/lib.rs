//! # agent-core
//!
//! Minimal tool framework the advisor plugs into.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ToolRegistry                          │
//! │  ┌─────────────┐     ┌─────────────┐     ┌───────────────┐  │
//! │  │  ToolCall   │────►│  validate   │────►│  Tool::execute│  │
//! │  │ (name+args) │     │ (schema)    │     │  → ToolResult │  │
//! │  └─────────────┘     └─────────────┘     └───────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tools report domain failures as `ToolResult::failure`; `Err` is reserved
//! for framework problems such as unknown tools or missing parameters.

pub mod error;
pub mod tool;

pub use error::{AgentError, Result};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
