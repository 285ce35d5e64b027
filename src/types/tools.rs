//! Tool calling and function definition types

use serde::{Deserialize, Serialize};

/// A model-issued tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: String,
    pub function: Option<FunctionCall>,
}

impl ToolCall {
    /// Create a function-type tool call
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            r#type: "function".to_string(),
            function: Some(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }
}

/// Called function name and its raw JSON arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as a JSON string, exactly as assembled from the wire
    pub arguments: String,
}

/// Tool definition for function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool type (always "function" for the providers covered here)
    pub r#type: String,
    /// Function definition
    pub function: ToolFunction,
}

impl Tool {
    /// Create a new function tool
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: ToolFunction {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Tool function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Function name
    pub name: String,
    /// Function description
    pub description: String,
    /// JSON schema for the function parameters; nested object/array
    /// properties are carried through to each vendor's schema shape
    pub parameters: serde_json::Value,
}

/// Tool choice strategy.
///
/// Controls how the model should use the provided tools. Each provider
/// codec translates this into the vendor's own encoding; providers without
/// a "none" encoding drop the tool list instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Model decides whether to call tools
    Auto,
    /// Model must call at least one tool
    Required,
    /// Model cannot call any tools
    None,
    /// Model must call the named tool
    Tool { name: String },
}

impl ToolChoice {
    /// Require a specific tool by name
    pub fn tool(name: impl Into<String>) -> Self {
        Self::Tool { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_tool_shape() {
        let tool = Tool::function(
            "lookup",
            "Look something up",
            serde_json::json!({
                "type": "object",
                "properties": { "q": { "type": "string" } },
                "required": ["q"]
            }),
        );
        assert_eq!(tool.r#type, "function");
        assert_eq!(tool.function.name, "lookup");
        assert_eq!(tool.function.parameters["required"][0], "q");
    }

    #[test]
    fn tool_call_constructor() {
        let call = ToolCall::function("t1", "lookup", r#"{"q":"x"}"#);
        assert_eq!(call.id, "t1");
        let f = call.function.expect("function");
        assert_eq!(f.name, "lookup");
        assert_eq!(f.arguments, r#"{"q":"x"}"#);
    }
}
