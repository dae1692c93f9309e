//! Types crossing the language-model service boundary.
//!
//! Tool declarations use a JSON-schema-like parameter spec; the schema
//! builders keep tool definitions terse at the call site.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::TokenUsage;

/// A callable operation declared to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

/// JSON-schema-like object schema for tool parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Add a property; `required` marks it mandatory.
    pub fn property(mut self, name: &str, schema: PropertySchema, required: bool) -> Self {
        self.properties
            .insert(name.to_string(), serde_json::to_value(&schema).unwrap_or(Value::Null));
        if required {
            self.required.push(name.to_string());
        }
        self
    }
}

/// Schema for a single tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl PropertySchema {
    pub fn string(description: &str) -> Self {
        Self {
            schema_type: "string".to_string(),
            description: description.to_string(),
            enum_values: Vec::new(),
        }
    }

    pub fn enum_type(description: &str, values: Vec<String>) -> Self {
        Self {
            schema_type: "string".to_string(),
            description: description.to_string(),
            enum_values: values,
        }
    }
}

/// A tool invocation requested by the model.
///
/// Arguments arrive as raw JSON text; parsing and validation happen in the
/// tools crate so a malformed payload can be answered with a structured
/// failure instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id echoed back in the tool-result turn.
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as sent by the model.
    pub arguments: String,
}

/// One response from the language-model service.
///
/// The service may return plain text, tool invocations, or both.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub content: Option<String>,
    /// Invocations in the order the model requested them.
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: TokenUsage,
}

impl ChatResponse {
    /// True when the model produced no further tool work.
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}
