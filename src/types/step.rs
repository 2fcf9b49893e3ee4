//! Run step history types.
//!
//! History is display-only, so decoding tolerates `null`s and loosely typed
//! schema fields rather than failing a whole listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient::{null_as_default, ordered_map};

/// Historical record of one action a run took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    pub id: String,
    /// Kept as text: step statuses are only displayed, never branched on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step_details: StepDetails,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Structured details of a step. Any section may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_calls: Vec<StepToolCall>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub activities: Vec<StepActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_creation: Option<MessageCreation>,
}

/// Tool call recorded on a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepToolCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Activity record, e.g. the tool listing an MCP server advertised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepActivity {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_label: Option<String>,
    /// Declared functions in the order the service listed them.
    #[serde(default, with = "ordered_map")]
    pub tools: Vec<(String, FunctionDefinition)>,
}

impl StepActivity {
    pub fn tool(&self, name: &str) -> Option<&FunctionDefinition> {
        self.tools.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }
}

/// A function declared by an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: FunctionParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    #[serde(default, with = "ordered_map")]
    pub properties: Vec<(String, ParameterDefinition)>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub required: Vec<String>,
}

impl FunctionParameters {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn property(&self, name: &str) -> Option<&ParameterDefinition> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }
}

/// One declared parameter. `type` is JSON Schema, so it may be a string,
/// a list of strings, or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "serde_json::Value::is_null")]
    pub kind: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl ParameterDefinition {
    /// Printable form of the schema type, e.g. `string` or `string | null`.
    pub fn type_label(&self) -> String {
        match &self.kind {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(kind) => kind.clone(),
            serde_json::Value::Array(kinds) => kinds
                .iter()
                .map(|k| match k {
                    serde_json::Value::String(kind) => kind.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | "),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCreation {
    pub message_id: String,
}
