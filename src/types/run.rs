//! Run, required-action and tool-approval types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{AgentRunError, Result};

/// Run status as reported by the agent service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Statuses the driver keeps polling through.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::InProgress | Self::RequiresAction)
    }

    /// Anything that is not active ends the polling loop, including
    /// statuses this client does not recognize.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

/// Error payload attached to a failed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code.is_empty(), self.message.is_empty()) {
            (true, _) => f.write_str(&self.message),
            (false, true) => f.write_str(&self.code),
            (false, false) => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// One execution of an agent against a thread.
///
/// The service owns the run; this is the client's copy as of the last poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default, rename = "assistant_id")]
    pub agent_id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<RunError>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Run {
    /// Pending tool calls when the run is paused on a tool-approval request.
    ///
    /// Returns `None` for any other status or required-action kind.
    pub fn pending_tool_approvals(&self) -> Option<&[PendingToolCall]> {
        if self.status != RunStatus::RequiresAction {
            return None;
        }
        match &self.required_action {
            Some(RequiredAction::SubmitToolApproval {
                submit_tool_approval,
            }) => Some(&submit_tool_approval.tool_calls),
            _ => None,
        }
    }
}

/// Client-side input the service is waiting for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequiredAction {
    SubmitToolApproval { submit_tool_approval: ToolCallBatch },
    SubmitToolOutputs { submit_tool_outputs: ToolCallBatch },
    #[serde(other)]
    Other,
}

/// Ordered batch of tool calls attached to a required action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallBatch {
    #[serde(default)]
    pub tool_calls: Vec<PendingToolCall>,
}

/// Tool-call kinds the service can ask about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolCallKind {
    Mcp,
    Function,
    Unsupported(String),
}

impl ToolCallKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mcp => "mcp",
            Self::Function => "function",
            Self::Unsupported(kind) => kind,
        }
    }
}

impl From<&str> for ToolCallKind {
    fn from(value: &str) -> Self {
        match value {
            "mcp" => Self::Mcp,
            "function" => Self::Function,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for ToolCallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tool invocation awaiting approval.
///
/// The payload is kept opaque until a resolver asks for a typed view, so a
/// malformed call only fails when that call is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawToolCall", into = "RawToolCall")]
pub struct PendingToolCall {
    pub id: String,
    pub kind: ToolCallKind,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct RawToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(flatten)]
    payload: serde_json::Map<String, serde_json::Value>,
}

impl From<RawToolCall> for PendingToolCall {
    fn from(raw: RawToolCall) -> Self {
        Self {
            id: raw.id,
            kind: ToolCallKind::from(raw.kind.as_str()),
            payload: raw.payload,
        }
    }
}

impl From<PendingToolCall> for RawToolCall {
    fn from(call: PendingToolCall) -> Self {
        Self {
            id: call.id,
            kind: call.kind.as_str().to_string(),
            payload: call.payload,
        }
    }
}

/// Typed view of a pending MCP tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct McpToolCall {
    pub call_id: String,
    pub name: String,
    pub server_label: String,
    pub arguments: serde_json::Value,
}

impl PendingToolCall {
    pub fn mcp(id: impl Into<String>, name: &str, server_label: &str, arguments: &str) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert("name".into(), name.into());
        payload.insert("server_label".into(), server_label.into());
        payload.insert("arguments".into(), arguments.into());
        Self {
            id: id.into(),
            kind: ToolCallKind::Mcp,
            payload,
        }
    }

    /// Decode the payload of an MCP call.
    ///
    /// `arguments` arrives as a JSON-encoded string; an empty string means
    /// no arguments.
    pub fn as_mcp(&self) -> Result<McpToolCall> {
        if self.id.is_empty() {
            return Err(AgentRunError::tool_approval("<missing>", "tool call has no id"));
        }
        if self.kind != ToolCallKind::Mcp {
            return Err(AgentRunError::tool_approval(
                &self.id,
                format!("expected an mcp call, got {}", self.kind),
            ));
        }

        let name = self.string_field("name")?;
        let server_label = self.string_field("server_label")?;
        let arguments = match self.payload.get("arguments") {
            None | Some(serde_json::Value::Null) => serde_json::Value::Object(Default::default()),
            Some(serde_json::Value::String(raw)) if raw.trim().is_empty() => {
                serde_json::Value::Object(Default::default())
            }
            Some(serde_json::Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
                AgentRunError::tool_approval(&self.id, format!("arguments are not valid JSON: {e}"))
            })?,
            Some(other) => other.clone(),
        };

        Ok(McpToolCall {
            call_id: self.id.clone(),
            name,
            server_label,
            arguments,
        })
    }

    fn string_field(&self, key: &str) -> Result<String> {
        match self.payload.get(key) {
            Some(serde_json::Value::String(value)) if !value.is_empty() => Ok(value.clone()),
            _ => Err(AgentRunError::tool_approval(
                &self.id,
                format!("missing `{key}` in tool call payload"),
            )),
        }
    }
}

/// Decision record for one pending tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolApproval {
    pub tool_call_id: String,
    pub approve: bool,
}

impl ToolApproval {
    pub fn approve(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            approve: true,
        }
    }

    pub fn deny(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            approve: false,
        }
    }
}
