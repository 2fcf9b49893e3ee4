//! Agent, thread and run creation payloads.

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::tools::{ToolDefinition, ToolResources};

/// Body for create-agent.
#[derive(Debug, Clone, PartialEq, Builder, Serialize)]
pub struct CreateAgentRequest {
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    pub name: String,
    #[builder(into, default)]
    pub instructions: String,
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// Agent as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: String,
}

/// Conversation thread as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Body for create-run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRunRequest {
    #[serde(rename = "assistant_id")]
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
}

impl CreateRunRequest {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            tool_resources: None,
        }
    }

    pub fn with_tool_resources(mut self, resources: ToolResources) -> Self {
        self.tool_resources = Some(resources);
        self
    }
}
