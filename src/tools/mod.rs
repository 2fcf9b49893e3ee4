//! MCP tool descriptors and per-run tool resources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A tool attached to an agent at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    Mcp(McpTool),
}

/// How the tool server authenticates calls made on the agent's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerAuthentication {
    /// A named connection registered with the project.
    Connection { connection_name: String },
}

/// Descriptor for a remote MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpTool {
    pub server_label: String,
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_authentication: Option<ServerAuthentication>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tools: Vec<String>,
}

impl McpTool {
    pub fn new(server_label: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            server_label: server_label.into(),
            server_url: server_url.into(),
            server_authentication: None,
            allowed_tools: Vec::new(),
        }
    }

    /// Authenticate through a project connection.
    pub fn with_connection(mut self, connection_name: impl Into<String>) -> Self {
        self.server_authentication = Some(ServerAuthentication::Connection {
            connection_name: connection_name.into(),
        });
        self
    }

    /// Restrict the server to the named tools. Empty means all tools.
    pub fn allow_tool(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.allowed_tools.contains(&name) {
            self.allowed_tools.push(name);
        }
        self
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::Mcp(self.clone())
    }

    /// Run-scoped resource entry for this server.
    pub fn resource(&self, require_approval: RequireApproval) -> McpToolResource {
        McpToolResource {
            server_label: self.server_label.clone(),
            require_approval,
            headers: HashMap::new(),
        }
    }
}

/// Whether the service pauses the run for client approval of tool calls.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RequireApproval {
    #[default]
    Never,
    Always,
}

/// Per-run settings for one MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpToolResource {
    pub server_label: String,
    pub require_approval: RequireApproval,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl McpToolResource {
    /// Add or replace a header forwarded to the tool server.
    pub fn update_headers(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn set_approval_mode(&mut self, mode: RequireApproval) {
        self.require_approval = mode;
    }
}

/// Tool resources supplied when a run is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp: Vec<McpToolResource>,
}

impl ToolResources {
    pub fn with_mcp(mut self, resource: McpToolResource) -> Self {
        self.mcp.push(resource);
        self
    }
}
