//! Configuration (layered: code > env > `.env` file).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AgentRunError, Result};
use crate::tools::{McpTool, RequireApproval};

pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_AGENT_NAME: &str = "mcp-demo-agent";
pub const DEFAULT_MCP_SERVER_URL: &str =
    "https://azure-mcp-postgres-server.graysmoke-6ac73de2.eastus2.azurecontainerapps.io";
pub const DEFAULT_MCP_SERVER_LABEL: &str = "postgres";
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful agent that can use MCP tools \
to assist users. Use the available MCP tools to answer questions and perform tasks.";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_UNRESOLVED_ROUNDS: u32 = 30;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything the client needs to reach the service and drive one task.
///
/// Built once and passed into constructors; nothing in the library reads
/// process environment after this value exists.
#[derive(Clone, PartialEq)]
pub struct AgentRunConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub api_version: String,
    pub model_deployment: String,
    pub agent_name: String,
    pub instructions: String,
    pub mcp_server_url: String,
    pub mcp_server_label: String,
    pub connection_name: Option<String>,
    pub require_approval: RequireApproval,
    pub task: Option<String>,
    pub poll_interval: Duration,
    /// Consecutive resolution rounds with zero approvals before the driver
    /// cancels the run. `None` polls until the service gives up.
    pub max_unresolved_rounds: Option<u32>,
    pub request_timeout: Duration,
    pub delete_agent_on_exit: bool,
}

impl fmt::Debug for AgentRunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRunConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| ".."))
            .field("api_version", &self.api_version)
            .field("model_deployment", &self.model_deployment)
            .field("agent_name", &self.agent_name)
            .field("mcp_server_url", &self.mcp_server_url)
            .field("mcp_server_label", &self.mcp_server_label)
            .field("connection_name", &self.connection_name)
            .field("require_approval", &self.require_approval)
            .field("poll_interval", &self.poll_interval)
            .field("max_unresolved_rounds", &self.max_unresolved_rounds)
            .field("request_timeout", &self.request_timeout)
            .field("delete_agent_on_exit", &self.delete_agent_on_exit)
            .finish_non_exhaustive()
    }
}

impl AgentRunConfig {
    /// Config with defaults for everything but the two required values.
    pub fn new(endpoint: impl Into<String>, model_deployment: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            model_deployment: model_deployment.into(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            mcp_server_url: DEFAULT_MCP_SERVER_URL.to_string(),
            mcp_server_label: DEFAULT_MCP_SERVER_LABEL.to_string(),
            connection_name: None,
            require_approval: RequireApproval::Never,
            task: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_unresolved_rounds: Some(DEFAULT_MAX_UNRESOLVED_ROUNDS),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            delete_agent_on_exit: false,
        }
    }

    /// Load from process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a `.env`-format file. Keys missing from the file fall back
    /// to the process environment. The process environment is not modified.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut values = HashMap::new();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            AgentRunError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                AgentRunError::Configuration(format!("invalid entry in {}: {e}", path.display()))
            })?;
            values.insert(key, value);
        }
        Self::from_lookup(|key: &str| values.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| AgentRunError::Configuration(format!("missing {key}")))
        };

        let mut config = Self::new(require("PROJECT_ENDPOINT")?, require("MODEL_DEPLOYMENT_NAME")?);
        config.api_token = get("PROJECT_API_TOKEN");
        config.connection_name = get("CONNECTION_NAME");
        config.task = get("AGENT_TASK");

        let string_overrides: [(&str, &mut String); 5] = [
            ("PROJECT_API_VERSION", &mut config.api_version),
            ("AGENT_NAME", &mut config.agent_name),
            ("AGENT_INSTRUCTIONS", &mut config.instructions),
            ("MCP_SERVER_URL", &mut config.mcp_server_url),
            ("MCP_SERVER_LABEL", &mut config.mcp_server_label),
        ];
        for (key, field) in string_overrides {
            if let Some(value) = get(key) {
                *field = value;
            }
        }

        if let Some(mode) = get("MCP_REQUIRE_APPROVAL") {
            config.require_approval = parse_value("MCP_REQUIRE_APPROVAL", &mode)?;
        }
        if let Some(ms) = get("POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(parse_value("POLL_INTERVAL_MS", &ms)?);
        }
        if let Some(rounds) = get("MAX_UNRESOLVED_APPROVAL_ROUNDS") {
            let rounds: u32 = parse_value("MAX_UNRESOLVED_APPROVAL_ROUNDS", &rounds)?;
            config.max_unresolved_rounds = (rounds > 0).then_some(rounds);
        }
        if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_value("REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(flag) = get("DELETE_AGENT_ON_EXIT") {
            config.delete_agent_on_exit = parse_flag("DELETE_AGENT_ON_EXIT", &flag)?;
        }

        Ok(config)
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_mcp_server(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.mcp_server_label = label.into();
        self.mcp_server_url = url.into();
        self
    }

    pub fn with_connection_name(mut self, name: impl Into<String>) -> Self {
        self.connection_name = Some(name.into());
        self
    }

    pub fn with_require_approval(mut self, mode: RequireApproval) -> Self {
        self.require_approval = mode;
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_unresolved_rounds(mut self, rounds: Option<u32>) -> Self {
        self.max_unresolved_rounds = rounds;
        self
    }

    /// The MCP tool descriptor this configuration registers on the agent.
    pub fn mcp_tool(&self) -> McpTool {
        let tool = McpTool::new(&self.mcp_server_label, &self.mcp_server_url);
        match &self.connection_name {
            Some(name) => tool.with_connection(name),
            None => tool,
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AgentRunError::Configuration(format!("invalid {key} `{raw}`: {e}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AgentRunError::Configuration(format!(
            "invalid {key} `{raw}`: expected a boolean"
        ))),
    }
}
