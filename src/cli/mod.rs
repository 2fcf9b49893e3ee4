//! Command-line surface for agentrun.

pub mod errors;

use std::time::Duration;

use clap::Parser;

use crate::config::AgentRunConfig;
use crate::error::AgentRunError;
use crate::tools::RequireApproval;

/// Drive a hosted agent run with an MCP tool to completion.
#[derive(Parser, Debug)]
#[command(name = "agentrun", version, about = "Run a task on a hosted agent with MCP tools")]
pub struct Cli {
    /// Model deployment name (overrides MODEL_DEPLOYMENT_NAME)
    #[arg(short, long)]
    pub model: Option<String>,

    /// MCP server URL (overrides MCP_SERVER_URL)
    #[arg(long)]
    pub server_url: Option<String>,

    /// MCP server label (overrides MCP_SERVER_LABEL)
    #[arg(long)]
    pub server_label: Option<String>,

    /// Project connection used to authenticate with the MCP server
    #[arg(long)]
    pub connection: Option<String>,

    /// Whether the service asks for approval before each tool call
    #[arg(long, value_parser = parse_require_approval)]
    pub require_approval: Option<RequireApproval>,

    /// Delay between run status polls, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Delete the agent once the run is finished
    #[arg(long)]
    pub delete_agent: bool,

    /// Task to submit (overrides AGENT_TASK)
    pub task: Option<String>,
}

fn parse_require_approval(raw: &str) -> Result<RequireApproval, String> {
    raw.parse()
        .map_err(|_| format!("expected `never` or `always`, got `{raw}`"))
}

impl Cli {
    /// Layer command-line overrides over a loaded config.
    pub fn apply(&self, mut config: AgentRunConfig) -> AgentRunConfig {
        if let Some(model) = &self.model {
            config.model_deployment = model.clone();
        }
        if let Some(url) = &self.server_url {
            config.mcp_server_url = url.clone();
        }
        if let Some(label) = &self.server_label {
            config.mcp_server_label = label.clone();
        }
        if let Some(connection) = &self.connection {
            config.connection_name = Some(connection.clone());
        }
        if let Some(mode) = self.require_approval {
            config.require_approval = mode;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if self.delete_agent {
            config.delete_agent_on_exit = true;
        }
        if let Some(task) = &self.task {
            config.task = Some(task.clone());
        }
        config
    }
}

/// Task text from the config, or a configuration error naming both sources.
pub fn require_task(config: &AgentRunConfig) -> Result<String, AgentRunError> {
    config.task.clone().ok_or_else(|| {
        AgentRunError::Configuration("no task given; pass TASK or set AGENT_TASK".into())
    })
}
