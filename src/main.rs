//! agentrun binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use agentrun::approvals::{ApprovalResolver, AutoApprove};
use agentrun::cli::{errors::format_error_help, require_task, Cli};
use agentrun::client::HttpRunClient;
use agentrun::config::AgentRunConfig;
use agentrun::error::AgentRunError;
use agentrun::session::TaskSession;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agentrun=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", format_error_help(&e));
            std::process::exit(1);
        }
    }
}

/// Returns whether the run completed successfully.
async fn run(cli: Cli) -> Result<bool, AgentRunError> {
    let _ = dotenvy::dotenv();
    // --model may stand in for MODEL_DEPLOYMENT_NAME entirely.
    let model = cli.model.clone();
    let config = AgentRunConfig::from_lookup(|key: &str| {
        std::env::var(key)
            .ok()
            .or_else(|| (key == "MODEL_DEPLOYMENT_NAME").then(|| model.clone()).flatten())
    })?;
    let config = cli.apply(config);
    let task = require_task(&config)?;

    let client = Arc::new(HttpRunClient::new(&config)?);
    let resolver = ApprovalResolver::new(AutoApprove::for_server(config.mcp_server_label.clone()));
    let session = TaskSession::new(client, config, resolver);

    let mut stdout = std::io::stdout();
    let report = session.run_task(&task, &mut stdout).await?;
    Ok(report.outcome.is_success())
}
