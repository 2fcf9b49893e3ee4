//! agentrun — drive hosted agent runs that use MCP tools.
//!
//! Creates an agent with a remote MCP server attached, submits a task, and
//! polls the resulting run to a terminal state. When the service pauses the
//! run for tool approval, an [`approvals::ApprovalPolicy`] decides each call
//! and the approvals are submitted back. Finished runs are rendered as a
//! transcript of steps, tool calls and messages.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentrun::prelude::*;
//!
//! # async fn example() -> agentrun::error::Result<()> {
//! let config = AgentRunConfig::from_env()?;
//! let client = Arc::new(HttpRunClient::new(&config)?);
//! let session = TaskSession::new(client, config, ApprovalResolver::default());
//! let report = session
//!     .run_task("Can you list all the tables in the database?", &mut std::io::stdout())
//!     .await?;
//! println!("{}", report.outcome.status());
//! # Ok(())
//! # }
//! ```

pub mod approvals;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod report;
pub mod session;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
