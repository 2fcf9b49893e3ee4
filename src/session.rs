//! End-to-end task: agent, thread, message, run, drive, report.

use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use crate::approvals::ApprovalResolver;
use crate::client::RunClient;
use crate::config::AgentRunConfig;
use crate::driver::{CancelReason, DriverSettings, RunDriver, RunOutcome, Sleeper};
use crate::error::AgentRunError;
use crate::report::{TranscriptReporter, TranscriptSummary};
use crate::tools::ToolResources;
use crate::types::{CreateAgentRequest, CreateMessageRequest, CreateRunRequest};

/// What a completed task session produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub agent_id: String,
    pub thread_id: String,
    pub outcome: RunOutcome,
    pub transcript: TranscriptSummary,
}

/// Runs one task against a freshly created agent.
pub struct TaskSession {
    client: Arc<dyn RunClient>,
    config: AgentRunConfig,
    driver: RunDriver,
}

impl TaskSession {
    pub fn new(
        client: Arc<dyn RunClient>,
        config: AgentRunConfig,
        resolver: ApprovalResolver,
    ) -> Self {
        let driver = RunDriver::new(client.clone(), resolver, DriverSettings::from(&config));
        Self {
            client,
            config,
            driver,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.driver = self.driver.with_sleeper(sleeper);
        self
    }

    /// Submit `task` and drive it to completion, writing progress and the
    /// transcript to `out`.
    ///
    /// A failed run still gets its transcript. Transport errors stop the
    /// session immediately.
    pub async fn run_task<W: Write>(
        &self,
        task: &str,
        out: &mut W,
    ) -> Result<TaskReport, AgentRunError> {
        let tool = self.config.mcp_tool();
        let request = CreateAgentRequest::builder()
            .model(self.config.model_deployment.clone())
            .name(self.config.agent_name.clone())
            .instructions(self.config.instructions.clone())
            .tools(vec![tool.definition()])
            .build();
        let agent = self.client.create_agent(&request).await?;
        info!(agent_id = %agent.id, "created agent");
        writeln!(out, "Created agent, ID: {}", agent.id)?;
        writeln!(out, "MCP Server: {} at {}", tool.server_label, tool.server_url)?;

        let result = self.run_on_agent(&agent.id, task, out).await;

        if self.config.delete_agent_on_exit {
            match self.client.delete_agent(&agent.id).await {
                Ok(()) => {
                    info!(agent_id = %agent.id, "deleted agent");
                    writeln!(out, "Deleted agent")?;
                }
                Err(err) => warn!(agent_id = %agent.id, error = %err, "failed to delete agent"),
            }
        }

        let (thread_id, outcome, transcript) = result?;
        Ok(TaskReport {
            agent_id: agent.id,
            thread_id,
            outcome,
            transcript,
        })
    }

    async fn run_on_agent<W: Write>(
        &self,
        agent_id: &str,
        task: &str,
        out: &mut W,
    ) -> Result<(String, RunOutcome, TranscriptSummary), AgentRunError> {
        let thread = self.client.create_thread().await?;
        writeln!(out, "Created thread, ID: {}", thread.id)?;

        let message = self
            .client
            .create_message(&thread.id, &CreateMessageRequest::user(task))
            .await?;
        writeln!(out, "Created message, ID: {}", message.id)?;

        let resources = ToolResources::default()
            .with_mcp(self.config.mcp_tool().resource(self.config.require_approval));
        let run = self
            .client
            .create_run(&thread.id, &CreateRunRequest::new(agent_id).with_tool_resources(resources))
            .await?;
        writeln!(out, "Created run, ID: {}", run.id)?;

        let outcome = self.driver.drive(&thread.id, run).await?;
        writeln!(out, "Run completed with status: {}", outcome.status())?;
        if let Some(reason) = outcome.cancelled_by_driver {
            writeln!(out, "Run cancelled by client: {}", cancel_reason_text(reason))?;
        }
        if let Some(message) = outcome.failure_message() {
            writeln!(out, "Run failed: {message}")?;
        }

        let mut reporter = TranscriptReporter::new(&mut *out);
        let transcript = reporter
            .report(self.client.as_ref(), &thread.id, &outcome.run.id)
            .await?;

        Ok((thread.id, outcome, transcript))
    }
}

fn cancel_reason_text(reason: CancelReason) -> &'static str {
    match reason {
        CancelReason::EmptyApprovalBatch => "no tool calls provided",
        CancelReason::ApprovalsUnresolved => "tool approvals could not be resolved",
    }
}
