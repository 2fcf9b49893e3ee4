//! Tool approval policies and the batch resolver.

pub mod resolver;

pub use resolver::ApprovalResolver;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AgentRunError;
use crate::types::McpToolCall;

/// Decision for one MCP tool call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Deny,
}

/// Decides whether a pending MCP call may run.
///
/// Auto-approval is only appropriate for trusted tool servers. Policies that
/// need to inspect arguments get the decoded call, and may fail for a
/// single call without affecting the rest of the batch.
pub trait ApprovalPolicy: Send + Sync {
    fn decide(&self, call: &McpToolCall) -> Result<ApprovalDecision, AgentRunError>;
}

impl<F> ApprovalPolicy for F
where
    F: Fn(&McpToolCall) -> Result<ApprovalDecision, AgentRunError> + Send + Sync,
{
    fn decide(&self, call: &McpToolCall) -> Result<ApprovalDecision, AgentRunError> {
        self(call)
    }
}

/// Approves every MCP call, optionally only for one registered server.
#[derive(Debug, Clone, Default)]
pub struct AutoApprove {
    server_label: Option<String>,
}

impl AutoApprove {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny calls routed to any server other than `label`.
    pub fn for_server(label: impl Into<String>) -> Self {
        Self {
            server_label: Some(label.into()),
        }
    }
}

impl ApprovalPolicy for AutoApprove {
    fn decide(&self, call: &McpToolCall) -> Result<ApprovalDecision, AgentRunError> {
        match &self.server_label {
            Some(label) if *label != call.server_label => Ok(ApprovalDecision::Deny),
            _ => Ok(ApprovalDecision::Approve),
        }
    }
}

/// Approves only the named tools.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    tools: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tools: tools.into_iter().map(Into::into).collect(),
        }
    }
}

impl ApprovalPolicy for AllowList {
    fn decide(&self, call: &McpToolCall) -> Result<ApprovalDecision, AgentRunError> {
        if self.tools.contains(&call.name) {
            Ok(ApprovalDecision::Approve)
        } else {
            Ok(ApprovalDecision::Deny)
        }
    }
}
