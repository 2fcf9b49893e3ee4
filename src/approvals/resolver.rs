//! Turns a batch of pending tool calls into approval records.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::AgentRunError;
use crate::types::{PendingToolCall, ToolApproval, ToolCallKind};

use super::{ApprovalDecision, ApprovalPolicy, AutoApprove};

/// Applies an [`ApprovalPolicy`] to every call in a required-action batch.
///
/// Guarantees: at most one record per call id, only ids from the input,
/// and a failure on one call never drops the records of the others.
#[derive(Clone)]
pub struct ApprovalResolver {
    policy: Arc<dyn ApprovalPolicy>,
}

impl fmt::Debug for ApprovalResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalResolver").finish_non_exhaustive()
    }
}

impl Default for ApprovalResolver {
    fn default() -> Self {
        Self::new(AutoApprove::new())
    }
}

impl ApprovalResolver {
    pub fn new(policy: impl ApprovalPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn from_shared(policy: Arc<dyn ApprovalPolicy>) -> Self {
        Self { policy }
    }

    pub fn resolve(&self, calls: &[PendingToolCall]) -> Vec<ToolApproval> {
        let mut seen = HashSet::new();
        let mut approvals = Vec::with_capacity(calls.len());

        for call in calls {
            if !call.id.is_empty() && !seen.insert(call.id.as_str()) {
                debug!(call_id = %call.id, "duplicate tool call in batch, skipping");
                continue;
            }
            match self.resolve_one(call) {
                Ok(Some(approval)) => {
                    info!(
                        call_id = %approval.tool_call_id,
                        approve = approval.approve,
                        "tool call resolved"
                    );
                    approvals.push(approval);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(call_id = %call.id, error = %err, "failed to resolve tool call");
                }
            }
        }

        approvals
    }

    fn resolve_one(&self, call: &PendingToolCall) -> Result<Option<ToolApproval>, AgentRunError> {
        match &call.kind {
            ToolCallKind::Mcp => {
                let mcp = call.as_mcp()?;
                let approval = match self.policy.decide(&mcp)? {
                    ApprovalDecision::Approve => ToolApproval::approve(mcp.call_id),
                    ApprovalDecision::Deny => ToolApproval::deny(mcp.call_id),
                };
                Ok(Some(approval))
            }
            ToolCallKind::Function | ToolCallKind::Unsupported(_) => {
                warn!(
                    call_id = %call.id,
                    kind = %call.kind,
                    "declining tool call of unsupported kind"
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approvals::AllowList;
    use crate::types::McpToolCall;

    fn unsupported(id: &str) -> PendingToolCall {
        PendingToolCall {
            id: id.into(),
            kind: ToolCallKind::Unsupported("code_interpreter".into()),
            payload: Default::default(),
        }
    }

    #[test]
    fn approves_every_mcp_call_in_order() {
        let calls = vec![
            PendingToolCall::mcp("call_1", "list_tables", "postgres", ""),
            PendingToolCall::mcp("call_2", "query", "postgres", r#"{"sql":"select 1"}"#),
        ];
        let approvals = ApprovalResolver::default().resolve(&calls);
        assert_eq!(
            approvals,
            vec![ToolApproval::approve("call_1"), ToolApproval::approve("call_2")]
        );
    }

    #[test]
    fn unsupported_kinds_produce_no_record() {
        let calls = vec![
            unsupported("call_1"),
            PendingToolCall::mcp("call_2", "query", "postgres", "{}"),
        ];
        let approvals = ApprovalResolver::default().resolve(&calls);
        assert_eq!(approvals, vec![ToolApproval::approve("call_2")]);
    }

    #[test]
    fn duplicate_ids_resolve_once() {
        let calls = vec![
            PendingToolCall::mcp("call_1", "query", "postgres", "{}"),
            PendingToolCall::mcp("call_1", "query", "postgres", "{}"),
        ];
        assert_eq!(ApprovalResolver::default().resolve(&calls).len(), 1);
    }

    #[test]
    fn one_bad_call_does_not_sink_the_batch() {
        let calls = vec![
            PendingToolCall::mcp("call_1", "query", "postgres", "{}"),
            PendingToolCall::mcp("call_2", "query", "postgres", "{broken"),
            PendingToolCall::mcp("call_3", "query", "postgres", "{}"),
        ];
        let approvals = ApprovalResolver::default().resolve(&calls);
        let ids: Vec<_> = approvals.iter().map(|a| a.tool_call_id.as_str()).collect();
        assert_eq!(ids, vec!["call_1", "call_3"]);
    }

    #[test]
    fn policy_errors_are_isolated_per_call() {
        let policy = |call: &McpToolCall| {
            if call.call_id == "call_2" {
                Err(AgentRunError::tool_approval(&call.call_id, "policy exploded"))
            } else {
                Ok(ApprovalDecision::Approve)
            }
        };
        let calls: Vec<_> = (1..=4)
            .map(|i| PendingToolCall::mcp(format!("call_{i}"), "query", "postgres", "{}"))
            .collect();
        assert_eq!(ApprovalResolver::new(policy).resolve(&calls).len(), 3);
    }

    #[test]
    fn denials_are_recorded() {
        let resolver = ApprovalResolver::new(AllowList::new(["list_tables"]));
        let calls = vec![PendingToolCall::mcp("call_1", "drop_table", "postgres", "{}")];
        assert_eq!(resolver.resolve(&calls), vec![ToolApproval::deny("call_1")]);
    }

    #[test]
    fn empty_batch_yields_nothing() {
        assert!(ApprovalResolver::default().resolve(&[]).is_empty());
    }
}
