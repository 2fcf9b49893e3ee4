//! Driver state machine: pure transitions, no I/O.

use serde::{Deserialize, Serialize};

use crate::types::{PendingToolCall, Run};

/// Why the driver cancelled a run on its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The service asked for approvals but sent no tool calls.
    EmptyApprovalBatch,
    /// Too many consecutive rounds produced no approval to submit.
    ApprovalsUnresolved,
}

/// Where the driver is in a run's lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverState {
    /// Waiting for the next poll.
    Polling,
    /// A tool-approval batch needs resolving.
    Resolving(Vec<PendingToolCall>),
    /// The driver decided to cancel the run.
    Cancelling(CancelReason),
    Finished,
}

/// Something the driver observed or did.
#[derive(Debug, Clone, Copy)]
pub enum DriverEvent<'a> {
    Polled(&'a Run),
    ApprovalsSubmitted,
    /// Resolution produced nothing to submit.
    ApprovalsWithheld,
    /// Resolution produced nothing too many times in a row.
    ApprovalsExhausted,
    CancelRequested,
}

impl DriverState {
    /// Initial state for a freshly created run.
    pub fn start(run: &Run) -> Self {
        if run.status.is_terminal() {
            Self::Finished
        } else {
            Self::Polling
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    pub fn on_event(self, event: DriverEvent<'_>) -> Self {
        match (self, event) {
            (Self::Finished, _) => Self::Finished,
            (_, DriverEvent::Polled(run)) => Self::observe(run),
            (Self::Resolving(_), DriverEvent::ApprovalsSubmitted)
            | (Self::Resolving(_), DriverEvent::ApprovalsWithheld) => Self::Polling,
            (Self::Resolving(_), DriverEvent::ApprovalsExhausted) => {
                Self::Cancelling(CancelReason::ApprovalsUnresolved)
            }
            (Self::Cancelling(_), DriverEvent::CancelRequested) => Self::Finished,
            (state, _) => state,
        }
    }

    fn observe(run: &Run) -> Self {
        if run.status.is_terminal() {
            return Self::Finished;
        }
        match run.pending_tool_approvals() {
            Some([]) => Self::Cancelling(CancelReason::EmptyApprovalBatch),
            Some(calls) => Self::Resolving(calls.to_vec()),
            None => Self::Polling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RequiredAction, RunStatus, ToolCallBatch};

    fn run(status: RunStatus) -> Run {
        Run {
            id: "run_1".into(),
            thread_id: "thread_1".into(),
            agent_id: "asst_1".into(),
            status,
            required_action: None,
            last_error: None,
            created_at: None,
        }
    }

    fn awaiting(calls: Vec<PendingToolCall>) -> Run {
        Run {
            required_action: Some(RequiredAction::SubmitToolApproval {
                submit_tool_approval: ToolCallBatch { tool_calls: calls },
            }),
            ..run(RunStatus::RequiresAction)
        }
    }

    #[test]
    fn active_statuses_keep_polling() {
        for status in [RunStatus::Queued, RunStatus::InProgress] {
            let state = DriverState::Polling.on_event(DriverEvent::Polled(&run(status)));
            assert_eq!(state, DriverState::Polling);
        }
    }

    #[test]
    fn terminal_statuses_finish() {
        for status in [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Expired,
            RunStatus::Unknown,
        ] {
            assert!(DriverState::Polling
                .on_event(DriverEvent::Polled(&run(status)))
                .is_finished());
        }
        assert!(DriverState::start(&run(RunStatus::Completed)).is_finished());
    }

    #[test]
    fn approval_request_moves_to_resolving() {
        let calls = vec![PendingToolCall::mcp("call_1", "query", "pg", "{}")];
        let state = DriverState::Polling.on_event(DriverEvent::Polled(&awaiting(calls.clone())));
        assert_eq!(state, DriverState::Resolving(calls));
    }

    #[test]
    fn empty_batch_moves_to_cancelling() {
        let state = DriverState::Polling.on_event(DriverEvent::Polled(&awaiting(vec![])));
        assert_eq!(state, DriverState::Cancelling(CancelReason::EmptyApprovalBatch));
        assert!(state.on_event(DriverEvent::CancelRequested).is_finished());
    }

    #[test]
    fn requires_action_without_approval_request_keeps_polling() {
        let run = Run {
            required_action: Some(RequiredAction::Other),
            ..run(RunStatus::RequiresAction)
        };
        assert_eq!(
            DriverState::Polling.on_event(DriverEvent::Polled(&run)),
            DriverState::Polling
        );
    }

    #[test]
    fn resolving_returns_to_polling_or_cancels_when_exhausted() {
        let resolving = DriverState::Resolving(vec![]);
        assert_eq!(
            resolving.clone().on_event(DriverEvent::ApprovalsSubmitted),
            DriverState::Polling
        );
        assert_eq!(
            resolving.clone().on_event(DriverEvent::ApprovalsWithheld),
            DriverState::Polling
        );
        assert_eq!(
            resolving.on_event(DriverEvent::ApprovalsExhausted),
            DriverState::Cancelling(CancelReason::ApprovalsUnresolved)
        );
    }

    #[test]
    fn finished_absorbs_everything() {
        let state = DriverState::Finished
            .on_event(DriverEvent::Polled(&run(RunStatus::InProgress)))
            .on_event(DriverEvent::ApprovalsSubmitted);
        assert!(state.is_finished());
    }
}
