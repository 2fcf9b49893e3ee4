//! Shared test helpers: a scripted agent service and a recording sleeper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use agentrun::client::RunClient;
use agentrun::driver::Sleeper;
use agentrun::error::AgentRunError;
use agentrun::types::*;

/// One request the scripted client received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateAgent(String),
    DeleteAgent(String),
    CreateThread,
    CreateMessage(String),
    CreateRun(String),
    GetRun(String),
    CancelRun(String),
    SubmitApprovals(Vec<ToolApproval>),
    ListRunSteps(String),
    ListMessages(ListSortOrder),
}

/// Agent service fake that replays a fixed sequence of run states.
///
/// `get_run` fails once the script is exhausted so a runaway loop ends the
/// test instead of hanging it.
pub struct ScriptedClient {
    created_run: Run,
    polls: Mutex<VecDeque<Result<Run, AgentRunError>>>,
    submit_error: Mutex<Option<AgentRunError>>,
    steps: Vec<RunStep>,
    messages: Vec<ThreadMessage>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new(created_run: Run, polls: Vec<Run>) -> Self {
        Self {
            created_run,
            polls: Mutex::new(polls.into_iter().map(Ok).collect()),
            submit_error: Mutex::new(None),
            steps: Vec::new(),
            messages: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn then_fail_poll(self, err: AgentRunError) -> Self {
        self.polls.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn fail_submit(self, err: AgentRunError) -> Self {
        *self.submit_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_history(mut self, steps: Vec<RunStep>, messages: Vec<ThreadMessage>) -> Self {
        self.steps = steps;
        self.messages = messages;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn get_run_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::GetRun(_)))
    }

    pub fn cancel_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CancelRun(_)))
    }

    pub fn submitted(&self) -> Vec<Vec<ToolApproval>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SubmitApprovals(approvals) => Some(approvals),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RunClient for ScriptedClient {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, AgentRunError> {
        self.record(Call::CreateAgent(request.name.clone()));
        Ok(Agent {
            id: "asst_1".into(),
            name: Some(request.name.clone()),
            model: request.model.clone(),
        })
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), AgentRunError> {
        self.record(Call::DeleteAgent(agent_id.into()));
        Ok(())
    }

    async fn create_thread(&self) -> Result<Thread, AgentRunError> {
        self.record(Call::CreateThread);
        Ok(Thread {
            id: "thread_1".into(),
        })
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage, AgentRunError> {
        self.record(Call::CreateMessage(request.content.clone()));
        Ok(user_message("msg_user", 1, &request.content))
    }

    async fn create_run(
        &self,
        _thread_id: &str,
        request: &CreateRunRequest,
    ) -> Result<Run, AgentRunError> {
        self.record(Call::CreateRun(request.agent_id.clone()));
        Ok(self.created_run.clone())
    }

    async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<Run, AgentRunError> {
        self.record(Call::GetRun(run_id.into()));
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentRunError::api(500, "poll script exhausted")))
    }

    async fn cancel_run(&self, _thread_id: &str, run_id: &str) -> Result<(), AgentRunError> {
        self.record(Call::CancelRun(run_id.into()));
        Ok(())
    }

    async fn submit_tool_approvals(
        &self,
        _thread_id: &str,
        _run_id: &str,
        approvals: &[ToolApproval],
    ) -> Result<(), AgentRunError> {
        self.record(Call::SubmitApprovals(approvals.to_vec()));
        match self.submit_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_run_steps(
        &self,
        _thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<RunStep>, AgentRunError> {
        self.record(Call::ListRunSteps(run_id.into()));
        Ok(self.steps.clone())
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>, AgentRunError> {
        self.record(Call::ListMessages(order));
        Ok(self.messages.clone())
    }
}

/// Sleeper that returns immediately and remembers what it was asked.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub fn run(status: RunStatus) -> Run {
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

pub fn awaiting_approval(calls: Vec<PendingToolCall>) -> Run {
    Run {
        required_action: Some(RequiredAction::SubmitToolApproval {
            submit_tool_approval: ToolCallBatch { tool_calls: calls },
        }),
        ..run(RunStatus::RequiresAction)
    }
}

pub fn failed(code: &str, message: &str) -> Run {
    Run {
        last_error: Some(RunError {
            code: code.into(),
            message: message.into(),
        }),
        ..run(RunStatus::Failed)
    }
}

pub fn mcp_call(id: &str) -> PendingToolCall {
    PendingToolCall::mcp(id, "query", "postgres", r#"{"sql":"select 1"}"#)
}

pub fn user_message(id: &str, created_at: i64, text: &str) -> ThreadMessage {
    serde_json::from_value(json!({
        "id": id,
        "role": "user",
        "created_at": created_at,
        "content": [{"type": "text", "text": {"value": text}}]
    }))
    .unwrap()
}

pub fn agent_message(id: &str, created_at: i64, text: &str) -> ThreadMessage {
    serde_json::from_value(json!({
        "id": id,
        "role": "assistant",
        "created_at": created_at,
        "content": [{"type": "text", "text": {"value": text}}]
    }))
    .unwrap()
}

pub fn tool_call_step(step_id: &str, call_id: &str) -> RunStep {
    serde_json::from_value(json!({
        "id": step_id,
        "status": "completed",
        "step_details": {
            "type": "tool_calls",
            "tool_calls": [{"id": call_id, "type": "mcp"}]
        }
    }))
    .unwrap()
}
