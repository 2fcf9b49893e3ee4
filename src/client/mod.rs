//! Request/response seam to the remote agent service.

pub mod http;

pub use http::HttpRunClient;

use async_trait::async_trait;

use crate::error::AgentRunError;
use crate::types::{
    Agent, CreateAgentRequest, CreateMessageRequest, CreateRunRequest, ListSortOrder, Run,
    RunStep, Thread, ThreadMessage, ToolApproval,
};

/// Operations the run driver, reporter and session consume.
///
/// Every call is one network round trip. Implementations must not retry
/// on their own; failures are surfaced to the caller.
#[async_trait]
pub trait RunClient: Send + Sync {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, AgentRunError>;

    async fn delete_agent(&self, agent_id: &str) -> Result<(), AgentRunError>;

    async fn create_thread(&self) -> Result<Thread, AgentRunError>;

    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage, AgentRunError>;

    async fn create_run(
        &self,
        thread_id: &str,
        request: &CreateRunRequest,
    ) -> Result<Run, AgentRunError>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AgentRunError>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), AgentRunError>;

    async fn submit_tool_approvals(
        &self,
        thread_id: &str,
        run_id: &str,
        approvals: &[ToolApproval],
    ) -> Result<(), AgentRunError>;

    /// Steps in creation order.
    async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<RunStep>, AgentRunError>;

    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>, AgentRunError>;
}
