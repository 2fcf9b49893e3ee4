//! Convenience re-exports for common use.

pub use crate::approvals::{
    AllowList, ApprovalDecision, ApprovalPolicy, ApprovalResolver, AutoApprove,
};
pub use crate::client::{HttpRunClient, RunClient};
pub use crate::config::AgentRunConfig;
pub use crate::driver::{CancelReason, DriverSettings, RunDriver, RunOutcome};
pub use crate::error::{AgentRunError, Result};
pub use crate::report::TranscriptReporter;
pub use crate::session::{TaskReport, TaskSession};
pub use crate::tools::{McpTool, RequireApproval, ToolResources};
pub use crate::types::{
    ListSortOrder, PendingToolCall, Run, RunStatus, RunStep, ThreadMessage, ToolApproval,
    ToolCallKind,
};
