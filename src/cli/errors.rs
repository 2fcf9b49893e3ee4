//! CLI-specific error formatting for user-facing messages.

use crate::error::AgentRunError;

/// Map an [`AgentRunError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &AgentRunError) -> String {
    match err {
        AgentRunError::Configuration(msg) => {
            format!("Configuration error: {msg}. Check your .env or environment variables")
        }
        AgentRunError::Authentication(msg) => {
            format!("Authentication failed: {msg}. Check PROJECT_API_TOKEN")
        }
        AgentRunError::NotFound(msg) => {
            format!("Not found: {msg}. Check PROJECT_ENDPOINT and PROJECT_API_VERSION")
        }
        other if other.is_retryable() => format!("{other}. The service may be busy; try again"),
        other => format!("{other}"),
    }
}
