//! Transcript reporter: renders a finished run's steps and conversation.

use std::io::{self, Write};

use crate::client::RunClient;
use crate::error::AgentRunError;
use crate::types::{ListSortOrder, RunStep, StepActivity, StepToolCall, ThreadMessage};

const RULE_WIDTH: usize = 50;

/// Counts of what a report covered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptSummary {
    pub steps: usize,
    pub tool_calls: usize,
    pub messages: usize,
}

/// Writes human-readable run history to any [`Write`] sink.
pub struct TranscriptReporter<W> {
    out: W,
}

impl<W: Write> TranscriptReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Fetch steps and messages for a run and render both.
    pub async fn report(
        &mut self,
        client: &dyn RunClient,
        thread_id: &str,
        run_id: &str,
    ) -> Result<TranscriptSummary, AgentRunError> {
        let steps = client.list_run_steps(thread_id, run_id).await?;
        let messages = client.list_messages(thread_id, ListSortOrder::Asc).await?;

        self.write_steps(&steps)?;
        self.write_conversation(&messages)?;
        self.out.flush()?;

        Ok(TranscriptSummary {
            steps: steps.len(),
            tool_calls: steps.iter().map(|s| s.step_details.tool_calls.len()).sum(),
            messages: messages.len(),
        })
    }

    /// Steps in the order given, one block each.
    pub fn write_steps(&mut self, steps: &[RunStep]) -> io::Result<()> {
        for step in steps {
            writeln!(self.out, "Step {} status: {}", step.id, step.status)?;

            let details = &step.step_details;
            if !details.tool_calls.is_empty() {
                self.write_tool_calls(&details.tool_calls)?;
            }
            for activity in &details.activities {
                self.write_activity(activity)?;
            }

            writeln!(self.out)?;
        }
        Ok(())
    }

    fn write_tool_calls(&mut self, calls: &[StepToolCall]) -> io::Result<()> {
        writeln!(self.out, "  MCP Tool calls:")?;
        for call in calls {
            writeln!(self.out, "    Tool Call ID: {}", call.id)?;
            writeln!(self.out, "    Type: {}", call.kind)?;
        }
        Ok(())
    }

    fn write_activity(&mut self, activity: &StepActivity) -> io::Result<()> {
        for (name, function) in &activity.tools {
            writeln!(
                self.out,
                "  The function {name} with description \"{}\" will be called.:",
                function.description
            )?;
            if function.parameters.is_empty() {
                writeln!(self.out, "This function has no parameters")?;
                continue;
            }
            writeln!(self.out, "  Function parameters:")?;
            for (argument, parameter) in &function.parameters.properties {
                writeln!(self.out, "      {argument}")?;
                writeln!(self.out, "      Type: {}", parameter.type_label())?;
                writeln!(self.out, "      Description: {}", parameter.description)?;
            }
        }
        Ok(())
    }

    /// Messages oldest first, showing the last text segment of each.
    pub fn write_conversation(&mut self, messages: &[ThreadMessage]) -> io::Result<()> {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(self.out, "\nConversation:")?;
        writeln!(self.out, "{rule}")?;

        let mut ordered: Vec<&ThreadMessage> = messages.iter().collect();
        // Without a timestamp on every message, the service order stands.
        if ordered.iter().all(|m| m.created_at.is_some()) {
            ordered.sort_by_key(|m| m.created_at);
        }

        for message in ordered {
            if let Some(text) = message.last_text() {
                writeln!(
                    self.out,
                    "{}: {}",
                    message.role.to_string().to_uppercase(),
                    text
                )?;
                writeln!(self.out, "{rule}")?;
            }
        }
        Ok(())
    }
}
