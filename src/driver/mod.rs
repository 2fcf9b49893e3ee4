//! Run driver: polls a run to a terminal state, answering approval requests.

pub mod clock;
pub mod state;

pub use clock::{Sleeper, TokioSleeper};
pub use state::{CancelReason, DriverEvent, DriverState};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::approvals::ApprovalResolver;
use crate::client::RunClient;
use crate::config::{AgentRunConfig, DEFAULT_MAX_UNRESOLVED_ROUNDS, DEFAULT_POLL_INTERVAL};
use crate::error::AgentRunError;
use crate::types::{Run, RunStatus};

/// Loop tuning taken from [`AgentRunConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    pub poll_interval: Duration,
    pub max_unresolved_rounds: Option<u32>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_unresolved_rounds: Some(DEFAULT_MAX_UNRESOLVED_ROUNDS),
        }
    }
}

impl From<&AgentRunConfig> for DriverSettings {
    fn from(config: &AgentRunConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            max_unresolved_rounds: config.max_unresolved_rounds,
        }
    }
}

/// How a driven run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The last copy of the run the driver saw.
    pub run: Run,
    pub polls: u32,
    pub approval_rounds: u32,
    pub approvals_submitted: usize,
    /// Set when the driver, not the service, ended the run.
    pub cancelled_by_driver: Option<CancelReason>,
}

impl RunOutcome {
    pub fn status(&self) -> RunStatus {
        self.run.status
    }

    pub fn is_success(&self) -> bool {
        self.cancelled_by_driver.is_none() && self.run.status == RunStatus::Completed
    }

    /// Error text reported by the service for a failed run.
    pub fn failure_message(&self) -> Option<String> {
        if self.run.status != RunStatus::Failed {
            return None;
        }
        Some(
            self.run
                .last_error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "no error details reported".to_string()),
        )
    }
}

/// Drives one run at a time through the poll/approve loop.
///
/// The driver owns the run copy for the duration of [`RunDriver::drive`];
/// it issues one request at a time and never retries a failed request.
pub struct RunDriver {
    client: Arc<dyn RunClient>,
    resolver: ApprovalResolver,
    sleeper: Arc<dyn Sleeper>,
    settings: DriverSettings,
}

impl RunDriver {
    pub fn new(
        client: Arc<dyn RunClient>,
        resolver: ApprovalResolver,
        settings: DriverSettings,
    ) -> Self {
        Self {
            client,
            resolver,
            sleeper: Arc::new(TokioSleeper),
            settings,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> DriverSettings {
        self.settings
    }

    /// Poll `run` until it is terminal or the driver cancels it.
    ///
    /// Transport errors abort the loop and are returned as-is. A run that
    /// the service reports as failed is a normal outcome, not an error.
    pub async fn drive(&self, thread_id: &str, run: Run) -> Result<RunOutcome, AgentRunError> {
        let mut outcome = RunOutcome {
            polls: 0,
            approval_rounds: 0,
            approvals_submitted: 0,
            cancelled_by_driver: None,
            run,
        };
        let mut unresolved_rounds = 0u32;
        let mut state = DriverState::start(&outcome.run);
        info!(run_id = %outcome.run.id, status = %outcome.run.status, "driving run");

        loop {
            state = match state {
                DriverState::Finished => break,
                DriverState::Polling => {
                    self.sleeper.sleep(self.settings.poll_interval).await;
                    let refreshed = self.client.get_run(thread_id, &outcome.run.id).await?;
                    outcome.polls += 1;
                    if refreshed.status != outcome.run.status {
                        info!(
                            run_id = %refreshed.id,
                            status = %refreshed.status,
                            "run status changed"
                        );
                    } else {
                        debug!(run_id = %refreshed.id, status = %refreshed.status, "run status");
                    }
                    outcome.run = refreshed;
                    DriverState::Polling.on_event(DriverEvent::Polled(&outcome.run))
                }
                DriverState::Resolving(calls) => {
                    outcome.approval_rounds += 1;
                    let approvals = self.resolver.resolve(&calls);
                    let resolving = DriverState::Resolving(calls);
                    if approvals.is_empty() {
                        unresolved_rounds += 1;
                        warn!(
                            run_id = %outcome.run.id,
                            unresolved_rounds,
                            "no tool approvals produced, not submitting"
                        );
                        let exhausted = self
                            .settings
                            .max_unresolved_rounds
                            .is_some_and(|max| unresolved_rounds >= max);
                        if exhausted {
                            resolving.on_event(DriverEvent::ApprovalsExhausted)
                        } else {
                            resolving.on_event(DriverEvent::ApprovalsWithheld)
                        }
                    } else {
                        unresolved_rounds = 0;
                        self.client
                            .submit_tool_approvals(thread_id, &outcome.run.id, &approvals)
                            .await?;
                        outcome.approvals_submitted += approvals.len();
                        info!(
                            run_id = %outcome.run.id,
                            count = approvals.len(),
                            "submitted tool approvals"
                        );
                        resolving.on_event(DriverEvent::ApprovalsSubmitted)
                    }
                }
                DriverState::Cancelling(reason) => {
                    warn!(run_id = %outcome.run.id, ?reason, "cancelling run");
                    self.client.cancel_run(thread_id, &outcome.run.id).await?;
                    outcome.cancelled_by_driver = Some(reason);
                    DriverState::Cancelling(reason).on_event(DriverEvent::CancelRequested)
                }
            };
        }

        info!(
            run_id = %outcome.run.id,
            status = %outcome.run.status,
            polls = outcome.polls,
            "run finished"
        );
        Ok(outcome)
    }
}
