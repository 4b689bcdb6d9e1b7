// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::state::WorkflowState;

/// Lifecycle status of one execution.
///
/// `Running` transitions exactly once to a terminal status; `Cancelled` is
/// reachable only through an explicit out-of-band cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Auditable record of one graph run.
///
/// Created with status `running` when `execute` is called; the terminal
/// transition fixes `ended_at` and `duration` exactly once. Partial progress
/// (the visited-node trail) is preserved on failure and cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub execution_id: String,
    pub graph_id: String,
    /// Id of the initial state checkpoint
    pub state_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Node ids in exact execution order
    pub nodes_visited: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<WorkflowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl ExecutionResult {
    pub fn new(
        execution_id: impl Into<String>,
        graph_id: impl Into<String>,
        state_id: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            graph_id: graph_id.into(),
            state_id: state_id.into(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            duration: None,
            nodes_visited: Vec::new(),
            final_state: None,
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Terminal transition: successful completion with a final state
    pub fn complete(&mut self, final_state: WorkflowState) {
        if self.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Completed;
        self.final_state = Some(final_state);
        self.finish();
    }

    /// Terminal transition: failure with the error text attached
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.into());
        self.finish();
    }

    /// Terminal transition: explicit out-of-band cancellation
    pub fn cancel(&mut self, reason: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Cancelled;
        self.error = Some(reason.into());
        self.finish();
    }

    fn finish(&mut self) {
        let ended = Utc::now();
        self.ended_at = Some(ended);
        self.duration = Some(
            (ended - self.started_at)
                .to_std()
                .unwrap_or(Duration::ZERO),
        );
    }
}

/// Per-run knobs for the executor.
///
/// The wall-clock timeout and the hop-count cap are independent guards: a
/// tight loop and one slow external call are distinct failure modes.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    pub max_iterations: u32,
    pub timeout: Duration,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            timeout: Duration::from_secs(300),
            user_id: None,
            session_id: None,
        }
    }
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Aggregate counters over the run ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Summed duration of terminal runs
    pub total_duration: Duration,
    /// Average duration of terminal runs
    pub average_duration: Duration,
}
