// SPDX-License-Identifier: MIT

//! Graph execution
//!
//! `GraphExecutor` drives one run: it builds the initial state, walks the
//! graph node by node, checkpoints after every execution, resolves the next
//! hop through the edge conditions, and records an auditable
//! [`ExecutionResult`] in its run ledger. Runs are bounded by a hop-count
//! cap and a wall-clock timeout, and can be cancelled out-of-band while
//! running.

mod result;

pub use result::{ExecutionOptions, ExecutionResult, ExecutionStats, ExecutionStatus};

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, RwLock};
use uuid::Uuid;

use crate::error::FlowError;
use crate::graph::Graph;
use crate::state::{StateManager, WorkflowState};

/// Ledger entry: the evolving result plus the run's cancel signal
struct ExecutionEntry {
    result: ExecutionResult,
    cancel: watch::Sender<bool>,
}

enum RunOutcome {
    Finished(Result<WorkflowState, FlowError>),
    Cancelled,
    TimedOut,
}

/// Drives graph runs and keeps the run ledger.
///
/// Cloning is shallow; clones share the state manager and the ledger, which
/// is how `execute_async` hands the loop to a background task.
#[derive(Clone)]
pub struct GraphExecutor {
    state_manager: Arc<dyn StateManager>,
    executions: Arc<RwLock<HashMap<String, ExecutionEntry>>>,
}

impl GraphExecutor {
    pub fn new(state_manager: Arc<dyn StateManager>) -> Self {
        Self {
            state_manager,
            executions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Run a graph to a terminal outcome.
    ///
    /// Always returns a well-formed result: failures and cancellations carry
    /// their error text and whatever visited-node trail accumulated.
    pub async fn execute(
        &self,
        graph: &Graph,
        input: HashMap<String, Value>,
        options: ExecutionOptions,
    ) -> ExecutionResult {
        let execution_id = Uuid::new_v4().to_string();
        self.execute_inner(execution_id, graph, input, options).await
    }

    /// Run a graph on a background task.
    ///
    /// Returns the execution id immediately plus a receiver that yields
    /// exactly one terminal result.
    pub fn execute_async(
        &self,
        graph: Arc<Graph>,
        input: HashMap<String, Value>,
        options: ExecutionOptions,
    ) -> (String, oneshot::Receiver<ExecutionResult>) {
        let execution_id = Uuid::new_v4().to_string();
        let (sender, receiver) = oneshot::channel();

        let executor = self.clone();
        let id = execution_id.clone();
        tokio::spawn(async move {
            let result = executor.execute_inner(id, &graph, input, options).await;
            let _ = sender.send(result);
        });

        (execution_id, receiver)
    }

    async fn execute_inner(
        &self,
        execution_id: String,
        graph: &Graph,
        input: HashMap<String, Value>,
        options: ExecutionOptions,
    ) -> ExecutionResult {
        let mut state = WorkflowState::with_data(graph.id(), input);
        if let Some(user_id) = &options.user_id {
            state = state.with_user_id(user_id.clone());
        }
        if let Some(session_id) = &options.session_id {
            state = state.with_session_id(session_id.clone());
        }

        let mut result = ExecutionResult::new(&execution_id, graph.id(), state.id());
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        {
            let mut ledger = self.executions.write().await;
            ledger.insert(
                execution_id.clone(),
                ExecutionEntry {
                    result: result.clone(),
                    cancel: cancel_tx,
                },
            );
        }
        log::info!(
            "execution {} started on graph '{}'",
            execution_id,
            graph.id()
        );

        let mut visited = Vec::new();
        let outcome = tokio::select! {
            run = self.run_loop(graph, state, &options, &mut visited) => {
                RunOutcome::Finished(run)
            }
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => RunOutcome::Cancelled,
            _ = tokio::time::sleep(options.timeout) => RunOutcome::TimedOut,
        };

        result.nodes_visited = visited;
        match outcome {
            RunOutcome::Finished(Ok(final_state)) => result.complete(final_state),
            RunOutcome::Finished(Err(err)) => result.fail(err.to_string()),
            RunOutcome::Cancelled => {
                result.cancel(FlowError::cancelled("cancelled by caller").to_string())
            }
            RunOutcome::TimedOut => result.fail(
                FlowError::cancelled(format!("timed out after {:?}", options.timeout)).to_string(),
            ),
        }
        log::info!(
            "execution {} finished with status {} after {} hops",
            execution_id,
            result.status,
            result.nodes_visited.len()
        );

        let mut ledger = self.executions.write().await;
        if let Some(entry) = ledger.get_mut(&execution_id) {
            entry.result = result.clone();
        }

        result
    }

    /// The sequential execution loop. Appends each hop to `visited` so the
    /// trail survives even when the surrounding select aborts this future.
    async fn run_loop(
        &self,
        graph: &Graph,
        mut state: WorkflowState,
        options: &ExecutionOptions,
        visited: &mut Vec<String>,
    ) -> Result<WorkflowState, FlowError> {
        // Initial checkpoint before the first node runs
        self.state_manager.save_state(&state).await?;

        let mut current = graph
            .entry_point()
            .ok_or_else(|| FlowError::validation("graph has no entry point"))?
            .to_string();

        let mut iteration = 0u32;
        while iteration < options.max_iterations {
            iteration += 1;
            visited.push(current.clone());

            if graph.is_exit_point(&current) {
                log::info!("reached exit point '{}'", current);
                return Ok(state);
            }

            let node = graph
                .get_node(&current)
                .ok_or_else(|| FlowError::not_found("node", &current))?;

            log::info!("executing node '{}' ({})", current, node.node_type());
            state = node.execute(&state).await?;
            self.state_manager.save_state(&state).await?;

            match graph.next_node(&current, &state)? {
                Some(next) => current = next,
                None => {
                    // Natural termination: no outgoing edge matched
                    log::info!("no outgoing edge matched from '{}', run complete", current);
                    return Ok(state);
                }
            }
        }

        Err(FlowError::IterationBudget {
            limit: options.max_iterations,
        })
    }

    /// Look up a run by id
    pub async fn get_execution(&self, execution_id: &str) -> Option<ExecutionResult> {
        let ledger = self.executions.read().await;
        ledger.get(execution_id).map(|entry| entry.result.clone())
    }

    /// Snapshot of every run in the ledger
    pub async fn list_executions(&self) -> Vec<ExecutionResult> {
        let ledger = self.executions.read().await;
        ledger.values().map(|entry| entry.result.clone()).collect()
    }

    /// Cancel a run that is still `running`
    pub async fn cancel_execution(&self, execution_id: &str) -> Result<(), FlowError> {
        let ledger = self.executions.read().await;
        let entry = ledger
            .get(execution_id)
            .ok_or_else(|| FlowError::not_found("execution", execution_id))?;

        if entry.result.is_terminal() {
            return Err(FlowError::validation(format!(
                "execution '{}' is already {}",
                execution_id, entry.result.status
            )));
        }

        log::info!("cancelling execution {}", execution_id);
        // The receiver side is gone once the run finished on its own; that
        // race is harmless
        let _ = entry.cancel.send(true);
        Ok(())
    }

    /// Evict terminal runs older than `max_age`; returns how many were removed
    pub async fn cleanup_executions(&self, max_age: Duration) -> usize {
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };
        let cutoff = Utc::now() - max_age;

        let mut ledger = self.executions.write().await;
        let before = ledger.len();
        ledger.retain(|_, entry| {
            !(entry.result.is_terminal()
                && entry.result.ended_at.map(|t| t < cutoff).unwrap_or(false))
        });
        let removed = before - ledger.len();
        if removed > 0 {
            log::info!("evicted {} terminal executions", removed);
        }
        removed
    }

    /// Counts per status plus total/average duration of terminal runs
    pub async fn execution_stats(&self) -> ExecutionStats {
        let ledger = self.executions.read().await;
        let mut stats = ExecutionStats {
            total: ledger.len(),
            ..Default::default()
        };

        let mut terminal = 0usize;
        for entry in ledger.values() {
            match entry.result.status {
                ExecutionStatus::Running => stats.running += 1,
                ExecutionStatus::Completed => stats.completed += 1,
                ExecutionStatus::Failed => stats.failed += 1,
                ExecutionStatus::Cancelled => stats.cancelled += 1,
            }
            if let Some(duration) = entry.result.duration {
                stats.total_duration += duration;
                terminal += 1;
            }
        }
        if terminal > 0 {
            stats.average_duration = stats.total_duration / terminal as u32;
        }

        stats
    }
}
