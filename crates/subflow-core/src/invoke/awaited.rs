//! Awaited invocation strategy: start the child, then poll across ticks.
//!
//! The wait-then-continue behavior is not an in-process suspension: it is
//! the persisted `WaitState` plus a function from (state, latest child
//! snapshot) to the next state or a terminal result, invoked fresh each
//! tick. `execute` covers first contact, `resume` covers every later tick.

use chrono::Utc;
use serde_json::json;
use subflow_types::execution::{ExecutionStatus, InvocationRequest, ParentContext, WaitState};
use subflow_types::workflow::WorkflowDefinition;
use uuid::Uuid;

use crate::engine::ExecutionEngine;
use crate::repository::workflow::WorkflowStore;
use crate::runtime::{RuntimeError, StepRuntime};

use super::output::resolve_output;
use super::strategy::{StrategyResult, poll_delay};

/// Whether persisted wait state exists that `resume` can pick up.
pub fn can_resume(state: Option<&WaitState>) -> bool {
    state.is_some_and(|s| !s.execution_id.is_nil())
}

/// Wait-for-completion invocation of a child workflow.
///
/// Borrowed per tick; the only state it carries across ticks lives in the
/// runtime's wait-state slot.
pub struct AwaitedInvocation<'a, E, S, RT> {
    engine: &'a E,
    store: &'a S,
    runtime: &'a RT,
    ctx: &'a ParentContext,
}

impl<'a, E, S, RT> AwaitedInvocation<'a, E, S, RT>
where
    E: ExecutionEngine,
    S: WorkflowStore,
    RT: StepRuntime,
{
    pub fn new(engine: &'a E, store: &'a S, runtime: &'a RT, ctx: &'a ParentContext) -> Self {
        Self {
            engine,
            store,
            runtime,
            ctx,
        }
    }

    /// First contact: start the child and persist the wait state.
    ///
    /// Called only when `can_resume` is false. On submission failure no
    /// wait state is written and the step fails immediately. Cancellation
    /// sampled here short-circuits the first delay request only; the
    /// already-written wait state stands.
    pub async fn execute(
        &self,
        workflow: &WorkflowDefinition,
        inputs: &std::collections::HashMap<String, serde_json::Value>,
        depth: u32,
    ) -> Result<StrategyResult, RuntimeError> {
        let request = InvocationRequest::for_child(workflow.id, inputs.clone(), self.ctx, depth);

        let started = match self.engine.start(workflow, &request).await {
            Ok(started) => started,
            Err(e) => {
                return Ok(StrategyResult::Failed {
                    error: json!({ "message": e.to_string() }),
                });
            }
        };

        self.runtime
            .set_wait_state(WaitState {
                workflow_id: workflow.id,
                execution_id: started.execution_id,
                started_at: Some(Utc::now()),
                poll_count: 0,
            })
            .await?;

        tracing::info!(
            execution_id = %self.ctx.execution_id,
            step_id = self.ctx.step_id.as_str(),
            child_execution_id = %started.execution_id,
            workflow = workflow.name.as_str(),
            depth,
            "child workflow started, awaiting completion"
        );

        if self.runtime.cancellation().is_cancelled() {
            return Ok(StrategyResult::Cancelled);
        }

        self.runtime.request_delay(&poll_delay(0)).await?;
        Ok(StrategyResult::Waiting)
    }

    /// One poll: map the child's latest snapshot to a result.
    ///
    /// Terminal child statuses are honored regardless of the cancellation
    /// signal. A signalled cancellation on a non-terminal poll suppresses
    /// the next delay request but never forges a terminal result; turning
    /// an observed cancellation into a terminal state is the orchestrator's
    /// business once the child itself is cancelled.
    pub async fn resume(&self, state: WaitState) -> Result<StrategyResult, RuntimeError> {
        let execution = match self
            .store
            .get_execution(&state.execution_id, &self.ctx.space_id)
            .await
        {
            Ok(Some(execution)) => execution,
            Ok(None) => {
                return Ok(StrategyResult::Failed {
                    error: json!({
                        "message": format!("execution {} not found", state.execution_id)
                    }),
                });
            }
            Err(e) => {
                return Ok(StrategyResult::Failed {
                    error: json!({ "message": e.to_string() }),
                });
            }
        };

        if !execution.status.is_terminal() {
            let next = WaitState {
                poll_count: state.poll_count + 1,
                ..state
            };
            self.runtime.set_wait_state(next.clone()).await?;

            if self.runtime.cancellation().is_cancelled() {
                tracing::debug!(
                    child_execution_id = %next.execution_id,
                    poll_count = next.poll_count,
                    "cancellation signalled, skipping delay request"
                );
            } else {
                let delay = poll_delay(next.poll_count);
                let accepted = self.runtime.request_delay(&delay).await?;
                tracing::debug!(
                    child_execution_id = %next.execution_id,
                    poll_count = next.poll_count,
                    delay = delay.as_str(),
                    accepted,
                    "child still running, delay requested"
                );
            }

            return Ok(StrategyResult::Waiting);
        }

        match execution.status {
            ExecutionStatus::Completed => {
                let output = match resolve_output(self.store, &execution).await {
                    Ok(output) => output,
                    Err(e) => {
                        return Ok(StrategyResult::Failed {
                            error: json!({ "message": e.to_string() }),
                        });
                    }
                };
                tracing::info!(
                    execution_id = %self.ctx.execution_id,
                    step_id = self.ctx.step_id.as_str(),
                    child_execution_id = %execution.id,
                    polls = state.poll_count,
                    "child workflow completed"
                );
                Ok(StrategyResult::Completed { output })
            }
            ExecutionStatus::Failed => Ok(StrategyResult::Failed {
                error: execution
                    .error
                    .unwrap_or_else(|| json!({ "message": "child workflow failed" })),
            }),
            ExecutionStatus::Cancelled => Ok(StrategyResult::Failed {
                error: json!({
                    "message": format!("child workflow execution {} was cancelled", execution.id)
                }),
            }),
            ExecutionStatus::TimedOut => Ok(StrategyResult::Failed {
                error: json!({
                    "message": format!("child workflow execution {} timed out", execution.id)
                }),
            }),
            // Non-terminal statuses return early above.
            ExecutionStatus::Pending | ExecutionStatus::Running => Ok(StrategyResult::Waiting),
        }
    }

    /// The in-flight child execution ID, for best-effort cancellation.
    pub async fn execution_id_for_cancel(&self) -> Result<Option<Uuid>, RuntimeError> {
        Ok(self
            .runtime
            .wait_state()
            .await?
            .filter(|s| !s.execution_id.is_nil())
            .map(|s| s.execution_id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
