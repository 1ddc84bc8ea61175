//! Per-tick orchestration of a sub-workflow step.
//!
//! `SubWorkflowOrchestrator::run` is invoked once per scheduler tick for the
//! step. Each call is a discrete, stateless-except-for-`WaitState`
//! invocation: if persisted wait state exists the tick goes straight to
//! resume, otherwise it performs first-tick setup (mark started, render and
//! record inputs), validates the target workflow, applies the depth guard,
//! and delegates to the strategy matching the step's declared mode. All
//! failures stay local to the step; the run always advances past a failed
//! step, and logs are flushed on every exit path.

use serde_json::json;
use subflow_types::error::StoreError;
use subflow_types::execution::ParentContext;
use subflow_types::workflow::{InvocationMode, WorkflowDefinition};

use crate::engine::ExecutionEngine;
use crate::repository::workflow::WorkflowStore;
use crate::runtime::{RunRuntime, RuntimeError, StepRuntime};

use super::awaited::{AwaitedInvocation, can_resume};
use super::depth::check_depth;
use super::detached::DetachedInvocation;
use super::strategy::StrategyResult;

// ---------------------------------------------------------------------------
// OrchestratorError
// ---------------------------------------------------------------------------

/// Internal collaborator failures within a tick.
///
/// Never escapes `run()`; converted at the boundary into a step failure
/// that still advances the run.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Runtime (step/run state) operation failed.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Store lookup failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// SubWorkflowOrchestrator
// ---------------------------------------------------------------------------

/// Tick handler for one sub-workflow step instance.
///
/// Borrows its collaborators for the duration of the tick; the surrounding
/// engine guarantees at-most-one tick in flight per step, so no internal
/// synchronization is needed.
pub struct SubWorkflowOrchestrator<'a, E, S, RT, RR> {
    engine: &'a E,
    store: &'a S,
    step: &'a RT,
    run_rt: &'a RR,
    ctx: ParentContext,
}

impl<'a, E, S, RT, RR> SubWorkflowOrchestrator<'a, E, S, RT, RR>
where
    E: ExecutionEngine,
    S: WorkflowStore,
    RT: StepRuntime,
    RR: RunRuntime,
{
    pub fn new(
        engine: &'a E,
        store: &'a S,
        step: &'a RT,
        run_rt: &'a RR,
        ctx: ParentContext,
    ) -> Self {
        Self {
            engine,
            store,
            step,
            run_rt,
            ctx,
        }
    }

    /// Run one tick. Failures never propagate out of this method.
    pub async fn run(&self) {
        if let Err(e) = self.run_tick().await {
            tracing::warn!(
                execution_id = %self.ctx.execution_id,
                step_id = self.ctx.step_id.as_str(),
                error = %e,
                "unexpected error during sub-workflow tick, failing step"
            );
            if let Err(mark_err) = self
                .step
                .mark_failed(json!({ "message": e.to_string() }))
                .await
            {
                tracing::warn!(error = %mark_err, "could not record step failure");
            }
            if let Err(advance_err) = self.run_rt.advance_to_next_step().await {
                tracing::warn!(error = %advance_err, "could not advance past failed step");
            }
        }
        self.step.flush_logs().await;
    }

    /// Best-effort cancellation of the in-flight child, if any.
    ///
    /// No-op for detached invocations, which intentionally never track the
    /// child. Failure to cancel the child is logged, never escalated.
    pub async fn on_cancel(&self) {
        let awaited = self.awaited();
        match awaited.execution_id_for_cancel().await {
            Ok(Some(child_execution_id)) => {
                tracing::info!(
                    execution_id = %self.ctx.execution_id,
                    step_id = self.ctx.step_id.as_str(),
                    child_execution_id = %child_execution_id,
                    "cancelling in-flight child execution"
                );
                if let Err(e) = self
                    .engine
                    .cancel(&child_execution_id, &self.ctx.space_id)
                    .await
                {
                    tracing::warn!(
                        child_execution_id = %child_execution_id,
                        error = %e,
                        "best-effort child cancellation failed"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read wait state during cancel");
            }
        }
    }

    fn awaited(&self) -> AwaitedInvocation<'_, E, S, RT> {
        AwaitedInvocation::new(self.engine, self.store, self.step, &self.ctx)
    }

    async fn run_tick(&self) -> Result<(), OrchestratorError> {
        let wait_state = self.step.wait_state().await?;
        if can_resume(wait_state.as_ref())
            && let Some(state) = wait_state
        {
            // Resume skips all first-tick work: no mark-started, no input
            // rendering, no target validation.
            let result = self.awaited().resume(state).await?;
            self.apply_result(result).await?;
            return Ok(());
        }

        self.step.mark_started().await?;
        let config = self.step.render_inputs().await?;
        self.step
            .record_inputs(&json!({
                "workflow_id": config.workflow_id,
                "inputs": config.inputs,
                "mode": config.mode,
            }))
            .await?;
        self.step.flush_logs().await;

        let depth = match check_depth(self.ctx.composition_depth) {
            Ok(depth) => depth,
            Err(e) => {
                return self.fail_step(json!({ "message": e.to_string() })).await;
            }
        };

        let workflow = match self
            .store
            .get_workflow(&config.workflow_id, &self.ctx.space_id)
            .await?
        {
            Some(workflow) => workflow,
            None => {
                return self
                    .fail_step(json!({
                        "message": format!("workflow {} not found", config.workflow_id)
                    }))
                    .await;
            }
        };

        if let Err(reason) = self.ensure_executable(&workflow) {
            return self.fail_step(json!({ "message": reason })).await;
        }

        let result = match config.mode {
            InvocationMode::Awaited => {
                self.awaited()
                    .execute(&workflow, &config.inputs, depth)
                    .await?
            }
            InvocationMode::Detached => {
                DetachedInvocation::new(self.engine, self.store, &self.ctx)
                    .execute(&workflow, &config.inputs, depth)
                    .await
            }
        };
        self.apply_result(result).await
    }

    /// Validate that the target workflow may be invoked from this run.
    ///
    /// Space scoping is enforced by the store lookup, not here.
    fn ensure_executable(&self, workflow: &WorkflowDefinition) -> Result<(), String> {
        if workflow.id == self.ctx.workflow_id {
            return Err(format!(
                "workflow '{}' cannot invoke itself",
                workflow.name
            ));
        }
        if !workflow.enabled {
            return Err(format!("workflow '{}' is disabled", workflow.name));
        }
        if !workflow.valid {
            return Err(format!("workflow '{}' is not valid", workflow.name));
        }
        Ok(())
    }

    async fn fail_step(&self, error: serde_json::Value) -> Result<(), OrchestratorError> {
        self.apply_result(StrategyResult::Failed { error }).await
    }

    /// Turn a strategy result into step/run state transitions.
    async fn apply_result(&self, result: StrategyResult) -> Result<(), OrchestratorError> {
        match result {
            StrategyResult::Completed { output } => {
                tracing::info!(
                    execution_id = %self.ctx.execution_id,
                    step_id = self.ctx.step_id.as_str(),
                    "sub-workflow step completed"
                );
                self.step.mark_finished(output).await?;
                self.run_rt.advance_to_next_step().await?;
            }
            StrategyResult::Failed { error } => {
                tracing::info!(
                    execution_id = %self.ctx.execution_id,
                    step_id = self.ctx.step_id.as_str(),
                    error = %error,
                    "sub-workflow step failed"
                );
                self.step.mark_failed(error).await?;
                self.run_rt.advance_to_next_step().await?;
            }
            StrategyResult::Waiting => {
                tracing::debug!(
                    execution_id = %self.ctx.execution_id,
                    step_id = self.ctx.step_id.as_str(),
                    "child still running, step parked until next tick"
                );
            }
            StrategyResult::Cancelled => {
                tracing::debug!(
                    execution_id = %self.ctx.execution_id,
                    step_id = self.ctx.step_id.as_str(),
                    "cancellation observed, no further work this tick"
                );
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
