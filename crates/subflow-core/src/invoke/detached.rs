//! Detached invocation strategy: start the child and finish the step.
//!
//! "Completed" here means the parent step's job is done, not that the child
//! has finished. There is no wait state and no polling; the step's output
//! is a receipt describing the in-flight child.

use serde_json::json;
use subflow_types::execution::{InvocationRequest, ParentContext};
use subflow_types::workflow::WorkflowDefinition;

use crate::engine::ExecutionEngine;
use crate::repository::workflow::WorkflowStore;

use super::strategy::StrategyResult;

/// Fire-and-forget invocation of a child workflow.
pub struct DetachedInvocation<'a, E, S> {
    engine: &'a E,
    store: &'a S,
    ctx: &'a ParentContext,
}

impl<'a, E, S> DetachedInvocation<'a, E, S>
where
    E: ExecutionEngine,
    S: WorkflowStore,
{
    pub fn new(engine: &'a E, store: &'a S, ctx: &'a ParentContext) -> Self {
        Self { engine, store, ctx }
    }

    /// Start the child and return a receipt as the step output.
    ///
    /// The `started_at` lookup is best-effort: a store failure only omits
    /// the field.
    pub async fn execute(
        &self,
        workflow: &WorkflowDefinition,
        inputs: &std::collections::HashMap<String, serde_json::Value>,
        depth: u32,
    ) -> StrategyResult {
        let request = InvocationRequest::for_child(workflow.id, inputs.clone(), self.ctx, depth);

        let started = match self.engine.start(workflow, &request).await {
            Ok(started) => started,
            Err(e) => {
                return StrategyResult::Failed {
                    error: json!({ "message": e.to_string() }),
                };
            }
        };

        tracing::info!(
            execution_id = %self.ctx.execution_id,
            step_id = self.ctx.step_id.as_str(),
            child_execution_id = %started.execution_id,
            workflow = workflow.name.as_str(),
            depth,
            "child workflow started detached"
        );

        let started_at = match self
            .store
            .get_execution(&started.execution_id, &self.ctx.space_id)
            .await
        {
            Ok(Some(execution)) => execution.started_at,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    child_execution_id = %started.execution_id,
                    error = %e,
                    "could not fetch started_at for detached child"
                );
                None
            }
        };

        let mut output = json!({
            "workflow_id": workflow.id,
            "execution_id": started.execution_id,
            "awaited": false,
            "status": "pending",
        });
        if let Some(started_at) = started_at {
            output["started_at"] = json!(started_at);
        }

        StrategyResult::Completed {
            output: Some(output),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
