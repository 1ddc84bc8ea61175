//! Execution engine trait definition.
//!
//! The engine is the only collaborator this subsystem writes through: one
//! "start child" call per invocation, plus a best-effort "cancel child"
//! when the parent step is cancelled.

use subflow_types::execution::InvocationRequest;
use subflow_types::workflow::WorkflowDefinition;
use uuid::Uuid;

/// Handle returned by a successful child submission.
#[derive(Debug, Clone)]
pub struct StartedExecution {
    /// ID of the newly started child execution.
    pub execution_id: Uuid,
}

/// Errors from execution engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Starting the child failed.
    #[error("submission failed: {0}")]
    Submission(String),

    /// Cancelling the child failed.
    #[error("cancel failed: {0}")]
    Cancel(String),
}

/// The surrounding engine's scheduling surface.
pub trait ExecutionEngine: Send + Sync {
    /// Start a child execution of the given workflow.
    fn start(
        &self,
        workflow: &WorkflowDefinition,
        request: &InvocationRequest,
    ) -> impl std::future::Future<Output = Result<StartedExecution, EngineError>> + Send;

    /// Cancel a child execution. Best-effort: failures are logged by the
    /// caller, never escalated.
    fn cancel(
        &self,
        execution_id: &Uuid,
        space_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), EngineError>> + Send;
}
