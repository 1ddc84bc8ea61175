//! Step and run runtime traits.
//!
//! `StepRuntime` is the per-step surface the surrounding engine provides:
//! state transitions, the persisted wait-state slot, delay scheduling, input
//! rendering, the cooperative cancellation token, and log flushing. The
//! wait-state slot is exclusively owned by the step instance; no other step
//! reads or writes it. `RunRuntime` is the run-level surface (advancing to
//! the next step).

use serde_json::Value;
use subflow_types::execution::WaitState;
use subflow_types::workflow::SubWorkflowStepConfig;
use tokio_util::sync::CancellationToken;

/// Errors from runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Persisting or reading step state failed.
    #[error("step state error: {0}")]
    State(String),

    /// Rendering the step configuration failed.
    #[error("input rendering error: {0}")]
    Render(String),
}

/// Per-step runtime surface provided by the surrounding engine.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait StepRuntime: Send + Sync {
    /// Mark the step as started.
    fn mark_started(&self) -> impl std::future::Future<Output = Result<(), RuntimeError>> + Send;

    /// Mark the step as finished with the given output.
    fn mark_finished(
        &self,
        output: Option<Value>,
    ) -> impl std::future::Future<Output = Result<(), RuntimeError>> + Send;

    /// Mark the step as failed with the given error payload.
    fn mark_failed(
        &self,
        error: Value,
    ) -> impl std::future::Future<Output = Result<(), RuntimeError>> + Send;

    /// Read the persisted wait state for this step instance, if any.
    fn wait_state(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<WaitState>, RuntimeError>> + Send;

    /// Durably persist the wait state for this step instance.
    fn set_wait_state(
        &self,
        state: WaitState,
    ) -> impl std::future::Future<Output = Result<(), RuntimeError>> + Send;

    /// Ask the scheduler to re-tick this step after the given delay
    /// (e.g. `"1s"`, `"16s"`). Returns whether the request was accepted.
    fn request_delay(
        &self,
        delay: &str,
    ) -> impl std::future::Future<Output = Result<bool, RuntimeError>> + Send;

    /// Render the step's configuration against the current run context.
    fn render_inputs(
        &self,
    ) -> impl std::future::Future<Output = Result<SubWorkflowStepConfig, RuntimeError>> + Send;

    /// Record the rendered inputs for observability.
    fn record_inputs(
        &self,
        inputs: &Value,
    ) -> impl std::future::Future<Output = Result<(), RuntimeError>> + Send;

    /// Cooperative cancellation signal for the owning run. Sampled at
    /// specific checkpoints, never used to abort an in-flight fetch.
    fn cancellation(&self) -> &CancellationToken;

    /// Flush buffered log lines. Infallible by contract.
    fn flush_logs(&self) -> impl std::future::Future<Output = ()> + Send;
}

/// Run-level runtime surface.
pub trait RunRuntime: Send + Sync {
    /// Advance the run to its next step.
    fn advance_to_next_step(
        &self,
    ) -> impl std::future::Future<Output = Result<(), RuntimeError>> + Send;
}
