//! Workflow store trait definition.
//!
//! Defines the read-side storage interface the orchestrator consumes:
//! workflow definition lookup, child execution snapshots, and descendant
//! step records. The surrounding engine implements this trait against its
//! own persistence.

use subflow_types::error::StoreError;
use subflow_types::execution::{ExecutionRecord, StepRecord};
use subflow_types::workflow::WorkflowDefinition;
use uuid::Uuid;

/// Read-only store covering the three entity families the orchestrator
/// consults:
/// - **Definitions:** target workflow lookup, space-scoped.
/// - **Executions:** child execution status/output snapshots.
/// - **Step records:** descendant step outputs for output resolution.
///
/// Space scoping is enforced by the implementation, not by the caller.
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait WorkflowStore: Send + Sync {
    /// Get a workflow definition by ID within a space.
    fn get_workflow(
        &self,
        id: &Uuid,
        space_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<WorkflowDefinition>, StoreError>> + Send;

    /// Get an execution snapshot by ID within a space.
    fn get_execution(
        &self,
        execution_id: &Uuid,
        space_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ExecutionRecord>, StoreError>> + Send;

    /// List step records for an execution, filtered to the given step IDs
    /// and preserving their order.
    fn list_step_records(
        &self,
        execution_id: &Uuid,
        step_ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<StepRecord>, StoreError>> + Send;
}
